use std::sync::Arc;

use log::error;
use shared::{
    config::RenderConfig,
    models::{
        fractal::mandelbrot::Mandelbrot,
        fragments::messages::{CoordinatorMessage, WorkerEvent, WorkerId},
    },
    networking::result::NetworkingResult,
};
use tokio::{
    sync::mpsc::{self, Receiver, Sender},
    task::JoinHandle,
};

use crate::worker_loop;

/// In-process workers, each a tokio task talking to the coordinator over
/// channels.
pub struct LocalPool {
    pub links: Vec<Sender<CoordinatorMessage>>,
    pub events: Receiver<WorkerEvent>,
    pub handles: Vec<JoinHandle<NetworkingResult<usize>>>,
}

pub fn spawn_local_pool(config: &RenderConfig, count: usize) -> LocalPool {
    let evaluator = Arc::new(Mandelbrot::new(config));
    let (outbox, events) = mpsc::channel(count.max(1));

    let mut links = Vec::with_capacity(count);
    let mut handles = Vec::with_capacity(count);
    for index in 0..count {
        // At most one message is ever pending per worker.
        let (link, inbox) = mpsc::channel(1);
        let id = WorkerId(index);
        let evaluator = Arc::clone(&evaluator);
        let outbox = outbox.clone();
        handles.push(tokio::spawn(async move {
            let result = worker_loop(id, evaluator, inbox, outbox).await;
            if let Err(e) = &result {
                error!("Worker {} failed: {}", id, e);
            }
            result
        }));
        links.push(link);
    }

    LocalPool {
        links,
        events,
        handles,
    }
}
