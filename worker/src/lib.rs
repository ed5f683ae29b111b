pub mod local;

use std::sync::Arc;

use log::{debug, error, info};
use shared::{
    config::RenderConfig,
    models::{
        fractal::mandelbrot::Mandelbrot,
        fragments::{
            assignment::Assignment,
            completion::Completion,
            messages::{CoordinatorMessage, WorkerEvent, WorkerId},
        },
    },
    networking::{
        error::NetworkingError,
        protocol::{self, Message, Registration},
        result::NetworkingResult,
        worker::Worker,
    },
};
use tokio::{
    io::AsyncWriteExt,
    net::TcpStream,
    sync::mpsc::{Receiver, Sender},
    task,
};

/// Evaluates every pixel of every assigned row.
pub fn perform_assignment(evaluator: &Mandelbrot, assignment: &Assignment) -> Completion {
    let mut completion = Completion::with_capacity(assignment.len());
    for &row in &assignment.rows {
        completion.push(row, evaluator.row(row));
    }
    completion
}

async fn perform_task(
    evaluator: &Arc<Mandelbrot>,
    assignment: Assignment,
) -> NetworkingResult<Completion> {
    let evaluator = Arc::clone(evaluator);
    let first_row = assignment.rows.first().copied();
    let completion =
        task::spawn_blocking(move || perform_assignment(&evaluator, &assignment)).await?;
    debug!(
        "Computed {} row(s) starting at {:?}",
        completion.row_count(),
        first_row
    );
    Ok(completion)
}

/// Serves assignments arriving on `inbox` until told to stop. Returns the
/// number of assignments completed.
pub async fn worker_loop(
    id: WorkerId,
    evaluator: Arc<Mandelbrot>,
    mut inbox: Receiver<CoordinatorMessage>,
    outbox: Sender<WorkerEvent>,
) -> NetworkingResult<usize> {
    let mut completed = 0;
    loop {
        match inbox.recv().await {
            Some(CoordinatorMessage::Assign(assignment)) => {
                let completion = perform_task(&evaluator, assignment).await?;
                if outbox
                    .send(WorkerEvent::completed(id, completion))
                    .await
                    .is_err()
                {
                    error!("Worker {}: coordinator went away", id);
                    return Err(NetworkingError::ChannelClosed("coordinator".to_string()));
                }
                completed += 1;
            }
            Some(CoordinatorMessage::Terminate) => {
                debug!("Worker {} terminating after {} task(s)", id, completed);
                return Ok(completed);
            }
            None => {
                error!("Worker {}: coordinator closed the channel", id);
                return Err(NetworkingError::ChannelClosed("coordinator".to_string()));
            }
        }
    }
}

/// Connects to the coordinator, registers, and serves assignments until a
/// Termination message arrives.
pub async fn run_worker(worker: &Worker, config: &RenderConfig) -> NetworkingResult<usize> {
    let mut stream = connect_to_server(&worker.server_address()).await?;
    let registration = Registration::new(worker.name.clone(), config);
    if let Err(e) = protocol::send(&mut stream, &Message::Register(registration)).await {
        error!("Failed to register with the coordinator: {}", e);
        return Err(e);
    }
    info!("Worker {} registered", worker.name);

    let evaluator = Arc::new(Mandelbrot::new(config));
    let completed = serve(&mut stream, &evaluator).await?;

    _ = stream.shutdown().await;
    info!(
        "Worker {} finished after {} task(s)",
        worker.name, completed
    );
    Ok(completed)
}

async fn serve(stream: &mut TcpStream, evaluator: &Arc<Mandelbrot>) -> NetworkingResult<usize> {
    let mut completed = 0;
    loop {
        let message = match protocol::receive(stream).await {
            Ok(message) => message,
            Err(e) => {
                error!("Failed to read message from coordinator: {}", e);
                return Err(e);
            }
        };

        match message {
            Message::Assignment(assignment) => {
                let completion = perform_task(evaluator, assignment).await?;
                if let Err(e) = protocol::send(stream, &Message::Completion(completion)).await {
                    error!("Failed to send completion: {}", e);
                    return Err(e);
                }
                completed += 1;
            }
            Message::Termination => return Ok(completed),
            other => {
                return Err(NetworkingError::UnexpectedMessage {
                    expected: "Assignment or Termination",
                    got: other.kind().to_string(),
                })
            }
        }
    }
}

async fn connect_to_server(addr: &str) -> NetworkingResult<TcpStream> {
    let stream = match TcpStream::connect(addr).await {
        Ok(stream) => stream,
        Err(e) => {
            error!("Failed to connect to coordinator at {}: {}", addr, e);
            return Err(e.into());
        }
    };
    info!("Connected to coordinator at {}", addr);
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::config::RenderOptions;
    use tokio::sync::mpsc;

    fn config() -> RenderConfig {
        RenderConfig::new(
            RenderOptions {
                width: 4,
                height: 4,
                iterations: 50,
                block_size: 2,
                ..RenderOptions::default()
            },
            2,
        )
        .unwrap()
    }

    #[test]
    fn assignment_rows_are_tagged_in_order() {
        let evaluator = Mandelbrot::new(&config());
        let completion = perform_assignment(&evaluator, &Assignment::new(vec![2, 3]));
        assert_eq!(completion.row_count(), 2);
        assert_eq!(completion.rows[0].row, 2);
        assert_eq!(completion.rows[1].row, 3);
        assert!(completion.rows.iter().all(|r| r.colors.len() == 4));
        assert_eq!(completion.rows[0].colors, evaluator.row(2));
    }

    #[tokio::test]
    async fn loop_answers_each_assignment_then_stops() {
        let (to_worker, inbox) = mpsc::channel(1);
        let (outbox, mut events) = mpsc::channel(1);
        let evaluator = Arc::new(Mandelbrot::new(&config()));
        let handle = tokio::spawn(worker_loop(WorkerId(3), evaluator, inbox, outbox));

        to_worker
            .send(CoordinatorMessage::Assign(Assignment::new(vec![0, 1])))
            .await
            .unwrap();
        let event = events.recv().await.unwrap();
        assert_eq!(event.worker, WorkerId(3));
        let rows: Vec<u32> = event.outcome.unwrap().rows.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![0, 1]);

        to_worker.send(CoordinatorMessage::Terminate).await.unwrap();
        assert_eq!(handle.await.unwrap().unwrap(), 1);
    }

    #[tokio::test]
    async fn dropped_coordinator_is_an_error() {
        let (to_worker, inbox) = mpsc::channel(1);
        let (outbox, _events) = mpsc::channel(1);
        let evaluator = Arc::new(Mandelbrot::new(&config()));
        drop(to_worker);
        let err = worker_loop(WorkerId(0), evaluator, inbox, outbox)
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkingError::ChannelClosed(_)));
    }

    #[tokio::test]
    async fn tcp_worker_registers_and_serves() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = config();
        let worker = Worker::new("tester".to_string(), "127.0.0.1".to_string(), port);

        let worker_config = config.clone();
        let handle = tokio::spawn(async move { run_worker(&worker, &worker_config).await });

        let (mut socket, _) = listener.accept().await.unwrap();
        match protocol::receive(&mut socket).await.unwrap() {
            Message::Register(registration) => {
                assert_eq!(registration.name, "tester");
                registration.check(&config).unwrap();
            }
            other => panic!("unexpected {:?}", other),
        }

        let assignment = Message::Assignment(Assignment::new(vec![2, 3]));
        protocol::send(&mut socket, &assignment).await.unwrap();
        match protocol::receive(&mut socket).await.unwrap() {
            Message::Completion(completion) => {
                let evaluator = Mandelbrot::new(&config);
                assert_eq!(completion, perform_assignment(&evaluator, &Assignment::new(vec![2, 3])));
            }
            other => panic!("unexpected {:?}", other),
        }

        protocol::send(&mut socket, &Message::Termination).await.unwrap();
        assert_eq!(handle.await.unwrap().unwrap(), 1);
    }
}
