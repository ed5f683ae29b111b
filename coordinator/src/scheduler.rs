use log::{debug, info, warn};
use shared::{
    config::RenderConfig,
    error::{RenderError, RenderResult},
    graphics::framebuffer::Framebuffer,
    models::fragments::{
        assignment::Assignment,
        messages::{CoordinatorMessage, WorkerEvent, WorkerId},
    },
    networking::error::NetworkingError,
};
use tokio::sync::mpsc::{Receiver, Sender};

use crate::coordinator_state::CoordinatorState;

/// Result of a finished scheduling loop.
#[derive(Debug)]
pub struct ScheduleOutcome {
    pub framebuffer: Framebuffer,
    pub tasks_per_worker: Vec<usize>,
}

/// Pull-based dispatcher: every worker gets one block up front, and each
/// completion earns the sender the next block (or Termination).
pub struct Scheduler {
    config: RenderConfig,
    links: Vec<Sender<CoordinatorMessage>>,
    events: Receiver<WorkerEvent>,
}

impl Scheduler {
    pub fn new(
        config: &RenderConfig,
        links: Vec<Sender<CoordinatorMessage>>,
        events: Receiver<WorkerEvent>,
    ) -> Self {
        Self {
            config: config.clone(),
            links,
            events,
        }
    }

    pub async fn run(mut self) -> RenderResult<ScheduleOutcome> {
        if self.links.is_empty() {
            return Err(shared::config::ConfigError::NoWorkers.into());
        }

        let mut framebuffer = Framebuffer::allocate(self.config.width, self.config.height)?;
        let mut state = CoordinatorState::new(&self.config, self.links.len());

        for index in 0..self.links.len() {
            let worker = WorkerId(index);
            match state.next_assignment() {
                Some(assignment) => self.assign(&mut state, worker, assignment).await?,
                None => {
                    warn!("No rows left for worker {}", worker);
                    self.retire(&mut state, worker).await?;
                }
            }
        }

        while state.running() > 0 {
            let event = self
                .events
                .recv()
                .await
                .ok_or_else(|| NetworkingError::ChannelClosed("workers".to_string()))?;
            let worker = event.worker;

            let completion = match event.outcome {
                Ok(completion) => completion,
                Err(e) if state.is_retired(worker) => {
                    debug!("Ignoring event from retired worker {}: {}", worker, e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            state.complete(worker)?;
            match state.next_assignment() {
                Some(assignment) => self.assign(&mut state, worker, assignment).await?,
                None => self.retire(&mut state, worker).await?,
            }

            let rows = framebuffer.apply(&completion, self.config.color_mask)?;
            if let Some(percent) = state.progress.advance(rows) {
                if self.config.show_progress {
                    info!(
                        "Progress {:>3}% ({}/{} rows)",
                        percent,
                        state.progress.rows_done(),
                        self.config.height
                    );
                }
            }
        }

        if !framebuffer.is_complete() {
            return Err(RenderError::Transport(NetworkingError::Protocol(format!(
                "only {} of {} rows arrived",
                framebuffer.written_rows(),
                self.config.height
            ))));
        }

        Ok(ScheduleOutcome {
            framebuffer,
            tasks_per_worker: state.tasks_per_worker().to_vec(),
        })
    }

    async fn assign(
        &self,
        state: &mut CoordinatorState,
        worker: WorkerId,
        assignment: Assignment,
    ) -> RenderResult<()> {
        debug!(
            "Assigning rows {:?}..={:?} to worker {}",
            assignment.rows.first(),
            assignment.rows.last(),
            worker
        );
        self.send(worker, CoordinatorMessage::Assign(assignment))
            .await?;
        state.occupy(worker)?;
        Ok(())
    }

    async fn retire(&self, state: &mut CoordinatorState, worker: WorkerId) -> RenderResult<()> {
        debug!("Sending termination to worker {}", worker);
        self.send(worker, CoordinatorMessage::Terminate).await?;
        state.retire(worker)?;
        Ok(())
    }

    async fn send(&self, worker: WorkerId, message: CoordinatorMessage) -> RenderResult<()> {
        let link = self.links.get(worker.0).ok_or_else(|| {
            NetworkingError::Protocol(format!("no link to worker {}", worker))
        })?;
        link.send(message)
            .await
            .map_err(|_| NetworkingError::ChannelClosed(format!("worker {}", worker)))?;
        Ok(())
    }
}
