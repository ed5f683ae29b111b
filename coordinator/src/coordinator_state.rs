use shared::{
    config::RenderConfig,
    models::fragments::{assignment::Assignment, messages::WorkerId, row_blocks::RowBlocks},
    networking::{error::NetworkingError, result::NetworkingResult},
};

use crate::progress::Progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerSlot {
    /// Connected, nothing in flight.
    Idle,
    /// Holds exactly one assignment whose completion has not arrived yet.
    Outstanding,
    /// Sent Termination; will never be assigned again.
    Retired,
}

/// Bookkeeping of the scheduling loop. The running count (number of
/// outstanding slots) is the only termination signal.
#[derive(Debug, Clone)]
pub struct CoordinatorState {
    slots: Vec<WorkerSlot>,
    tasks_per_worker: Vec<usize>,
    blocks: RowBlocks,
    running: usize,
    pub progress: Progress,
}

impl CoordinatorState {
    pub fn new(config: &RenderConfig, worker_count: usize) -> Self {
        Self {
            slots: vec![WorkerSlot::Idle; worker_count],
            tasks_per_worker: vec![0; worker_count],
            blocks: RowBlocks::new(config.height, config.block_size),
            running: 0,
            progress: Progress::new(config.height),
        }
    }

    pub fn running(&self) -> usize {
        self.running
    }

    pub fn slot(&self, worker: WorkerId) -> Option<WorkerSlot> {
        self.slots.get(worker.0).copied()
    }

    pub fn is_retired(&self, worker: WorkerId) -> bool {
        self.slot(worker) == Some(WorkerSlot::Retired)
    }

    pub fn tasks_per_worker(&self) -> &[usize] {
        &self.tasks_per_worker
    }

    pub fn next_assignment(&mut self) -> Option<Assignment> {
        self.blocks.next()
    }

    pub fn dispatched_rows(&self) -> u32 {
        self.blocks.dispatched_rows()
    }

    pub fn occupy(&mut self, worker: WorkerId) -> NetworkingResult<()> {
        match self.slot(worker) {
            Some(WorkerSlot::Idle) => {
                self.slots[worker.0] = WorkerSlot::Outstanding;
                self.tasks_per_worker[worker.0] += 1;
                self.running += 1;
                Ok(())
            }
            other => Err(protocol_error(worker, "assign to", other)),
        }
    }

    /// Marks the completion of `worker`'s outstanding assignment.
    pub fn complete(&mut self, worker: WorkerId) -> NetworkingResult<()> {
        match self.slot(worker) {
            Some(WorkerSlot::Outstanding) => {
                self.slots[worker.0] = WorkerSlot::Idle;
                self.running -= 1;
                Ok(())
            }
            other => Err(protocol_error(worker, "accept a completion from", other)),
        }
    }

    pub fn retire(&mut self, worker: WorkerId) -> NetworkingResult<()> {
        match self.slot(worker) {
            Some(WorkerSlot::Idle) => {
                self.slots[worker.0] = WorkerSlot::Retired;
                Ok(())
            }
            other => Err(protocol_error(worker, "retire", other)),
        }
    }
}

fn protocol_error(worker: WorkerId, action: &str, slot: Option<WorkerSlot>) -> NetworkingError {
    match slot {
        Some(slot) => {
            NetworkingError::Protocol(format!("cannot {} worker {} in state {:?}", action, worker, slot))
        }
        None => NetworkingError::Protocol(format!("cannot {} unknown worker {}", action, worker)),
    }
}
