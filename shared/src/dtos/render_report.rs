use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Summary of a finished render, logged as JSON by the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderReport {
    pub width: u32,
    pub height: u32,
    pub block_size: u32,
    pub rows: u32,
    pub tasks_per_worker: Vec<usize>,
    pub compute_seconds: f64,
    pub output: PathBuf,
}

impl RenderReport {
    pub fn total_tasks(&self) -> usize {
        self.tasks_per_worker.iter().sum()
    }
}
