use std::fmt;

use serde::{Deserialize, Serialize};

use crate::networking::result::NetworkingResult;

use super::{assignment::Assignment, completion::Completion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerId(pub usize);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Coordinator → worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorMessage {
    Assign(Assignment),
    Terminate,
}

/// Worker → coordinator. A failed `outcome` means the link to that worker broke.
#[derive(Debug)]
pub struct WorkerEvent {
    pub worker: WorkerId,
    pub outcome: NetworkingResult<Completion>,
}

impl WorkerEvent {
    pub fn completed(worker: WorkerId, completion: Completion) -> Self {
        Self {
            worker,
            outcome: Ok(completion),
        }
    }
}
