use serde::{Deserialize, Serialize};

/// A contiguous block of row indices handed to one worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub rows: Vec<u32>,
}

impl Assignment {
    pub fn new(rows: Vec<u32>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
