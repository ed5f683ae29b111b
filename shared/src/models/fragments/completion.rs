use serde::{Deserialize, Serialize};

/// Raw (pre-mask) colors of one image row, tagged with the row they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowResult {
    pub row: u32,
    pub colors: Vec<i64>,
}

/// The answer to one `Assignment`: one `RowResult` per assigned row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub rows: Vec<RowResult>,
}

impl Completion {
    pub fn with_capacity(rows: usize) -> Self {
        Self {
            rows: Vec::with_capacity(rows),
        }
    }

    pub fn push(&mut self, row: u32, colors: Vec<i64>) {
        self.rows.push(RowResult { row, colors });
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
