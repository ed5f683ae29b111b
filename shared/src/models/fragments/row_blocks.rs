use super::assignment::Assignment;

/// Hands out consecutive blocks of `block_size` rows, starting at row 0,
/// until `height` rows have been handed out.
#[derive(Debug, Clone)]
pub struct RowBlocks {
    next_row: u32,
    block_size: u32,
    height: u32,
}

impl RowBlocks {
    pub fn new(height: u32, block_size: u32) -> Self {
        Self {
            next_row: 0,
            block_size,
            height,
        }
    }

    pub fn has_remaining(&self) -> bool {
        self.next_row < self.height
    }

    pub fn dispatched_rows(&self) -> u32 {
        self.next_row
    }
}

impl Iterator for RowBlocks {
    type Item = Assignment;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.has_remaining() || self.block_size == 0 {
            return None;
        }
        let end = self.next_row.saturating_add(self.block_size).min(self.height);
        let rows = (self.next_row..end).collect();
        self.next_row = end;
        Some(Assignment::new(rows))
    }
}
