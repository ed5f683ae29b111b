/// Number of progress reports over a full render.
pub const PROGRESS_UPDATES: u32 = 20;

/// Counts finished rows and reports at evenly spaced steps.
#[derive(Debug, Clone)]
pub struct Progress {
    rows_done: u32,
    total_rows: u32,
    updates: u32,
    last_step: u32,
}

impl Progress {
    pub fn new(total_rows: u32) -> Self {
        Self::with_updates(total_rows, PROGRESS_UPDATES)
    }

    pub fn with_updates(total_rows: u32, updates: u32) -> Self {
        Self {
            rows_done: 0,
            total_rows,
            updates: updates.max(1),
            last_step: 0,
        }
    }

    /// Records `rows` more finished rows. Returns the completed percentage
    /// whenever a new step has been reached.
    pub fn advance(&mut self, rows: u32) -> Option<u32> {
        self.rows_done = self.rows_done.saturating_add(rows).min(self.total_rows);
        if self.total_rows == 0 {
            return None;
        }

        let step =
            (self.rows_done as u64 * self.updates as u64 / self.total_rows as u64) as u32;
        if step > self.last_step {
            self.last_step = step;
            return Some(self.percent());
        }
        None
    }

    pub fn percent(&self) -> u32 {
        if self.total_rows == 0 {
            return 100;
        }
        (self.rows_done as u64 * 100 / self.total_rows as u64) as u32
    }

    pub fn rows_done(&self) -> u32 {
        self.rows_done
    }

    pub fn is_done(&self) -> bool {
        self.rows_done == self.total_rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_twenty_times_for_single_rows() {
        let mut progress = Progress::new(100);
        let reports: Vec<u32> = (0..100).filter_map(|_| progress.advance(1)).collect();
        assert_eq!(reports.len(), 20);
        assert_eq!(reports.first(), Some(&5));
        assert_eq!(reports.last(), Some(&100));
        assert!(progress.is_done());
    }

    #[test]
    fn large_blocks_skip_steps_without_repeating() {
        let mut progress = Progress::new(10);
        assert_eq!(progress.advance(5), Some(50));
        assert_eq!(progress.advance(5), Some(100));
        assert_eq!(progress.advance(0), None);
    }

    #[test]
    fn small_images_still_report() {
        let mut progress = Progress::new(3);
        let reports: Vec<u32> = (0..3).filter_map(|_| progress.advance(1)).collect();
        assert_eq!(reports, vec![33, 66, 100]);
    }

    #[test]
    fn never_exceeds_total() {
        let mut progress = Progress::with_updates(4, 2);
        progress.advance(10);
        assert_eq!(progress.rows_done(), 4);
        assert_eq!(progress.percent(), 100);
    }
}
