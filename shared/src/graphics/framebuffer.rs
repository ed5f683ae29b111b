use thiserror::Error;

use crate::models::fragments::completion::{Completion, RowResult};

use super::color::Rgb;

pub const BYTES_PER_PIXEL: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FramebufferError {
    #[error("unable to allocate {bytes} bytes for a {width}x{height} framebuffer")]
    Allocation { width: u32, height: u32, bytes: usize },

    #[error("row {row} is outside the image (height {height})")]
    RowOutOfRange { row: u32, height: u32 },

    #[error("row {row} has {got} colors, expected {width}")]
    WrongWidth { row: u32, got: usize, width: u32 },

    #[error("row {row} was already written")]
    DuplicateRow { row: u32 },
}

/// Row-major RGB pixel grid, filled one row at a time.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    written: Vec<bool>,
    written_rows: u32,
}

impl Framebuffer {
    pub fn allocate(width: u32, height: u32) -> Result<Self, FramebufferError> {
        let allocation_error = |bytes| FramebufferError::Allocation {
            width,
            height,
            bytes,
        };
        let bytes = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL))
            .ok_or_else(|| allocation_error(usize::MAX))?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(bytes)
            .map_err(|_| allocation_error(bytes))?;
        pixels.resize(bytes, 0);

        let mut written = Vec::new();
        written
            .try_reserve_exact(height as usize)
            .map_err(|_| allocation_error(bytes))?;
        written.resize(height as usize, false);

        Ok(Self {
            width,
            height,
            pixels,
            written,
            written_rows: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw bytes, `3 * (width * row + col)` addressing, red first.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, col: u32, row: u32) -> Rgb {
        let offset = self.offset(col, row);
        Rgb::new(
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
        )
    }

    pub fn written_rows(&self) -> u32 {
        self.written_rows
    }

    pub fn is_complete(&self) -> bool {
        self.written_rows == self.height
    }

    /// Writes every row of `completion`, masking each raw color with `mask`.
    /// The whole completion is checked before anything is written.
    pub fn apply(&mut self, completion: &Completion, mask: u32) -> Result<u32, FramebufferError> {
        for row in &completion.rows {
            self.check_row(row)?;
        }
        let mut incoming = completion.rows.iter().map(|r| r.row).collect::<Vec<_>>();
        incoming.sort_unstable();
        if let Some(pair) = incoming.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(FramebufferError::DuplicateRow { row: pair[0] });
        }

        for row in &completion.rows {
            self.write_row(row, mask);
        }
        Ok(completion.row_count() as u32)
    }

    /// Paints every pixel with `color` and marks all rows written.
    pub fn fill(&mut self, color: Rgb) {
        for pixel in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            pixel.copy_from_slice(&color.to_array());
        }
        self.written.iter_mut().for_each(|w| *w = true);
        self.written_rows = self.height;
    }

    fn check_row(&self, row: &RowResult) -> Result<(), FramebufferError> {
        if row.row >= self.height {
            return Err(FramebufferError::RowOutOfRange {
                row: row.row,
                height: self.height,
            });
        }
        if row.colors.len() != self.width as usize {
            return Err(FramebufferError::WrongWidth {
                row: row.row,
                got: row.colors.len(),
                width: self.width,
            });
        }
        if self.written[row.row as usize] {
            return Err(FramebufferError::DuplicateRow { row: row.row });
        }
        Ok(())
    }

    fn write_row(&mut self, row: &RowResult, mask: u32) {
        let start = self.offset(0, row.row);
        let line = &mut self.pixels[start..start + self.width as usize * BYTES_PER_PIXEL];
        for (pixel, raw) in line.chunks_exact_mut(BYTES_PER_PIXEL).zip(&row.colors) {
            pixel.copy_from_slice(&Rgb::from_raw(*raw, mask).to_array());
        }
        self.written[row.row as usize] = true;
        self.written_rows += 1;
    }

    fn offset(&self, col: u32, row: u32) -> usize {
        BYTES_PER_PIXEL * (self.width as usize * row as usize + col as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion(rows: &[(u32, Vec<i64>)]) -> Completion {
        let mut completion = Completion::default();
        for (row, colors) in rows {
            completion.push(*row, colors.clone());
        }
        completion
    }

    #[test]
    fn rows_land_at_their_index() {
        let mut framebuffer = Framebuffer::allocate(2, 3).unwrap();
        let written = framebuffer
            .apply(&completion(&[(2, vec![0x010203, 0x040506])]), 0xffffff)
            .unwrap();
        assert_eq!(written, 1);
        assert_eq!(&framebuffer.pixels()[12..], &[1, 2, 3, 4, 5, 6]);
        assert_eq!(&framebuffer.pixels()[..6], &[0; 6]);
        assert_eq!(framebuffer.pixel(0, 2), Rgb::new(1, 2, 3));
        assert_eq!(framebuffer.pixel(1, 2), Rgb::new(4, 5, 6));
        assert!(!framebuffer.is_complete());
    }

    #[test]
    fn mask_applies_to_every_pixel() {
        let mut framebuffer = Framebuffer::allocate(1, 1).unwrap();
        framebuffer
            .apply(&completion(&[(0, vec![0xabcdef])]), 0xff0000)
            .unwrap();
        assert_eq!(framebuffer.pixels(), &[0xab, 0, 0]);
        assert!(framebuffer.is_complete());
    }

    #[test]
    fn arrival_order_does_not_matter() {
        let blocks = [
            completion(&[(0, vec![1, 2])]),
            completion(&[(1, vec![3, 4])]),
            completion(&[(2, vec![5, 6])]),
        ];

        let mut forward = Framebuffer::allocate(2, 3).unwrap();
        for block in &blocks {
            forward.apply(block, 0xffffff).unwrap();
        }
        let mut backward = Framebuffer::allocate(2, 3).unwrap();
        for block in blocks.iter().rev() {
            backward.apply(block, 0xffffff).unwrap();
        }
        assert_eq!(forward.pixels(), backward.pixels());
        assert!(forward.is_complete() && backward.is_complete());
    }

    #[test]
    fn rows_are_written_exactly_once() {
        let mut framebuffer = Framebuffer::allocate(1, 2).unwrap();
        framebuffer.apply(&completion(&[(1, vec![7])]), 0xffffff).unwrap();
        let err = framebuffer
            .apply(&completion(&[(1, vec![8])]), 0xffffff)
            .unwrap_err();
        assert_eq!(err, FramebufferError::DuplicateRow { row: 1 });
        assert_eq!(framebuffer.pixel(0, 1), Rgb::new(0, 0, 7));

        let err = framebuffer
            .apply(&completion(&[(0, vec![1]), (0, vec![2])]), 0xffffff)
            .unwrap_err();
        assert_eq!(err, FramebufferError::DuplicateRow { row: 0 });
        assert_eq!(framebuffer.written_rows(), 1);
    }

    #[test]
    fn malformed_rows_are_rejected() {
        let mut framebuffer = Framebuffer::allocate(2, 2).unwrap();
        assert_eq!(
            framebuffer
                .apply(&completion(&[(2, vec![0, 0])]), 0xffffff)
                .unwrap_err(),
            FramebufferError::RowOutOfRange { row: 2, height: 2 }
        );
        assert_eq!(
            framebuffer
                .apply(&completion(&[(0, vec![0])]), 0xffffff)
                .unwrap_err(),
            FramebufferError::WrongWidth {
                row: 0,
                got: 1,
                width: 2
            }
        );
    }

    #[test]
    fn absurd_sizes_fail_to_allocate() {
        let err = Framebuffer::allocate(u32::MAX, u32::MAX).unwrap_err();
        assert!(matches!(err, FramebufferError::Allocation { .. }));
    }
}
