use complex_rs::complex::Complex;
use serde::{Deserialize, Serialize};

use crate::config::RenderConfig;

/// |z|² at or beyond this value means the orbit escaped.
pub const DIVERGENCE_THRESHOLD: f64 = 4.0;

/// Per-render factors mapping pixels to the complex plane and iteration
/// counts to colors.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Scales {
    pub color: f64,
    pub re: f64,
    pub im: f64,
}

impl Scales {
    pub fn new(config: &RenderConfig) -> Self {
        let color = if config.iterations > 1 {
            (config.color_max as f64 - config.color_min as f64)
                / (config.iterations - 1) as f64
        } else {
            0.0
        };

        Self {
            color,
            re: (config.max_re - config.min_re) / config.width as f64,
            im: (config.max_im - config.min_im) / config.height as f64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mandelbrot {
    scales: Scales,
    min_re: f64,
    min_im: f64,
    width: u32,
    height: u32,
    max_iterations: u32,
    color_min: i64,
}

impl Mandelbrot {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            scales: Scales::new(config),
            min_re: config.min_re,
            min_im: config.min_im,
            width: config.width,
            height: config.height,
            max_iterations: config.iterations,
            color_min: config.color_min as i64,
        }
    }

    pub fn scales(&self) -> Scales {
        self.scales
    }

    /// Point of the complex plane shown at pixel (`col`, `row`). Row 0 is the
    /// top of the image, so the imaginary axis is flipped.
    pub fn point(&self, col: u32, row: u32) -> Complex {
        Complex::new(
            self.min_re + col as f64 * self.scales.re,
            self.min_im + (self.height as f64 - 1.0 - row as f64) * self.scales.im,
        )
    }

    /// Escape-time iteration count, always within `1..=max_iterations`.
    pub fn iterations(&self, col: u32, row: u32) -> u32 {
        let c = self.point(col, row);
        let mut z = Complex::ZERO;
        let mut n = 0;

        loop {
            z = z.square() + c;
            n += 1;
            if z.arg_sq() >= DIVERGENCE_THRESHOLD || n >= self.max_iterations {
                return n;
            }
        }
    }

    /// Unmasked, unclamped color of a pixel. Masking happens when the row is
    /// written into the framebuffer.
    pub fn raw_color(&self, col: u32, row: u32) -> i64 {
        let n = self.iterations(col, row);
        ((n - 1) as f64 * self.scales.color) as i64 + self.color_min
    }

    /// Raw colors of every column of `row`.
    pub fn row(&self, row: u32) -> Vec<i64> {
        (0..self.width).map(|col| self.raw_color(col, row)).collect()
    }
}
