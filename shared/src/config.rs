use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SIZE: u32 = 1024;
pub const DEFAULT_ITERATIONS: u32 = 2000;
pub const DEFAULT_BLOCK_SIZE: u32 = 1;
pub const DEFAULT_AXIS_LENGTH: f64 = 2.0;
pub const DEFAULT_COLOR_MIN: u32 = 0x000000;
pub const DEFAULT_COLOR_MAX: u32 = 0xffffff;
pub const DEFAULT_COLOR_MASK: u32 = 0xffffff;
pub const DEFAULT_OUTPUT: &str = "./mandelbrot.bmp";

const COLOR_LIMIT: u32 = 0xffffff;

/// Which side of the protocol a process plays. Assigned once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Coordinator,
    Worker,
}

impl Role {
    /// Configuration errors are detected everywhere but reported only once.
    pub fn reports_errors(self) -> bool {
        matches!(self, Role::Coordinator)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("argument '{name}' has to be greater than zero (got {value})")]
    NotPositive { name: &'static str, value: u32 },

    #[error("axis length cannot be zero")]
    ZeroAxisLength,

    #[error("color '{name}' must fit in 24 bits (got 0x{value:x})")]
    ColorOutOfRange { name: &'static str, value: u32 },

    #[error("at least one worker is required")]
    NoWorkers,

    #[error("block size {block_size} has to be a divisor of height {height}")]
    BlockSizeNotDivisor { block_size: u32, height: u32 },

    #[error("block size {block_size} has to be at most {max} (height / worker count)")]
    BlockSizeTooLarge { block_size: u32, max: u32 },
}

/// Startup parameters as supplied by the operator, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub iterations: u32,
    pub block_size: u32,
    pub x_offset: f64,
    pub y_offset: f64,
    pub axis_length: f64,
    pub color_min: u32,
    pub color_max: u32,
    pub color_mask: u32,
    pub output: PathBuf,
    pub show_progress: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            iterations: DEFAULT_ITERATIONS,
            block_size: DEFAULT_BLOCK_SIZE,
            x_offset: 0.0,
            y_offset: 0.0,
            axis_length: DEFAULT_AXIS_LENGTH,
            color_min: DEFAULT_COLOR_MIN,
            color_max: DEFAULT_COLOR_MAX,
            color_mask: DEFAULT_COLOR_MASK,
            output: PathBuf::from(DEFAULT_OUTPUT),
            show_progress: false,
        }
    }
}

/// Validated, immutable render parameters. Every process derives the same
/// value from the same options; it never crosses the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub iterations: u32,
    pub block_size: u32,
    pub min_re: f64,
    pub max_re: f64,
    pub min_im: f64,
    pub max_im: f64,
    pub color_min: u32,
    pub color_max: u32,
    pub color_mask: u32,
    pub output: PathBuf,
    pub show_progress: bool,
    pub x_offset: f64,
    pub y_offset: f64,
    pub axis_length: f64,
}

impl RenderConfig {
    pub fn new(options: RenderOptions, worker_count: usize) -> Result<Self, ConfigError> {
        positive("width", options.width)?;
        positive("height", options.height)?;
        positive("iterations", options.iterations)?;
        positive("block size", options.block_size)?;

        if options.axis_length == 0.0 {
            return Err(ConfigError::ZeroAxisLength);
        }

        for (name, value) in [
            ("minimum color", options.color_min),
            ("maximum color", options.color_max),
            ("color mask", options.color_mask),
        ] {
            if value > COLOR_LIMIT {
                return Err(ConfigError::ColorOutOfRange { name, value });
            }
        }

        if worker_count == 0 {
            return Err(ConfigError::NoWorkers);
        }

        if options.height % options.block_size != 0 {
            return Err(ConfigError::BlockSizeNotDivisor {
                block_size: options.block_size,
                height: options.height,
            });
        }

        let max = u32::try_from(options.height as usize / worker_count).unwrap_or(u32::MAX);
        if options.block_size > max {
            return Err(ConfigError::BlockSizeTooLarge {
                block_size: options.block_size,
                max,
            });
        }

        let a = options.axis_length;
        Ok(Self {
            width: options.width,
            height: options.height,
            iterations: options.iterations,
            block_size: options.block_size,
            min_re: options.x_offset - a,
            max_re: options.x_offset + a,
            min_im: options.y_offset - a,
            max_im: options.y_offset + a,
            color_min: options.color_min,
            color_max: options.color_max,
            color_mask: options.color_mask,
            output: options.output,
            show_progress: options.show_progress,
            x_offset: options.x_offset,
            y_offset: options.y_offset,
            axis_length: a,
        })
    }

    pub fn block_count(&self) -> u32 {
        self.height / self.block_size
    }
}

fn positive(name: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::NotPositive { name, value });
    }
    Ok(())
}

impl fmt::Display for RenderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    output file              {}", self.output.display())?;
        writeln!(f, "    maximum iterations       {}", self.iterations)?;
        writeln!(f, "    blocksize                {}", self.block_size)?;
        writeln!(f, "    image width              {}", self.width)?;
        writeln!(f, "    image height             {}", self.height)?;
        writeln!(f, "    minimum color            0x{:06x}", self.color_min)?;
        writeln!(f, "    maximum color            0x{:06x}", self.color_max)?;
        writeln!(f, "    color mask               0x{:06x}", self.color_mask)?;
        writeln!(f, "    x-offset                 {}", self.x_offset)?;
        writeln!(f, "    y-offset                 {}", self.y_offset)?;
        writeln!(f, "    axis length              {}", self.axis_length)?;
        write!(
            f,
            "    coordinate system range  [{}, {}]",
            self.min_re, self.max_re
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(height: u32, block_size: u32) -> RenderOptions {
        RenderOptions {
            height,
            block_size,
            ..RenderOptions::default()
        }
    }

    #[test]
    fn defaults_are_valid_for_many_workers() {
        let config = RenderConfig::new(RenderOptions::default(), 8).unwrap();
        assert_eq!(config.width, 1024);
        assert_eq!(config.iterations, 2000);
        assert_eq!((config.min_re, config.max_re), (-2.0, 2.0));
        assert_eq!((config.min_im, config.max_im), (-2.0, 2.0));
        assert_eq!(config.block_count(), 1024);
    }

    #[test]
    fn block_size_must_divide_height() {
        let err = RenderConfig::new(options(10, 3), 1).unwrap_err();
        assert_eq!(
            err,
            ConfigError::BlockSizeNotDivisor {
                block_size: 3,
                height: 10
            }
        );
    }

    #[test]
    fn block_size_must_leave_a_block_per_worker() {
        let err = RenderConfig::new(options(12, 6), 3).unwrap_err();
        assert_eq!(err, ConfigError::BlockSizeTooLarge { block_size: 6, max: 4 });
    }

    #[test]
    fn oversized_block_is_rejected() {
        let err = RenderConfig::new(options(10, 6), 1).unwrap_err();
        assert_eq!(
            err,
            ConfigError::BlockSizeNotDivisor {
                block_size: 6,
                height: 10
            }
        );
    }

    #[test]
    fn zero_values_are_rejected() {
        let err = RenderConfig::new(
            RenderOptions {
                width: 0,
                ..RenderOptions::default()
            },
            1,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::NotPositive {
                name: "width",
                value: 0
            }
        );

        let err = RenderConfig::new(
            RenderOptions {
                axis_length: 0.0,
                ..RenderOptions::default()
            },
            1,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::ZeroAxisLength);

        let err = RenderConfig::new(RenderOptions::default(), 0).unwrap_err();
        assert_eq!(err, ConfigError::NoWorkers);
    }

    #[test]
    fn colors_wider_than_24_bits_are_rejected() {
        let err = RenderConfig::new(
            RenderOptions {
                color_mask: 0x1000000,
                ..RenderOptions::default()
            },
            1,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::ColorOutOfRange {
                name: "color mask",
                value: 0x1000000
            }
        );
    }

    #[test]
    fn negative_axis_length_inverts_rectangle() {
        let config = RenderConfig::new(
            RenderOptions {
                x_offset: -0.5,
                y_offset: 0.25,
                axis_length: -1.0,
                ..RenderOptions::default()
            },
            1,
        )
        .unwrap();
        assert_eq!((config.min_re, config.max_re), (0.5, -1.5));
        assert_eq!((config.min_im, config.max_im), (1.25, -0.75));
    }

    #[test]
    fn identical_options_give_identical_configs() {
        let a = RenderConfig::new(options(64, 4), 4).unwrap();
        let b = RenderConfig::new(options(64, 4), 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn only_the_coordinator_reports() {
        assert!(Role::Coordinator.reports_errors());
        assert!(!Role::Worker.reports_errors());
    }
}
