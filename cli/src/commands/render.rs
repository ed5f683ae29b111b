use std::path::PathBuf;

use clap::Args;
use shared::config::{
    RenderOptions, DEFAULT_AXIS_LENGTH, DEFAULT_BLOCK_SIZE, DEFAULT_ITERATIONS, DEFAULT_OUTPUT,
    DEFAULT_SIZE,
};

/// Render parameters. Every process of one run must receive the same values.
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Width of resulting image. Has to be a positive integer.
    #[arg(short = 'c', long, env = "FRAKT_WIDTH", default_value_t = DEFAULT_SIZE)]
    pub width: u32,

    /// Height of resulting image. Has to be a positive integer.
    #[arg(short = 'r', long, env = "FRAKT_HEIGHT", default_value_t = DEFAULT_SIZE)]
    pub height: u32,

    /// Maximum number of iterations for each pixel.
    #[arg(short = 'n', long, env = "FRAKT_ITERATIONS", default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: u32,

    /// Filename of resulting bitmap.
    #[arg(short = 'o', long, env = "FRAKT_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Number of rows assigned to a worker at once. Has to divide the height
    /// and be at most height / worker count.
    #[arg(short = 'b', long, env = "FRAKT_BLOCK_SIZE", default_value_t = DEFAULT_BLOCK_SIZE)]
    pub block_size: u32,

    /// X-offset from [0,0].
    #[arg(short = 'x', long, env = "FRAKT_X_OFFSET", default_value_t = 0.0, allow_negative_numbers = true)]
    pub x_offset: f64,

    /// Y-offset from [0,0].
    #[arg(short = 'y', long, env = "FRAKT_Y_OFFSET", default_value_t = 0.0, allow_negative_numbers = true)]
    pub y_offset: f64,

    /// Half-extent of the x/y-axis around the offsets. A negative value
    /// inverts both axes. Has to be non-zero.
    #[arg(short = 'a', long, env = "FRAKT_AXIS_LENGTH", default_value_t = DEFAULT_AXIS_LENGTH, allow_negative_numbers = true)]
    pub axis_length: f64,

    /// Minimum color of the resulting image (hex).
    #[arg(short = 'p', long, env = "FRAKT_COLOR_MIN", default_value = "0x000000", value_parser = parse_hex)]
    pub color_min: u32,

    /// Maximum color of the resulting image (hex).
    #[arg(short = 'q', long, env = "FRAKT_COLOR_MAX", default_value = "0xffffff", value_parser = parse_hex)]
    pub color_max: u32,

    /// Hex mask applied to every pixel color.
    #[arg(short = 'm', long, env = "FRAKT_COLOR_MASK", default_value = "0xffffff", value_parser = parse_hex)]
    pub color_mask: u32,

    /// Log the progress of the computation.
    #[arg(short = 's', long = "progress", env = "FRAKT_PROGRESS")]
    pub show_progress: bool,
}

impl From<RenderArgs> for RenderOptions {
    fn from(args: RenderArgs) -> Self {
        RenderOptions {
            width: args.width,
            height: args.height,
            iterations: args.iterations,
            block_size: args.block_size,
            x_offset: args.x_offset,
            y_offset: args.y_offset,
            axis_length: args.axis_length,
            color_min: args.color_min,
            color_max: args.color_max,
            color_mask: args.color_mask,
            output: args.output,
            show_progress: args.show_progress,
        }
    }
}

fn parse_hex(value: &str) -> Result<u32, String> {
    let digits = value
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X")
        .trim_start_matches('#');
    u32::from_str_radix(digits, 16).map_err(|e| format!("'{}' is not a hex number: {}", value, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_accepts_common_spellings() {
        assert_eq!(parse_hex("0xff00ff"), Ok(0xff00ff));
        assert_eq!(parse_hex("FF00FF"), Ok(0xff00ff));
        assert_eq!(parse_hex("#00ff00"), Ok(0x00ff00));
        assert!(parse_hex("0xzz").is_err());
    }
}
