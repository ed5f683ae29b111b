use std::{io, path::PathBuf};

use thiserror::Error;

use crate::{
    config::ConfigError, graphics::framebuffer::FramebufferError,
    networking::error::NetworkingError,
};

/// Everything that can end a render early.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("unable to allocate {what}: {detail}")]
    Resource { what: &'static str, detail: String },

    #[error("transport failure: {0}")]
    Transport(#[from] NetworkingError),

    #[error("failed to assemble image: {0}")]
    Assembly(FramebufferError),

    #[error("failed to write bitmap to '{}': {source}", path.display())]
    Output { path: PathBuf, source: io::Error },
}

impl From<FramebufferError> for RenderError {
    fn from(error: FramebufferError) -> Self {
        match error {
            FramebufferError::Allocation { .. } => RenderError::Resource {
                what: "framebuffer",
                detail: error.to_string(),
            },
            other => RenderError::Assembly(other),
        }
    }
}

impl RenderError {
    pub fn exit_code(&self) -> i32 {
        match self {
            RenderError::Config(_) => 2,
            RenderError::Resource { .. } => 3,
            RenderError::Transport(_) | RenderError::Assembly(_) => 4,
            RenderError::Output { .. } => 5,
        }
    }
}

pub type RenderResult<T> = Result<T, RenderError>;
