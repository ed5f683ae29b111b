use thiserror::Error;

use crate::models::fragments::messages::WorkerId;

#[derive(Debug, Error)]
pub enum NetworkingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("expected {expected} message, got {got}")]
    UnexpectedMessage { expected: &'static str, got: String },

    #[error("channel to {0} closed")]
    ChannelClosed(String),

    #[error("worker {0} disconnected")]
    Disconnected(WorkerId),

    #[error("worker '{name}' runs with a different configuration: {detail}")]
    ConfigMismatch { name: String, detail: String },

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("worker task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}
