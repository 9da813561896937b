/// Replay error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReplayError>;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid session script: {0}")]
    Script(String),

    #[error("Progress error: {0}")]
    Folio(#[from] folio_core::FolioError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReplayError {
    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }
}
