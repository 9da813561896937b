/// Core error types for Folio
use thiserror::Error;

/// Result type alias using `FolioError`
pub type Result<T> = std::result::Result<T, FolioError>;

/// Core error type for Folio
#[derive(Error, Debug)]
pub enum FolioError {
    /// Key-value store could not be read or written (quota, disabled, poisoned)
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Playback rate outside the supported set
    #[error("Unsupported playback rate: {0}")]
    UnsupportedPlaybackRate(f64),

    /// Operation not offered by the current transport mode
    #[error("{operation} is not available in this mode")]
    Disabled { operation: &'static str },

    /// Seek or skip target that is not a finite number of seconds
    #[error("Invalid position: {0}")]
    InvalidPosition(f64),

    /// Media metadata has not been loaded (or failed to load)
    #[error("No media loaded")]
    NotLoaded,

    /// Media element refused an operation
    #[error("Media error: {0}")]
    Media(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl FolioError {
    /// Create a store unavailable error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    /// Create a media error
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a disabled-operation error
    pub fn disabled(operation: &'static str) -> Self {
        Self::Disabled { operation }
    }
}
