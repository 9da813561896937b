//! Folio Replay Library
//!
//! Replays recorded reading and listening sessions against the progress
//! engine with a file-backed store, for inspecting resume behaviour.
//!
//! This library exposes the core components for testing purposes.

pub mod config;
pub mod error;
pub mod media;
pub mod replay;
pub mod script;

// Re-export commonly used types for convenience
pub use config::ReplayConfig;
pub use error::{ReplayError, Result};
pub use media::SimulatedMedia;
pub use replay::{Exit, Report, Replayer, Visit};
pub use script::{Action, Content, Session, Step};
