//! Folio Core
//!
//! Platform-agnostic types, traits, and error handling shared by the Folio
//! reading/listening progress crates.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Keys**: `PositionKey` scopes a saved position to one content item and one modality
//! - **Positions**: `PersistedPosition` and its plain-text storage encoding
//! - **Store trait**: `KeyValueStore`, the synchronous string store every tracker writes through
//! - **Settings**: `ProgressSettings`, the sampling and persistence cadences
//! - **Error Handling**: Unified `FolioError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use folio_core::{PersistedPosition, PositionKey};
//!
//! let key = PositionKey::narration("story-42", "algenib");
//! assert_eq!(key.as_str(), "narration-progress-story-42-algenib");
//!
//! let saved = PersistedPosition::new(key, 12.5).unwrap();
//! assert_eq!(PersistedPosition::decode(&saved.encode()), Some(12.5));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod key;
pub mod position;
pub mod settings;
pub mod store;

// Re-export commonly used types
pub use error::{FolioError, Result};
pub use key::PositionKey;
pub use position::PersistedPosition;
pub use settings::ProgressSettings;
pub use store::KeyValueStore;
