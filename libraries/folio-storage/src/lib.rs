//! Folio Storage
//!
//! Implementations of [`folio_core::KeyValueStore`] plus the small bits of
//! reader state the app keeps next to saved positions.
//!
//! - `MemoryStore` - in-process map (tests, session-only hosts)
//! - `JsonFileStore` - one JSON object on disk, the native stand-in for browser local storage
//! - `UnavailableStore` - storage switched off; every call fails
//! - `ReaderShelf` - reading history, likes and bookmarks

#![forbid(unsafe_code)]

mod file;
mod memory;
mod shelf;
mod unavailable;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use shelf::{ReaderShelf, BOOKMARKED_STORIES_KEY, LIKED_STORIES_KEY, READING_HISTORY_KEY};
pub use unavailable::UnavailableStore;
