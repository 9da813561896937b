//! Folio - Progress Tracking
//!
//! Remembers where a reader or listener left off and offers to take them back.
//!
//! This crate provides:
//! - `ProgressTracker` - reads and writes resume offsets through a [`KeyValueStore`]
//! - `Cadence` / `SampleSchedule` - coalesces high-frequency position signals into
//!   at most one write per window, with a forced final write on deactivation
//! - `ScrollProgressSource` - article scroll offset, reading percentage and the
//!   "continue reading" prompt
//!
//! # Time model
//!
//! Everything is single-threaded and event-driven. Handlers take the host's
//! current `Instant`; pending writes are deadlines the host polls, so nothing
//! can fire after a component is dropped.
//!
//! # Example: Article scroll
//!
//! ```rust
//! use folio_core::{KeyValueStore, PositionKey, ProgressSettings};
//! use folio_progress::{ProgressTracker, ScrollMetrics, ScrollProgressSource};
//! use folio_storage::MemoryStore;
//! use std::sync::Arc;
//! use std::time::{Duration, Instant};
//!
//! let store = Arc::new(MemoryStore::new());
//! let settings = ProgressSettings::default();
//! let start = Instant::now();
//!
//! let (mut article, prompt) = ScrollProgressSource::attach(
//!     ProgressTracker::new(store.clone()),
//!     PositionKey::reading("42"),
//!     &settings,
//!     ScrollMetrics::new(0.0, 5000.0, 1000.0),
//!     start,
//! );
//! assert!(prompt.is_none());
//!
//! let percent = article.on_scroll(ScrollMetrics::new(1600.0, 5000.0, 1000.0), start);
//! assert_eq!(percent, 40.0);
//!
//! // Written once scrolling has been quiet for the debounce window
//! article.poll(start + Duration::from_secs(2));
//! assert_eq!(store.get("progress-42").unwrap().as_deref(), Some("1600"));
//! ```
//!
//! [`KeyValueStore`]: folio_core::KeyValueStore

#![forbid(unsafe_code)]

mod cadence;
mod schedule;
mod scroll;
mod source;
mod tracker;

// Public exports
pub use cadence::{Cadence, Throttle};
pub use schedule::SampleSchedule;
pub use scroll::{ResumePrompt, ScrollBehavior, ScrollMetrics, ScrollProgressSource, ScrollTo};
pub use source::PositionSource;
pub use tracker::ProgressTracker;
