//! Folio - Playback
//!
//! Audio transport for narrated stories and podcasts.
//!
//! This crate provides:
//! - `Transport` - state machine over a host [`MediaElement`] that restores and
//!   saves the listening position
//! - `TransportMode` - recorded (seekable, remembered) vs live (volume only)
//! - `PlaybackRate` - the fixed set of supported speeds
//! - `TransportEvent` - queued UI notifications
//!
//! # States
//!
//! ```text
//! Idle -> Loaded -> {Playing <-> Paused} -> Ended
//! ```
//!
//! Recorded sources resume silently on load when the saved position lies
//! strictly inside the source. While playing, the position is written once
//! per persistence interval; pause, end and detach force a final write.

#![forbid(unsafe_code)]

mod events;
mod format;
mod media;
mod mode;
mod rate;
mod transport;
mod types;
mod volume;

// Public exports
pub use events::TransportEvent;
pub use format::format_time;
pub use media::{MediaElement, MediaEvent};
pub use mode::TransportMode;
pub use rate::PlaybackRate;
pub use transport::Transport;
pub use types::{PlaybackSnapshot, TransportState};
pub use volume::Volume;
