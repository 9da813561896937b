//! Transport Events
//!
//! Event-based communication for UI synchronization. Events are queued by the
//! transport and drained by the host after each call:
//! - State changes (loaded/play/pause/ended)
//! - Position updates (at the sampling rate, not the persistence rate)
//! - Resume and save notifications
//! - Rate and volume changes

use crate::rate::PlaybackRate;
use crate::types::TransportState;
use folio_core::PositionKey;
use serde::{Deserialize, Serialize};

/// Events emitted by the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransportEvent {
    /// Transport state changed
    StateChanged {
        /// The new state
        state: TransportState,
    },

    /// Displayed position changed
    ///
    /// Throttled to the configured sample interval during playback; emitted
    /// immediately for seeks and skips.
    PositionUpdate {
        /// Current position in seconds
        position: f64,
        /// Total duration in seconds (0 when unknown)
        duration: f64,
    },

    /// Playback jumped to a saved position on load
    Resumed {
        /// Restored position in seconds
        position: f64,
    },

    /// A resume offset was written
    PositionSaved {
        key: PositionKey,
        position: f64,
    },

    /// Playback rate changed
    RateChanged { rate: PlaybackRate },

    /// Volume changed (live mode)
    VolumeChanged {
        /// New volume level (0-100)
        level: u8,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// The source could not be loaded
    LoadFailed {
        /// Error message
        message: String,
    },
}
