//! Core types for transport state

use crate::rate::PlaybackRate;
use serde::{Deserialize, Serialize};

/// Transport state
///
/// `Idle -> Loaded -> {Playing, Paused} -> Ended`. `Ended` is left again by
/// seeking back or replaying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransportState {
    /// No metadata yet (or the source failed to load)
    #[default]
    Idle,

    /// Metadata available, never started
    Loaded,

    /// Currently playing
    Playing,

    /// Paused mid-source
    Paused,

    /// Reached the end
    Ended,
}

impl TransportState {
    /// Whether transport operations have something to act on
    pub fn is_loaded(self) -> bool {
        !matches!(self, TransportState::Idle)
    }

    pub fn is_playing(self) -> bool {
        matches!(self, TransportState::Playing)
    }
}

/// Everything a player UI needs to render one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub state: TransportState,

    /// Displayed position in seconds (follows an in-progress seek drag)
    pub position: f64,

    /// Total length in seconds (0 when unknown or live)
    pub duration: f64,

    /// Displayed position as 0-100 of duration (0 when duration is unknown)
    pub progress_percent: f64,

    pub rate: PlaybackRate,

    /// A seek drag is in progress
    pub seeking: bool,

    pub is_live: bool,

    /// Linear volume, live mode only
    pub volume: Option<f64>,

    pub muted: bool,
}

/// Percentage of `duration` covered by `position`, clamped to 0-100
pub(crate) fn progress_percent(position: f64, duration: f64) -> f64 {
    if !(duration.is_finite() && duration > 0.0) {
        return 0.0;
    }
    (position / duration * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_guards_unknown_duration() {
        assert_eq!(progress_percent(30.0, 0.0), 0.0);
        assert_eq!(progress_percent(30.0, f64::INFINITY), 0.0);
        assert_eq!(progress_percent(30.0, 120.0), 25.0);
        assert_eq!(progress_percent(200.0, 120.0), 100.0);
    }

    #[test]
    fn idle_is_not_loaded() {
        assert!(!TransportState::Idle.is_loaded());
        assert!(TransportState::Ended.is_loaded());
        assert!(TransportState::Playing.is_playing());
        assert!(!TransportState::Paused.is_playing());
    }
}
