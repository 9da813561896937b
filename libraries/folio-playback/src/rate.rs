//! Playback speed

use folio_core::FolioError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported playback speeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackRate {
    /// 0.5x
    Half,
    /// 0.75x
    ThreeQuarters,
    /// 1x
    #[default]
    Normal,
    /// 1.25x
    OneAndQuarter,
    /// 1.5x
    OneAndHalf,
    /// 2x
    Double,
}

impl PlaybackRate {
    /// Every supported rate, slowest first (menu order)
    pub const ALL: [PlaybackRate; 6] = [
        PlaybackRate::Half,
        PlaybackRate::ThreeQuarters,
        PlaybackRate::Normal,
        PlaybackRate::OneAndQuarter,
        PlaybackRate::OneAndHalf,
        PlaybackRate::Double,
    ];

    /// Speed multiplier applied to the media element
    pub fn as_f64(self) -> f64 {
        match self {
            PlaybackRate::Half => 0.5,
            PlaybackRate::ThreeQuarters => 0.75,
            PlaybackRate::Normal => 1.0,
            PlaybackRate::OneAndQuarter => 1.25,
            PlaybackRate::OneAndHalf => 1.5,
            PlaybackRate::Double => 2.0,
        }
    }

    pub fn is_normal(self) -> bool {
        self == PlaybackRate::Normal
    }
}

impl TryFrom<f64> for PlaybackRate {
    type Error = FolioError;

    /// Out-of-set rates are rejected, never rounded to a neighbour
    fn try_from(rate: f64) -> Result<Self, Self::Error> {
        PlaybackRate::ALL
            .into_iter()
            .find(|r| (r.as_f64() - rate).abs() < 1e-9)
            .ok_or(FolioError::UnsupportedPlaybackRate(rate))
    }
}

impl fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.as_f64())
    }
}
