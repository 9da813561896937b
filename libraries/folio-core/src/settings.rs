//! Sampling and persistence cadences

use crate::error::{FolioError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Progress tracking settings
///
/// Sampling rate (how often the UI reads the live signal) and persistence rate
/// (how often it is written through) are independent knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSettings {
    /// Quiet period after the last scroll before the offset is written (default: 2000)
    #[serde(default = "default_scroll_debounce_ms")]
    pub scroll_debounce_ms: u64,

    /// Period between playback position writes while playing (default: 2000)
    #[serde(default = "default_playback_persist_interval_ms")]
    pub playback_persist_interval_ms: u64,

    /// Minimum spacing of playback position updates sent to the UI (default: 250)
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,

    /// Saved positions must exceed this to be offered for resume (default: 0.0)
    #[serde(default)]
    pub resume_threshold: f64,

    /// Step used by the skip-forward and rewind controls, in seconds (default: 10.0)
    #[serde(default = "default_skip_seconds")]
    pub skip_seconds: f64,
}

impl ProgressSettings {
    pub fn scroll_debounce(&self) -> Duration {
        Duration::from_millis(self.scroll_debounce_ms)
    }

    pub fn playback_persist_interval(&self) -> Duration {
        Duration::from_millis(self.playback_persist_interval_ms)
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<()> {
        if self.scroll_debounce_ms == 0 {
            return Err(FolioError::config("scroll_debounce_ms must be positive"));
        }
        if self.playback_persist_interval_ms == 0 {
            return Err(FolioError::config(
                "playback_persist_interval_ms must be positive",
            ));
        }
        if !self.resume_threshold.is_finite() || self.resume_threshold < 0.0 {
            return Err(FolioError::config(format!(
                "resume_threshold must be a non-negative number, got {}",
                self.resume_threshold
            )));
        }
        if !self.skip_seconds.is_finite() || self.skip_seconds <= 0.0 {
            return Err(FolioError::config(format!(
                "skip_seconds must be positive, got {}",
                self.skip_seconds
            )));
        }
        Ok(())
    }
}

fn default_scroll_debounce_ms() -> u64 {
    2000
}

fn default_playback_persist_interval_ms() -> u64 {
    2000
}

fn default_sample_interval_ms() -> u64 {
    250
}

fn default_skip_seconds() -> f64 {
    10.0
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            scroll_debounce_ms: default_scroll_debounce_ms(),
            playback_persist_interval_ms: default_playback_persist_interval_ms(),
            sample_interval_ms: default_sample_interval_ms(),
            resume_threshold: 0.0,
            skip_seconds: default_skip_seconds(),
        }
    }
}
