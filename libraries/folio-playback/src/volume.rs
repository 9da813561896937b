//! Volume control for live streams
//!
//! Live mode exposes volume instead of transport controls. Levels are the
//! media element's linear 0.0-1.0 scale.

/// Volume controller
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    /// Volume level (0.0-1.0)
    level: f64,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl Volume {
    /// Create new volume controller
    ///
    /// # Arguments
    /// * `level` - Initial volume, clamped to 0.0-1.0 (default: 1.0)
    pub fn new(level: f64) -> Self {
        Self {
            level: Self::clamp_level(level),
            muted: false,
        }
    }

    /// Set volume level (0.0-1.0)
    pub fn set_level(&mut self, level: f64) {
        self.level = Self::clamp_level(level);
    }

    /// Get current volume level (0.0-1.0)
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Mute audio (preserves volume level)
    pub fn mute(&mut self) {
        self.muted = true;
    }

    /// Unmute audio (restores previous volume)
    pub fn unmute(&mut self) {
        self.muted = false;
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Level as a whole percentage for display
    pub fn percent(&self) -> u8 {
        (self.level * 100.0).round() as u8
    }

    fn clamp_level(level: f64) -> f64 {
        if level.is_nan() {
            return 1.0;
        }
        level.clamp(0.0, 1.0)
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(1.0)
    }
}
