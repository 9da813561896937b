//! Host media element abstraction
//!
//! The transport never decodes audio itself. It drives whatever element the
//! host provides (a browser `<audio>`, a native player, a test double) and
//! reacts to the events that element reports.

use folio_core::Result;

/// Platform-agnostic media element
///
/// Positions and durations are in seconds. Implementors clamp
/// `set_current_time` to their own bounds the way a browser element does.
pub trait MediaElement {
    /// Current playback position
    fn current_time(&self) -> f64;

    /// Move the playback position
    fn set_current_time(&mut self, seconds: f64);

    /// Total length, once metadata is available
    ///
    /// `None` while loading, and for live streams of indefinite length.
    fn duration(&self) -> Option<f64>;

    /// Start or resume playback
    ///
    /// # Returns
    /// * `Ok(())` - Playback requested
    /// * `Err(_)` - The element refused (autoplay policy, missing source)
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self);

    fn set_playback_rate(&mut self, rate: f64);

    /// Set linear volume (0.0-1.0)
    fn set_volume(&mut self, volume: f64);

    fn set_muted(&mut self, muted: bool);
}

/// Events reported by the media element
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Duration is known
    LoadedMetadata,

    /// Playback position advanced
    TimeUpdate,

    Play,

    Pause,

    /// Reached the end of the source
    Ended,

    /// The source failed to load or decode
    Error(String),
}
