//! Simulated audio element with a virtual clock

use folio_core::{FolioError, Result};
use folio_playback::MediaElement;

/// Audio element whose clock only moves when told to
#[derive(Debug, Clone)]
pub struct SimulatedMedia {
    time: f64,
    duration: Option<f64>,
    playing: bool,
    rate: f64,
    volume: f64,
    muted: bool,
    load_error: Option<String>,
}

impl SimulatedMedia {
    /// A source of `duration` seconds, or a live stream when `None`
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            time: 0.0,
            duration,
            playing: false,
            rate: 1.0,
            volume: 1.0,
            muted: false,
            load_error: None,
        }
    }

    /// A source that fails to load
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            load_error: Some(message.into()),
            ..Self::new(None)
        }
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Let `seconds` of wall-clock time pass
    ///
    /// Returns true when playback reached the end.
    pub fn advance(&mut self, seconds: f64) -> bool {
        if !self.playing {
            return false;
        }

        self.time += seconds * self.rate;
        match self.duration {
            Some(duration) if self.time >= duration => {
                self.time = duration;
                self.playing = false;
                true
            }
            _ => false,
        }
    }
}

impl MediaElement for SimulatedMedia {
    fn current_time(&self) -> f64 {
        self.time
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.time = match self.duration {
            Some(duration) => seconds.clamp(0.0, duration),
            None => seconds.max(0.0),
        };
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn play(&mut self) -> Result<()> {
        if let Some(message) = &self.load_error {
            return Err(FolioError::media(message.clone()));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}
