//! Transport - drives one media element and keeps its resume offset in sync

use crate::events::TransportEvent;
use crate::media::{MediaElement, MediaEvent};
use crate::mode::TransportMode;
use crate::rate::PlaybackRate;
use crate::types::{progress_percent, PlaybackSnapshot, TransportState};
use crate::volume::Volume;
use folio_core::{FolioError, PositionKey, ProgressSettings, Result};
use folio_progress::{Cadence, ProgressTracker, SampleSchedule};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Resume offset bookkeeping for a recorded source
#[derive(Debug)]
struct Persistence {
    tracker: ProgressTracker,
    key: PositionKey,

    /// Running while playing
    schedule: Option<SampleSchedule>,
}

/// Audio transport state machine
///
/// Owns a host [`MediaElement`], reacts to its [`MediaEvent`]s and exposes the
/// player controls. While playing, the position is written every persistence
/// interval; pausing, ending or detaching forces one final write. Live streams
/// never write.
///
/// # Example
///
/// ```ignore
/// let mut transport = Transport::new(audio, TransportMode::Recorded, &settings)
///     .with_progress(tracker, PositionKey::narration("42", "algenib"));
///
/// transport.handle_event(MediaEvent::LoadedMetadata, now);
/// transport.toggle_play_pause(now)?;
///
/// for event in transport.drain_events() {
///     // update UI
/// }
/// ```
#[derive(Debug)]
pub struct Transport<M: MediaElement> {
    media: M,
    mode: TransportMode,
    state: TransportState,

    /// Known, finite, positive duration
    duration: Option<f64>,

    rate: PlaybackRate,

    /// Displayed position while the user drags the seek bar
    pending_seek: Option<f64>,

    /// `None` for live streams, after a load failure, or without a key
    persistence: Option<Persistence>,

    persist_interval: Duration,
    sample_interval: Duration,
    skip_seconds: f64,

    last_position_update: Option<Instant>,
    load_failed: bool,

    pending_events: Vec<TransportEvent>,
}

impl<M: MediaElement> Transport<M> {
    /// Create a transport without position persistence
    pub fn new(media: M, mode: TransportMode, settings: &ProgressSettings) -> Self {
        Self {
            media,
            mode,
            state: TransportState::Idle,
            duration: None,
            rate: PlaybackRate::default(),
            pending_seek: None,
            persistence: None,
            persist_interval: settings.playback_persist_interval(),
            sample_interval: settings.sample_interval(),
            skip_seconds: settings.skip_seconds,
            last_position_update: None,
            load_failed: false,
            pending_events: Vec::new(),
        }
    }

    /// Remember the playback position under `key`
    ///
    /// Ignored in live mode.
    pub fn with_progress(mut self, tracker: ProgressTracker, key: PositionKey) -> Self {
        if self.mode.persists_position() {
            self.persistence = Some(Persistence {
                tracker,
                key,
                schedule: None,
            });
        } else {
            debug!(key = %key, "Live stream, position will not be saved");
        }
        self
    }

    // ===== Accessors =====

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn mode(&self) -> &TransportMode {
        &self.mode
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    /// Mutable access for hosts that drive the element directly
    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    /// Total length in seconds, once known
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn rate(&self) -> PlaybackRate {
        self.rate
    }

    /// Displayed position: the seek drag target while dragging, else the element's
    pub fn position(&self) -> f64 {
        self.pending_seek
            .unwrap_or_else(|| self.media.current_time())
    }

    pub fn is_seeking(&self) -> bool {
        self.pending_seek.is_some()
    }

    pub fn is_load_failed(&self) -> bool {
        self.load_failed
    }

    /// Key the position is saved under, if persisting
    pub fn key(&self) -> Option<&PositionKey> {
        self.persistence.as_ref().map(|p| &p.key)
    }

    /// Whether positions are only being kept for this session
    pub fn is_degraded(&self) -> bool {
        self.persistence
            .as_ref()
            .is_some_and(|p| p.tracker.is_degraded())
    }

    /// When the next periodic write is due, if playing
    pub fn next_due(&self) -> Option<Instant> {
        self.persistence
            .as_ref()
            .and_then(|p| p.schedule.as_ref())
            .and_then(SampleSchedule::next_due)
    }

    /// Everything the player UI renders
    pub fn snapshot(&self) -> PlaybackSnapshot {
        let position = self.position();
        let duration = self.duration.unwrap_or(0.0);
        let volume = self.mode.volume();

        PlaybackSnapshot {
            state: self.state,
            position,
            duration,
            progress_percent: progress_percent(position, duration),
            rate: self.rate,
            seeking: self.pending_seek.is_some(),
            is_live: self.mode.is_live(),
            volume: volume.map(Volume::level),
            muted: volume.is_some_and(Volume::is_muted),
        }
    }

    /// Drain all pending events
    ///
    /// Call after each handler or user operation to update the UI.
    pub fn drain_events(&mut self) -> Vec<TransportEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Media element events =====

    /// Dispatch an event reported by the media element
    pub fn handle_event(&mut self, event: MediaEvent, now: Instant) {
        trace!(?event, "Media event");
        match event {
            MediaEvent::LoadedMetadata => self.on_loaded_metadata(),
            MediaEvent::TimeUpdate => self.on_time_update(now),
            MediaEvent::Play => self.on_play(now),
            MediaEvent::Pause => self.on_pause(),
            MediaEvent::Ended => self.on_ended(),
            MediaEvent::Error(message) => self.on_load_error(message),
        }
    }

    /// Duration is known: enter `Loaded` and restore the saved position
    pub fn on_loaded_metadata(&mut self) {
        if self.load_failed {
            debug!("Ignoring metadata after load failure");
            return;
        }

        self.duration = self
            .media
            .duration()
            .filter(|d| d.is_finite() && *d > 0.0);

        if self.state.is_loaded() {
            debug!(duration = ?self.duration, "Metadata reloaded");
            return;
        }

        match self.mode.volume().cloned() {
            Some(volume) => {
                self.media.set_volume(volume.level());
                self.media.set_muted(volume.is_muted());
            }
            None => {
                if !self.rate.is_normal() {
                    self.media.set_playback_rate(self.rate.as_f64());
                }
                self.restore_position();
            }
        }

        self.state = TransportState::Loaded;
        self.emit_state_changed();
        self.emit_position_update(self.media.current_time());
    }

    /// Position advanced: update the display and write if due
    pub fn on_time_update(&mut self, now: Instant) {
        if !self.state.is_loaded() {
            return;
        }

        if self.pending_seek.is_none() && self.position_update_due(now) {
            self.last_position_update = Some(now);
            self.emit_position_update(self.media.current_time());
        }

        self.poll(now);
    }

    /// Playback started (by the user or by the host)
    pub fn on_play(&mut self, now: Instant) {
        if !self.state.is_loaded() {
            debug!("Play before metadata, ignoring");
            return;
        }
        if self.state.is_playing() {
            return;
        }

        self.enter_playing(now);
    }

    /// Playback paused: stop the periodic save and write the exact position
    pub fn on_pause(&mut self) {
        if !self.state.is_playing() {
            return;
        }

        self.state = TransportState::Paused;
        self.flush_position();
        self.emit_state_changed();
    }

    /// Reached the end: stop the periodic save and write the final position
    pub fn on_ended(&mut self) {
        if !self.state.is_loaded() || self.state == TransportState::Ended {
            return;
        }

        self.state = TransportState::Ended;
        self.flush_position();
        self.emit_state_changed();
    }

    /// The source failed: stay inert and never persist for this session
    pub fn on_load_error(&mut self, message: String) {
        warn!(error = %message, "Media failed to load");

        self.load_failed = true;
        self.duration = None;
        self.pending_seek = None;
        // Dropping the schedule cancels it without writing
        self.persistence = None;

        if self.state != TransportState::Idle {
            self.state = TransportState::Idle;
            self.emit_state_changed();
        }
        self.pending_events.push(TransportEvent::LoadFailed { message });
    }

    /// Write the position if the persistence interval has elapsed
    ///
    /// Hosts with their own repeating timer call this directly; otherwise
    /// `TimeUpdate` events drive it. Returns the position written.
    pub fn poll(&mut self, now: Instant) -> Option<f64> {
        if !self.state.is_playing() {
            return None;
        }

        let persistence = self.persistence.as_mut()?;
        let schedule = persistence.schedule.as_mut()?;
        let media = &self.media;
        let source = || media.current_time();

        let position = schedule.poll(&mut persistence.tracker, &source, now)?;
        self.pending_events.push(TransportEvent::PositionSaved {
            key: persistence.key.clone(),
            position,
        });
        Some(position)
    }

    // ===== Transport controls =====

    /// Play when paused, pause when playing, replay when ended
    ///
    /// Returns the new state.
    pub fn toggle_play_pause(&mut self, now: Instant) -> Result<TransportState> {
        self.require_transport("toggle_play_pause")?;

        match self.state {
            TransportState::Playing => {
                self.media.pause();
                self.on_pause();
            }
            TransportState::Ended => self.replay(now)?,
            _ => {
                self.media.play()?;
                self.enter_playing(now);
            }
        }

        Ok(self.state)
    }

    /// Restart from the beginning
    pub fn replay(&mut self, now: Instant) -> Result<()> {
        self.require_transport("replay")?;

        self.pending_seek = None;
        self.apply_position(0.0);
        self.media.play()?;
        if !self.state.is_playing() {
            self.enter_playing(now);
        }

        info!("Replaying from start");
        Ok(())
    }

    /// Seek drag in progress: show `seconds` without moving the element
    ///
    /// Returns the displayed (clamped) position.
    pub fn handle_seek(&mut self, seconds: f64) -> Result<f64> {
        self.require_transport("seek")?;
        let target = self.clamp_target(seconds)?;

        self.pending_seek = Some(target);
        self.emit_position_update(target);
        Ok(target)
    }

    /// Seek released: move the element to `seconds`
    ///
    /// Play/pause state is unchanged, except that seeking back from `Ended`
    /// leaves the transport paused. Returns the element's new position.
    pub fn commit_seek(&mut self, seconds: f64, now: Instant) -> Result<f64> {
        self.require_transport("seek")?;
        let target = self.clamp_target(seconds)?;

        self.pending_seek = None;
        let position = self.apply_position(target);
        self.last_position_update = Some(now);
        self.save_if_stopped();

        debug!(position, "Seek committed");
        Ok(position)
    }

    /// Seek drag abandoned: show the element's real position again
    ///
    /// Returns whether a drag was in progress.
    pub fn cancel_seek(&mut self) -> bool {
        if self.pending_seek.take().is_none() {
            return false;
        }

        self.emit_position_update(self.media.current_time());
        true
    }

    /// Move by `delta` seconds (negative rewinds), clamped to the source
    ///
    /// Returns the element's new position.
    pub fn skip(&mut self, delta: f64) -> Result<f64> {
        self.require_transport("skip")?;
        if !delta.is_finite() {
            return Err(FolioError::InvalidPosition(delta));
        }

        let target = self.clamp_target(self.media.current_time() + delta)?;
        self.pending_seek = None;
        let position = self.apply_position(target);
        self.save_if_stopped();

        debug!(delta, position, "Skipped");
        Ok(position)
    }

    /// Skip ahead by the configured step
    pub fn skip_forward(&mut self) -> Result<f64> {
        self.skip(self.skip_seconds)
    }

    /// Skip back by the configured step
    pub fn skip_backward(&mut self) -> Result<f64> {
        self.skip(-self.skip_seconds)
    }

    /// Change speed to one of the supported rates
    ///
    /// Any other value is rejected with `UnsupportedPlaybackRate`. The position
    /// is not reset.
    pub fn set_playback_rate(&mut self, rate: f64) -> Result<PlaybackRate> {
        if !self.mode.has_transport_controls() {
            return Err(FolioError::disabled("set_playback_rate"));
        }
        let rate = PlaybackRate::try_from(rate)?;
        self.select_playback_rate(rate)
    }

    /// Change speed
    ///
    /// Before metadata arrives the rate is remembered and applied on load.
    /// After a load failure it is rejected with `NotLoaded`.
    pub fn select_playback_rate(&mut self, rate: PlaybackRate) -> Result<PlaybackRate> {
        if !self.mode.has_transport_controls() {
            return Err(FolioError::disabled("set_playback_rate"));
        }
        if self.load_failed {
            return Err(FolioError::NotLoaded);
        }
        if rate == self.rate {
            return Ok(rate);
        }

        self.rate = rate;
        if self.state.is_loaded() {
            self.media.set_playback_rate(rate.as_f64());
        }

        debug!(%rate, "Playback rate changed");
        self.pending_events
            .push(TransportEvent::RateChanged { rate });
        Ok(rate)
    }

    // ===== Volume (live mode) =====

    /// Set linear volume (0.0-1.0, clamped)
    ///
    /// Returns the applied level.
    pub fn set_volume(&mut self, level: f64) -> Result<f64> {
        let volume = self.volume_mut("set_volume")?;
        volume.set_level(level);
        let volume = volume.clone();

        self.apply_volume(&volume);
        Ok(volume.level())
    }

    /// Toggle mute, returning the new mute state
    pub fn toggle_mute(&mut self) -> Result<bool> {
        let volume = self.volume_mut("toggle_mute")?;
        volume.toggle_mute();
        let volume = volume.clone();

        self.apply_volume(&volume);
        Ok(volume.is_muted())
    }

    /// Mute audio (preserves volume level)
    pub fn mute(&mut self) -> Result<()> {
        let volume = self.volume_mut("mute")?;
        volume.mute();
        let volume = volume.clone();

        self.apply_volume(&volume);
        Ok(())
    }

    /// Unmute audio (restores previous volume)
    pub fn unmute(&mut self) -> Result<()> {
        let volume = self.volume_mut("unmute")?;
        volume.unmute();
        let volume = volume.clone();

        self.apply_volume(&volume);
        Ok(())
    }

    // ===== Teardown =====

    /// Stop tracking (unmount) and hand the element back
    ///
    /// Stops playback and, if it was running, writes the final position.
    pub fn detach(mut self) -> M {
        if self.state.is_playing() {
            self.media.pause();
            self.flush_position();
        }

        debug!(state = ?self.state, "Transport detached");
        let Self { media, .. } = self;
        media
    }

    // ===== Internals =====

    fn require_transport(&self, operation: &'static str) -> Result<()> {
        if !self.mode.has_transport_controls() {
            return Err(FolioError::disabled(operation));
        }
        if !self.state.is_loaded() {
            return Err(FolioError::NotLoaded);
        }
        Ok(())
    }

    fn volume_mut(&mut self, operation: &'static str) -> Result<&mut Volume> {
        match &mut self.mode {
            TransportMode::Live { volume } => Ok(volume),
            TransportMode::Recorded => Err(FolioError::disabled(operation)),
        }
    }

    fn apply_volume(&mut self, volume: &Volume) {
        self.media.set_volume(volume.level());
        self.media.set_muted(volume.is_muted());

        self.pending_events.push(TransportEvent::VolumeChanged {
            level: volume.percent(),
            is_muted: volume.is_muted(),
        });
    }

    fn enter_playing(&mut self, now: Instant) {
        self.state = TransportState::Playing;
        self.last_position_update = None;

        if let Some(persistence) = self.persistence.as_mut() {
            if persistence.schedule.is_none() {
                persistence.schedule = Some(persistence.tracker.schedule_sample(
                    persistence.key.clone(),
                    Cadence::Every(self.persist_interval),
                    now,
                ));
            }
        }

        self.emit_state_changed();
    }

    /// Jump to a saved position on load, if it lies strictly inside the source
    fn restore_position(&mut self) {
        let (Some(persistence), Some(duration)) = (self.persistence.as_mut(), self.duration)
        else {
            return;
        };
        let Some(saved) = persistence.tracker.initialize(&persistence.key) else {
            return;
        };

        if saved < duration {
            self.media.set_current_time(saved);
            info!(key = %persistence.key, position = saved, "Resumed playback position");
            self.pending_events
                .push(TransportEvent::Resumed { position: saved });
        } else {
            debug!(
                key = %persistence.key,
                saved,
                duration,
                "Saved position is at or past the end, starting over"
            );
        }
    }

    /// Cancel the periodic save and force one final write
    fn flush_position(&mut self) -> Option<f64> {
        let persistence = self.persistence.as_mut()?;
        let schedule = persistence.schedule.take()?;
        let media = &self.media;
        let source = || media.current_time();

        let position = schedule.finish(&mut persistence.tracker, &source)?;
        self.pending_events.push(TransportEvent::PositionSaved {
            key: persistence.key.clone(),
            position,
        });
        Some(position)
    }

    /// A seek or skip while not playing is written immediately; while
    /// playing the periodic save picks it up
    fn save_if_stopped(&mut self) {
        if self.state.is_playing() {
            return;
        }
        let Some(persistence) = self.persistence.as_mut() else {
            return;
        };

        let position = self.media.current_time();
        persistence
            .tracker
            .report_position(&persistence.key, position);
        self.pending_events.push(TransportEvent::PositionSaved {
            key: persistence.key.clone(),
            position,
        });
    }

    fn clamp_target(&self, seconds: f64) -> Result<f64> {
        if !seconds.is_finite() {
            return Err(FolioError::InvalidPosition(seconds));
        }

        let target = seconds.max(0.0);
        Ok(match self.duration {
            Some(duration) => target.min(duration),
            None => target,
        })
    }

    /// Move the element and report the position it actually landed on
    fn apply_position(&mut self, target: f64) -> f64 {
        self.media.set_current_time(target);
        let position = self.media.current_time();

        let before_end = match self.duration {
            Some(duration) => position < duration,
            None => true,
        };
        if self.state == TransportState::Ended && before_end {
            self.state = TransportState::Paused;
            self.emit_state_changed();
        }

        self.emit_position_update(position);
        position
    }

    fn position_update_due(&self, now: Instant) -> bool {
        match self.last_position_update {
            Some(last) => now.saturating_duration_since(last) >= self.sample_interval,
            None => true,
        }
    }

    fn emit_position_update(&mut self, position: f64) {
        self.pending_events.push(TransportEvent::PositionUpdate {
            position,
            duration: self.duration.unwrap_or(0.0),
        });
    }

    fn emit_state_changed(&mut self) {
        debug!(state = ?self.state, "Transport state changed");
        self.pending_events
            .push(TransportEvent::StateChanged { state: self.state });
    }
}
