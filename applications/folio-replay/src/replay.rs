//! Session replay engine
//!
//! Feeds a recorded transcript through the real progress components on a
//! virtual clock, then reports what a returning reader or listener would see.

use crate::error::Result;
use crate::media::SimulatedMedia;
use crate::script::{Action, Article, Audio, Content, Session, Step};
use folio_core::{KeyValueStore, PersistedPosition, PositionKey, ProgressSettings};
use folio_playback::{
    format_time, MediaElement, MediaEvent, Transport, TransportEvent, TransportMode,
    TransportState,
};
use folio_progress::{ProgressTracker, ResumePrompt, ScrollMetrics, ScrollProgressSource};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Spacing of simulated `timeupdate` events
const TICK_MS: u64 = 250;

/// How a visit ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Exit {
    /// Navigated away; the view was torn down
    Left,
    /// Tab closed; nothing ran on the way out
    Closed,
}

/// One opening of the content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Visit {
    pub opened_at_ms: u64,

    /// Offset offered by the prompt (article) or restored on load (audio)
    pub resume: Option<f64>,

    /// Position when the visit ended
    pub final_position: f64,

    pub exit: Exit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogLine {
    pub at_ms: u64,
    pub message: String,
}

/// Outcome of a replayed session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub key: PositionKey,
    pub visits: Vec<Visit>,

    /// What the store holds after the session
    pub saved_position: Option<f64>,

    pub log: Vec<LogLine>,
}

impl Report {
    fn new(key: PositionKey) -> Self {
        Self {
            key,
            visits: Vec::new(),
            saved_position: None,
            log: Vec::new(),
        }
    }

    fn note(&mut self, at_ms: u64, message: impl Into<String>) {
        let message = message.into();
        debug!(at_ms, %message, "Replay");
        self.log.push(LogLine { at_ms, message });
    }

    fn record<T: fmt::Debug>(&mut self, at_ms: u64, what: &str, result: folio_core::Result<T>) {
        match result {
            Ok(value) => self.note(at_ms, format!("{what}: {value:?}")),
            Err(e) => self.note(at_ms, format!("{what} rejected: {e}")),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "session {}", self.key)?;
        for line in &self.log {
            writeln!(
                f,
                "  {:>4}.{:03}s  {}",
                line.at_ms / 1000,
                line.at_ms % 1000,
                line.message
            )?;
        }

        for (index, visit) in self.visits.iter().enumerate() {
            let resume = visit
                .resume
                .map_or_else(|| "none".to_string(), |p| p.to_string());
            writeln!(
                f,
                "visit {}: resume {}, ended at {} ({:?})",
                index + 1,
                resume,
                visit.final_position,
                visit.exit
            )?;
        }

        match self.saved_position {
            Some(position) => write!(f, "saved position: {position}"),
            None => write!(f, "saved position: none"),
        }
    }
}

/// Replays sessions against one store
pub struct Replayer {
    store: Arc<dyn KeyValueStore>,
    settings: ProgressSettings,
    origin: Instant,
}

impl Replayer {
    pub fn new(store: Arc<dyn KeyValueStore>, settings: ProgressSettings) -> Self {
        Self {
            store,
            settings,
            origin: Instant::now(),
        }
    }

    /// Replay `session` from its first step
    ///
    /// The content is open at time zero. A view still open after the last
    /// step is left (torn down cleanly) at that step's time.
    pub fn run(&self, session: &Session) -> Result<Report> {
        session.validate()?;
        let key = session.key();
        info!(key = %key, steps = session.steps.len(), "Replaying session");

        let mut report = Report::new(key.clone());
        match &session.content {
            Content::Article(article) => self.run_article(article, key.clone(), &session.steps, &mut report),
            Content::Audio(audio) => self.run_audio(audio, key.clone(), &session.steps, &mut report),
        }

        report.saved_position = match self.store.get(key.as_str()) {
            Ok(raw) => raw.as_deref().and_then(PersistedPosition::decode),
            Err(_) => None,
        };
        Ok(report)
    }

    fn at(&self, at_ms: u64) -> Instant {
        self.origin + Duration::from_millis(at_ms)
    }

    fn millis(&self, instant: Instant) -> u64 {
        instant.saturating_duration_since(self.origin).as_millis() as u64
    }

    fn tracker(&self) -> ProgressTracker {
        ProgressTracker::from_settings(self.store.clone(), &self.settings)
    }

    // ===== Articles =====

    fn run_article(&self, article: &Article, key: PositionKey, steps: &[Step], report: &mut Report) {
        let mut height = (article.scroll_height, article.client_height);
        let mut view = Some(self.open_article(&key, height, 0, report));
        let mut last_ms = 0;

        for step in steps {
            last_ms = step.at_ms;
            if let Some(open) = view.as_mut() {
                self.flush_due_writes(open, step.at_ms, report);
            }

            let at_ms = step.at_ms;
            let now = self.at(at_ms);
            match &step.action {
                Action::Return => {
                    if view.is_some() {
                        report.note(at_ms, "return ignored: already open");
                    } else {
                        view = Some(self.open_article(&key, height, at_ms, report));
                    }
                }
                action => {
                    let Some(open) = view.as_mut() else {
                        report.note(at_ms, format!("{} ignored: nothing open", action.name()));
                        continue;
                    };

                    match action {
                        Action::Scroll { top } => {
                            let metrics = ScrollMetrics::new(*top, height.0, height.1);
                            let percent = open.source.on_scroll(metrics, now);
                            report.note(at_ms, format!("scroll to {top}px ({percent:.0}%)"));
                        }
                        Action::Resize {
                            scroll_height,
                            client_height,
                        } => {
                            height = (*scroll_height, *client_height);
                            // Shrinking content pulls the offset back to the new end
                            let max = ScrollMetrics::new(0.0, height.0, height.1).max_scroll();
                            let top = open.source.metrics().scroll_top.min(max);
                            let percent = open
                                .source
                                .on_resize(ScrollMetrics::new(top, height.0, height.1), now);
                            report.note(at_ms, format!("resized, now at {percent:.0}%"));
                        }
                        Action::Resume => match open.prompt.take() {
                            Some(prompt) => {
                                let target = prompt.confirm();
                                // The view cannot scroll past its end
                                let max = ScrollMetrics::new(0.0, height.0, height.1).max_scroll();
                                let top = target.top.min(max);
                                let percent = open
                                    .source
                                    .on_scroll(ScrollMetrics::new(top, height.0, height.1), now);
                                report.note(
                                    at_ms,
                                    format!("continue reading: {:?} scroll to {top}px ({percent:.0}%)", target.behavior),
                                );
                            }
                            None => report.note(at_ms, "resume ignored: no prompt"),
                        },
                        Action::Dismiss => match open.prompt.take() {
                            Some(prompt) => {
                                prompt.dismiss();
                                report.note(at_ms, "prompt dismissed");
                            }
                            None => report.note(at_ms, "dismiss ignored: no prompt"),
                        },
                        Action::Leave | Action::Close => {
                            if let Some(open) = view.take() {
                                let exit = if *action == Action::Leave { Exit::Left } else { Exit::Closed };
                                Self::close_article(open, exit, at_ms, report);
                            }
                        }
                        _ => report.note(at_ms, format!("{} ignored", action.name())),
                    }
                }
            }
        }

        if let Some(mut open) = view.take() {
            self.flush_due_writes(&mut open, last_ms, report);
            Self::close_article(open, Exit::Left, last_ms, report);
        }
    }

    fn open_article(
        &self,
        key: &PositionKey,
        (scroll_height, client_height): (f64, f64),
        at_ms: u64,
        report: &mut Report,
    ) -> OpenArticle {
        let (source, prompt) = ScrollProgressSource::attach(
            self.tracker(),
            key.clone(),
            &self.settings,
            ScrollMetrics::new(0.0, scroll_height, client_height),
            self.at(at_ms),
        );

        let resume = prompt.as_ref().map(ResumePrompt::offset);
        match resume {
            Some(offset) => report.note(at_ms, format!("opened, continue reading at {offset}px?")),
            None => report.note(at_ms, "opened, no saved position"),
        }

        OpenArticle {
            source,
            prompt,
            opened_at_ms: at_ms,
            resume,
        }
    }

    fn close_article(open: OpenArticle, exit: Exit, at_ms: u64, report: &mut Report) {
        let final_position = open.source.metrics().scroll_top;

        match exit {
            Exit::Left => match open.source.detach() {
                Some(written) => report.note(at_ms, format!("left, saved {written}px")),
                None => report.note(at_ms, "left, nothing new to save"),
            },
            Exit::Closed => {
                if open.source.has_unsaved_activity() {
                    report.note(at_ms, "tab closed, unsaved offset lost");
                } else {
                    report.note(at_ms, "tab closed");
                }
                drop(open.source);
            }
        }

        report.visits.push(Visit {
            opened_at_ms: open.opened_at_ms,
            resume: open.resume,
            final_position,
            exit,
        });
    }

    /// Fire debounced writes whose deadline passed before `until_ms`
    fn flush_due_writes(&self, open: &mut OpenArticle, until_ms: u64, report: &mut Report) {
        let until = self.at(until_ms);
        while let Some(due) = open.source.next_due() {
            if due > until {
                break;
            }
            match open.source.poll(due) {
                Some(written) => report.note(self.millis(due), format!("saved {written}px")),
                None => break,
            }
        }
    }

    // ===== Audio =====

    fn run_audio(&self, audio: &Audio, key: PositionKey, steps: &[Step], report: &mut Report) {
        let mut player = Some(self.open_audio(audio, &key, 0, report));
        let mut clock_ms = 0;

        for step in steps {
            if let Some(open) = player.as_mut() {
                self.run_clock(&mut open.transport, clock_ms, step.at_ms, report);
            }
            clock_ms = step.at_ms;

            let at_ms = step.at_ms;
            let now = self.at(at_ms);
            match &step.action {
                Action::Return => {
                    if player.is_some() {
                        report.note(at_ms, "return ignored: already open");
                    } else {
                        player = Some(self.open_audio(audio, &key, at_ms, report));
                    }
                }
                Action::Leave | Action::Close => {
                    if let Some(open) = player.take() {
                        let exit = if step.action == Action::Leave { Exit::Left } else { Exit::Closed };
                        Self::close_audio(open, exit, at_ms, report);
                    }
                }
                action => {
                    let Some(open) = player.as_mut() else {
                        report.note(at_ms, format!("{} ignored: nothing open", action.name()));
                        continue;
                    };
                    Self::apply_audio_action(&mut open.transport, action, now, at_ms, report);
                    log_events(&mut open.transport, at_ms, report);
                }
            }
        }

        if let Some(open) = player.take() {
            Self::close_audio(open, Exit::Left, clock_ms, report);
        }
    }

    fn apply_audio_action(
        transport: &mut Transport<SimulatedMedia>,
        action: &Action,
        now: Instant,
        at_ms: u64,
        report: &mut Report,
    ) {
        let live = transport.mode().is_live();
        match action {
            Action::Play if live => {
                // Live streams are started by the element's own controls
                let result = transport.media_mut().play();
                if result.is_ok() {
                    transport.handle_event(MediaEvent::Play, now);
                }
                report.record(at_ms, "play", result);
            }
            Action::Pause if live => {
                transport.media_mut().pause();
                transport.handle_event(MediaEvent::Pause, now);
                report.note(at_ms, "pause");
            }
            Action::Play | Action::Pause => {
                let wants_playing = *action == Action::Play;
                if transport.state().is_playing() == wants_playing {
                    report.note(at_ms, format!("{} ignored: already {:?}", action.name(), transport.state()));
                } else {
                    let result = transport.toggle_play_pause(now);
                    report.record(at_ms, action.name(), result);
                }
            }
            Action::Advance => {
                report.note(at_ms, format!("at {}", format_time(transport.position())));
            }
            Action::Seek { to } => {
                let result = transport
                    .handle_seek(*to)
                    .and_then(|_| transport.commit_seek(*to, now));
                report.record(at_ms, "seek", result);
            }
            Action::Skip { seconds } => {
                let result = transport.skip(*seconds);
                report.record(at_ms, "skip", result);
            }
            Action::Rate { rate } => {
                let result = transport.set_playback_rate(*rate);
                report.record(at_ms, "rate", result);
            }
            Action::Volume { level } => {
                let result = transport.set_volume(*level);
                report.record(at_ms, "volume", result);
            }
            Action::Mute => {
                let result = transport.toggle_mute();
                report.record(at_ms, "mute", result);
            }
            other => report.note(at_ms, format!("{} ignored", other.name())),
        }
    }

    fn open_audio(&self, audio: &Audio, key: &PositionKey, at_ms: u64, report: &mut Report) -> OpenAudio {
        let (media, mode) = if audio.live {
            (SimulatedMedia::new(None), TransportMode::live())
        } else {
            (SimulatedMedia::new(audio.duration), TransportMode::Recorded)
        };
        let media = match &audio.load_error {
            Some(message) => SimulatedMedia::failing(message.clone()),
            None => media,
        };

        let event = match media.load_error() {
            Some(message) => MediaEvent::Error(message.to_string()),
            None => MediaEvent::LoadedMetadata,
        };

        let mut transport = Transport::new(media, mode, &self.settings)
            .with_progress(self.tracker(), key.clone());
        transport.handle_event(event, self.at(at_ms));

        report.note(at_ms, "opened");
        let resume = log_events(&mut transport, at_ms, report);

        OpenAudio {
            transport,
            opened_at_ms: at_ms,
            resume,
        }
    }

    fn close_audio(open: OpenAudio, exit: Exit, at_ms: u64, report: &mut Report) {
        let OpenAudio {
            transport,
            opened_at_ms,
            resume,
        } = open;
        let final_position = transport.media().current_time();

        match exit {
            Exit::Left => {
                let state = transport.state();
                let media = transport.detach();
                let message = if state == TransportState::Playing {
                    format!("left at {}", format_time(media.current_time()))
                } else {
                    format!("left while {state:?}")
                };
                report.note(at_ms, message);
            }
            Exit::Closed => {
                drop(transport);
                report.note(at_ms, "tab closed");
            }
        }

        report.visits.push(Visit {
            opened_at_ms,
            resume,
            final_position,
            exit,
        });
    }

    /// Let time pass from `from_ms` to `to_ms`, with `timeupdate` ticks while playing
    fn run_clock(
        &self,
        transport: &mut Transport<SimulatedMedia>,
        from_ms: u64,
        to_ms: u64,
        report: &mut Report,
    ) {
        let mut clock = from_ms;
        while clock < to_ms && transport.media().is_playing() {
            let step = (to_ms - clock).min(TICK_MS);
            clock += step;

            let now = self.at(clock);
            let ended = transport.media_mut().advance(step as f64 / 1000.0);
            transport.handle_event(MediaEvent::TimeUpdate, now);
            if ended {
                transport.handle_event(MediaEvent::Ended, now);
            }
            log_events(transport, clock, report);
        }
    }
}

struct OpenArticle {
    source: ScrollProgressSource,
    prompt: Option<ResumePrompt>,
    opened_at_ms: u64,
    resume: Option<f64>,
}

struct OpenAudio {
    transport: Transport<SimulatedMedia>,
    opened_at_ms: u64,
    resume: Option<f64>,
}

/// Note the transport's queued events; returns the position resumed to, if any
fn log_events(transport: &mut Transport<SimulatedMedia>, at_ms: u64, report: &mut Report) -> Option<f64> {
    let mut resumed = None;

    for event in transport.drain_events() {
        match event {
            TransportEvent::StateChanged { state } => report.note(at_ms, format!("state {state:?}")),
            TransportEvent::Resumed { position } => {
                resumed = Some(position);
                report.note(at_ms, format!("resumed at {}", format_time(position)));
            }
            TransportEvent::PositionSaved { position, .. } => {
                report.note(at_ms, format!("saved {position}s"));
            }
            TransportEvent::RateChanged { rate } => report.note(at_ms, format!("rate {rate}")),
            TransportEvent::VolumeChanged { level, is_muted } => {
                let muted = if is_muted { ", muted" } else { "" };
                report.note(at_ms, format!("volume {level}%{muted}"));
            }
            TransportEvent::LoadFailed { message } => {
                report.note(at_ms, format!("load failed: {message}"));
            }
            TransportEvent::PositionUpdate { .. } => {}
        }
    }

    resumed
}
