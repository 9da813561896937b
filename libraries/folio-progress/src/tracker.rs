//! Progress tracker - remembers resume offsets
//!
//! Decouples "where is the user" from "how do we remember it". All store
//! failures are absorbed here: losing a resume offset is never fatal.

use crate::cadence::Cadence;
use crate::schedule::SampleSchedule;
use folio_core::{FolioError, KeyValueStore, PersistedPosition, PositionKey, ProgressSettings};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Reads and writes resume offsets through a key-value store
///
/// When the store fails (quota exceeded, storage disabled) the tracker keeps
/// going with a session-only copy of every position it was asked to save.
pub struct ProgressTracker {
    store: Arc<dyn KeyValueStore>,

    /// Saved positions must be strictly greater than this to be offered
    resume_threshold: f64,

    /// Positions whose write failed, newest value per key
    session: HashMap<PositionKey, f64>,

    /// Set after the first store failure (logged once)
    degraded: bool,
}

impl ProgressTracker {
    /// Create a tracker over a shared store
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            resume_threshold: 0.0,
            session: HashMap::new(),
            degraded: false,
        }
    }

    /// Create a tracker using the resume threshold from `settings`
    pub fn from_settings(store: Arc<dyn KeyValueStore>, settings: &ProgressSettings) -> Self {
        Self::new(store).with_resume_threshold(settings.resume_threshold)
    }

    pub fn with_resume_threshold(mut self, threshold: f64) -> Self {
        self.resume_threshold = threshold.max(0.0);
        self
    }

    pub fn resume_threshold(&self) -> f64 {
        self.resume_threshold
    }

    /// Whether a store failure has been seen this session
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Read the saved position for `key` when a view activates
    ///
    /// Returns `None` when nothing usable is saved: absent, corrupt, or not past
    /// the resume threshold. Store errors read as absence.
    pub fn initialize(&mut self, key: &PositionKey) -> Option<f64> {
        let stored = match self.store.get(key.as_str()) {
            Ok(Some(raw)) => {
                let decoded = PersistedPosition::decode(&raw);
                if decoded.is_none() {
                    debug!(key = %key, raw = %raw, "Ignoring corrupt saved position");
                }
                decoded
            }
            Ok(None) => None,
            Err(e) => {
                self.mark_degraded(&e);
                None
            }
        };

        let saved = self.session.get(key).copied().or(stored);
        let offered = saved.filter(|p| *p > self.resume_threshold);

        debug!(key = %key, saved = ?saved, offered = offered.is_some(), "Initialized progress");
        offered
    }

    /// Write `position` for `key` (last write wins)
    ///
    /// Negative and non-finite positions are ignored.
    pub fn report_position(&mut self, key: &PositionKey, position: f64) {
        let Some(record) = PersistedPosition::new(key.clone(), position) else {
            debug!(key = %key, position, "Ignoring invalid position");
            return;
        };

        match self.store.set(key.as_str(), &record.encode()) {
            Ok(()) => {
                self.session.remove(key);
                trace!(key = %key, position, "Saved position");
            }
            Err(e) => {
                self.mark_degraded(&e);
                self.session.insert(record.key, record.position);
            }
        }
    }

    /// Register a repeating sample for `key`
    ///
    /// The returned schedule decides when a write is due; the caller drives it
    /// from its event loop and must `finish` it on deactivation.
    pub fn schedule_sample(
        &self,
        key: PositionKey,
        cadence: Cadence,
        now: Instant,
    ) -> SampleSchedule {
        debug!(key = %key, ?cadence, "Scheduling position samples");
        SampleSchedule::start(key, cadence, now)
    }

    fn mark_degraded(&mut self, error: &FolioError) {
        if !self.degraded {
            warn!(
                error = %error,
                "Progress store unavailable, keeping positions for this session only"
            );
            self.degraded = true;
        }
    }
}

impl fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("resume_threshold", &self.resume_threshold)
            .field("session", &self.session)
            .field("degraded", &self.degraded)
            .finish_non_exhaustive()
    }
}
