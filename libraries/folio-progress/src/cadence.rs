//! Write cadences
//!
//! Raw position signals are high frequency (scroll fires continuously, media
//! time updates several times a second) while writes are comparatively
//! expensive. A `Throttle` turns the signal into at most one write per window.

use std::time::{Duration, Instant};

/// Shortest window a cadence will use
const MIN_WINDOW: Duration = Duration::from_millis(1);

/// How often a tracked position is written through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Fixed period while the source is active (playback)
    Every(Duration),

    /// Trailing debounce: write once the signal has been quiet for the window (scroll)
    AfterIdle(Duration),
}

impl Cadence {
    /// Window length, never shorter than 1 ms
    pub fn window(&self) -> Duration {
        match self {
            Cadence::Every(window) | Cadence::AfterIdle(window) => (*window).max(MIN_WINDOW),
        }
    }
}

/// Deadline bookkeeping for one cadence
#[derive(Debug, Clone)]
pub struct Throttle {
    cadence: Cadence,
    next_due: Option<Instant>,
}

impl Throttle {
    pub fn new(cadence: Cadence) -> Self {
        Self {
            cadence,
            next_due: None,
        }
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Arm the throttle when the source becomes active
    ///
    /// Periodic cadences first fire one window after `now`. Idle cadences wait
    /// for activity.
    pub fn start(&mut self, now: Instant) {
        if let Cadence::Every(_) = self.cadence {
            self.next_due = Some(now + self.cadence.window());
        }
    }

    /// Record signal activity at `now`
    ///
    /// Idle cadences push their deadline out to `now + window` on every call.
    pub fn activity(&mut self, now: Instant) {
        match self.cadence {
            Cadence::AfterIdle(_) => self.next_due = Some(now + self.cadence.window()),
            Cadence::Every(_) => {
                if self.next_due.is_none() {
                    self.next_due = Some(now + self.cadence.window());
                }
            }
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due.is_some_and(|due| now >= due)
    }

    /// Consume the deadline if it has passed
    ///
    /// Returns `true` at most once per deadline. Periodic cadences re-arm on
    /// the original grid, skipping any periods the host missed.
    pub fn fire(&mut self, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }
        let Some(due) = self.next_due else {
            return false;
        };

        self.next_due = match self.cadence {
            Cadence::Every(_) => {
                let window = self.cadence.window();
                let missed = (now - due).as_nanos() / window.as_nanos();
                let steps = u32::try_from(missed + 1).unwrap_or(u32::MAX);
                Some(
                    due.checked_add(window.saturating_mul(steps))
                        .unwrap_or(now + window),
                )
            }
            Cadence::AfterIdle(_) => None,
        };

        true
    }

    /// Drop any pending deadline
    pub fn cancel(&mut self) {
        self.next_due = None;
    }
}
