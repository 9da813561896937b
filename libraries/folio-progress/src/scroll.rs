//! Article scroll progress
//!
//! Exposes reading progress both as a raw pixel offset (for an exact resume)
//! and as a 0-100 percentage (for the reading indicator).

use crate::cadence::Cadence;
use crate::schedule::SampleSchedule;
use crate::source::PositionSource;
use crate::tracker::ProgressTracker;
use folio_core::{PositionKey, ProgressSettings};
use std::time::Instant;
use tracing::debug;

/// Document scroll metrics reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    /// Current vertical offset in pixels
    pub scroll_top: f64,

    /// Total content height in pixels
    pub scroll_height: f64,

    /// Visible viewport height in pixels
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// Largest reachable offset
    pub fn max_scroll(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }

    /// Reading progress, 0-100
    ///
    /// Content that fits on screen reports 0: nothing has been scrolled through.
    pub fn percent(&self) -> f64 {
        let max = self.max_scroll();
        if max <= 0.0 || !max.is_finite() || !self.scroll_top.is_finite() {
            return 0.0;
        }

        (self.scroll_top * 100.0 / max).clamp(0.0, 100.0)
    }
}

impl PositionSource for ScrollMetrics {
    fn position(&self) -> f64 {
        self.scroll_top.max(0.0)
    }
}

/// How the host should animate a programmatic scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Scroll command for the host view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTo {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

/// "Continue reading" affordance
///
/// Offered when a saved offset exists. Nothing scrolls until the reader
/// confirms; the only alternative is to dismiss it.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a resume prompt should be shown to the reader"]
pub struct ResumePrompt {
    key: PositionKey,
    offset: f64,
}

impl ResumePrompt {
    pub fn key(&self) -> &PositionKey {
        &self.key
    }

    /// Saved offset in pixels
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Reader accepted: smooth-scroll to the saved offset
    pub fn confirm(self) -> ScrollTo {
        debug!(key = %self.key, offset = self.offset, "Resuming reading position");
        ScrollTo {
            top: self.offset,
            behavior: ScrollBehavior::Smooth,
        }
    }

    /// Reader declined; the view stays where it is
    pub fn dismiss(self) {
        debug!(key = %self.key, "Resume prompt dismissed");
    }
}

/// Tracks the scroll position of one article
///
/// Percentage is recomputed on every scroll event. The offset is written only
/// once scrolling has settled for the debounce window, and once more on
/// `detach` if the reader moved since.
#[derive(Debug)]
pub struct ScrollProgressSource {
    tracker: ProgressTracker,
    key: PositionKey,
    metrics: ScrollMetrics,
    schedule: SampleSchedule,
}

impl ScrollProgressSource {
    /// Start tracking an article view
    ///
    /// Returns a resume prompt when a saved offset greater than the resume
    /// threshold exists for `key`.
    pub fn attach(
        mut tracker: ProgressTracker,
        key: PositionKey,
        settings: &ProgressSettings,
        metrics: ScrollMetrics,
        now: Instant,
    ) -> (Self, Option<ResumePrompt>) {
        let prompt = tracker.initialize(&key).map(|offset| ResumePrompt {
            key: key.clone(),
            offset,
        });

        let schedule = tracker.schedule_sample(
            key.clone(),
            Cadence::AfterIdle(settings.scroll_debounce()),
            now,
        );

        let source = Self {
            tracker,
            key,
            metrics,
            schedule,
        };

        (source, prompt)
    }

    /// Handle a scroll event, returning the new percentage
    pub fn on_scroll(&mut self, metrics: ScrollMetrics, now: Instant) -> f64 {
        self.metrics = metrics;
        self.schedule.note_activity(now);
        self.metrics.percent()
    }

    /// Handle a layout change (content or viewport resized)
    ///
    /// Not reading activity on its own. If the host moved the offset (content
    /// shrank below it), the new offset is scheduled like a scroll.
    pub fn on_resize(&mut self, metrics: ScrollMetrics, now: Instant) -> f64 {
        if metrics.scroll_top != self.metrics.scroll_top {
            self.schedule.note_activity(now);
        }
        self.metrics = metrics;
        self.metrics.percent()
    }

    /// Write the offset if the debounce window has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<f64> {
        self.schedule.poll(&mut self.tracker, &self.metrics, now)
    }

    /// When the pending write is due, if any
    pub fn next_due(&self) -> Option<Instant> {
        self.schedule.next_due()
    }

    pub fn percent(&self) -> f64 {
        self.metrics.percent()
    }

    /// Whether `detach` would write
    pub fn has_unsaved_activity(&self) -> bool {
        self.schedule.has_unsaved_activity()
    }

    pub fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    pub fn key(&self) -> &PositionKey {
        &self.key
    }

    /// Whether positions are only being kept for this session
    pub fn is_degraded(&self) -> bool {
        self.tracker.is_degraded()
    }

    /// Stop tracking (unmount, navigation away)
    ///
    /// Cancels the pending write and saves the current offset if the reader
    /// scrolled since the last write. Returns the offset written.
    pub fn detach(self) -> Option<f64> {
        let Self {
            mut tracker,
            metrics,
            schedule,
            ..
        } = self;

        schedule.finish(&mut tracker, &metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_of_scrollable_range() {
        let metrics = ScrollMetrics::new(1000.0, 3000.0, 1000.0);
        assert_eq!(metrics.max_scroll(), 2000.0);
        assert_eq!(metrics.percent(), 50.0);
    }

    #[test]
    fn unscrollable_content_is_zero_percent() {
        let metrics = ScrollMetrics::new(0.0, 800.0, 800.0);
        assert_eq!(metrics.percent(), 0.0);
        assert!(!metrics.percent().is_nan());

        // Viewport taller than content
        let metrics = ScrollMetrics::new(0.0, 600.0, 800.0);
        assert_eq!(metrics.percent(), 0.0);
    }

    #[test]
    fn overscroll_is_clamped() {
        // Elastic scrolling can report offsets outside the range
        assert_eq!(ScrollMetrics::new(2500.0, 3000.0, 1000.0).percent(), 100.0);
        assert_eq!(ScrollMetrics::new(-40.0, 3000.0, 1000.0).percent(), 0.0);
        assert_eq!(ScrollMetrics::new(-40.0, 3000.0, 1000.0).position(), 0.0);
    }

    #[test]
    fn confirm_scrolls_smoothly_to_offset() {
        let prompt = ResumePrompt {
            key: PositionKey::reading("1"),
            offset: 1234.0,
        };

        assert_eq!(
            prompt.confirm(),
            ScrollTo {
                top: 1234.0,
                behavior: ScrollBehavior::Smooth,
            }
        );
    }
}
