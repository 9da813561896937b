//! Sample schedules - coalesced writes for one tracked key

use crate::cadence::{Cadence, Throttle};
use crate::source::PositionSource;
use crate::tracker::ProgressTracker;
use folio_core::PositionKey;
use std::time::Instant;
use tracing::{debug, trace};

/// Active sampling of one position signal
///
/// Created by [`ProgressTracker::schedule_sample`]. The host calls `poll` from
/// its event loop; a write happens only when the cadence says one is due, and
/// the source is read at that moment so the latest position always wins.
/// Dropping a schedule cancels it without writing.
#[derive(Debug)]
#[must_use = "a schedule must be polled and finished to save anything"]
pub struct SampleSchedule {
    key: PositionKey,
    throttle: Throttle,

    /// Position changed since the last write
    dirty: bool,
}

impl SampleSchedule {
    pub(crate) fn start(key: PositionKey, cadence: Cadence, now: Instant) -> Self {
        let mut throttle = Throttle::new(cadence);
        throttle.start(now);

        Self {
            key,
            throttle,
            // A running periodic source is always moving
            dirty: matches!(cadence, Cadence::Every(_)),
        }
    }

    pub fn key(&self) -> &PositionKey {
        &self.key
    }

    pub fn cadence(&self) -> Cadence {
        self.throttle.cadence()
    }

    /// When the next write is due, if one is pending
    pub fn next_due(&self) -> Option<Instant> {
        self.throttle.next_due()
    }

    /// Whether `finish` would write
    pub fn has_unsaved_activity(&self) -> bool {
        self.dirty
    }

    /// Record raw signal activity (a scroll event, a drag)
    pub fn note_activity(&mut self, now: Instant) {
        self.dirty = true;
        self.throttle.activity(now);
    }

    /// Write the current position if a write is due
    ///
    /// Returns the position written.
    pub fn poll<S>(&mut self, tracker: &mut ProgressTracker, source: &S, now: Instant) -> Option<f64>
    where
        S: PositionSource + ?Sized,
    {
        if !self.throttle.fire(now) {
            return None;
        }

        let position = source.position();
        tracker.report_position(&self.key, position);
        if let Cadence::AfterIdle(_) = self.throttle.cadence() {
            self.dirty = false;
        }

        trace!(key = %self.key, position, "Sampled position");
        Some(position)
    }

    /// Deactivate: cancel the pending write and force one final write
    ///
    /// The final write ignores the throttle window. It is skipped when nothing
    /// moved since the last write, so opening content without touching it never
    /// overwrites an older saved offset.
    pub fn finish<S>(mut self, tracker: &mut ProgressTracker, source: &S) -> Option<f64>
    where
        S: PositionSource + ?Sized,
    {
        self.throttle.cancel();

        if !self.dirty {
            debug!(key = %self.key, "No unsaved activity, skipping final write");
            return None;
        }

        let position = source.position();
        tracker.report_position(&self.key, position);

        debug!(key = %self.key, position, "Final position write");
        Some(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::KeyValueStore;
    use folio_storage::MemoryStore;
    use std::cell::Cell;
    use std::sync::Arc;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn periodic_schedule_reads_source_at_fire_time() {
        let store = Arc::new(MemoryStore::new());
        let mut tracker = ProgressTracker::new(store.clone());
        let t0 = Instant::now();
        let time = Cell::new(0.0);
        let source = || time.get();

        let mut schedule =
            tracker.schedule_sample(PositionKey::podcast("1"), Cadence::Every(ms(2000)), t0);

        time.set(1.0);
        assert_eq!(schedule.poll(&mut tracker, &source, t0 + ms(1000)), None);

        time.set(2.1);
        assert_eq!(schedule.poll(&mut tracker, &source, t0 + ms(2100)), Some(2.1));
        assert_eq!(store.get("podcast-progress-1").unwrap(), Some("2.1".to_string()));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn finish_writes_regardless_of_window() {
        let store = Arc::new(MemoryStore::new());
        let mut tracker = ProgressTracker::new(store.clone());
        let t0 = Instant::now();

        let schedule =
            tracker.schedule_sample(PositionKey::podcast("1"), Cadence::Every(ms(2000)), t0);

        assert_eq!(schedule.finish(&mut tracker, &|| 0.7), Some(0.7));
        assert_eq!(store.get("podcast-progress-1").unwrap(), Some("0.7".to_string()));
    }

    #[test]
    fn idle_finish_without_activity_keeps_old_offset() {
        let store = Arc::new(MemoryStore::with_entries([("progress-5", "900")]));
        let mut tracker = ProgressTracker::new(store.clone());
        let t0 = Instant::now();

        let schedule =
            tracker.schedule_sample(PositionKey::reading("5"), Cadence::AfterIdle(ms(2000)), t0);
        assert!(!schedule.has_unsaved_activity());

        assert_eq!(schedule.finish(&mut tracker, &|| 0.0), None);
        assert_eq!(store.get("progress-5").unwrap(), Some("900".to_string()));
    }

    #[test]
    fn idle_finish_flushes_pending_activity() {
        let store = Arc::new(MemoryStore::new());
        let mut tracker = ProgressTracker::new(store.clone());
        let t0 = Instant::now();

        let mut schedule =
            tracker.schedule_sample(PositionKey::reading("5"), Cadence::AfterIdle(ms(2000)), t0);
        schedule.note_activity(t0 + ms(100));

        // Navigated away before the debounce elapsed
        assert_eq!(schedule.finish(&mut tracker, &|| 333.0), Some(333.0));
        assert_eq!(store.get("progress-5").unwrap(), Some("333".to_string()));
    }

    #[test]
    fn dropped_schedule_never_writes() {
        let store = Arc::new(MemoryStore::new());
        let mut tracker = ProgressTracker::new(store.clone());
        let t0 = Instant::now();

        let mut schedule =
            tracker.schedule_sample(PositionKey::reading("5"), Cadence::AfterIdle(ms(2000)), t0);
        schedule.note_activity(t0);
        drop(schedule);

        tracker.report_position(&PositionKey::reading("other"), 1.0);
        assert_eq!(store.get("progress-5").unwrap(), None);
    }
}
