//! Property-based tests for progress tracking
//!
//! Uses proptest to verify the persistence invariants across random event
//! sequences.

use folio_core::{KeyValueStore, PersistedPosition, PositionKey, ProgressSettings};
use folio_progress::{Cadence, ProgressTracker, ScrollMetrics, ScrollProgressSource};
use folio_storage::MemoryStore;
use proptest::prelude::*;
use std::cell::Cell;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn saved(store: &MemoryStore, key: &str) -> Option<f64> {
    store
        .get(key)
        .unwrap()
        .and_then(|raw| PersistedPosition::decode(&raw))
}

proptest! {
    /// Property: after the debounce window, the saved offset is the last one observed
    #[test]
    fn debounced_scroll_saves_last_offset(
        events in prop::collection::vec((0u64..1500, 0.0f64..9000.0), 1..60)
    ) {
        let store = Arc::new(MemoryStore::new());
        let t0 = Instant::now();
        let (mut article, _) = ScrollProgressSource::attach(
            ProgressTracker::new(store.clone()),
            PositionKey::reading("p"),
            &ProgressSettings::default(),
            ScrollMetrics::new(0.0, 10_000.0, 1_000.0),
            t0,
        );

        let mut now = t0;
        let mut last = 0.0;
        for (gap_ms, offset) in &events {
            now += Duration::from_millis(*gap_ms);
            article.poll(now);
            article.on_scroll(ScrollMetrics::new(*offset, 10_000.0, 1_000.0), now);
            last = *offset;
        }

        article.poll(now + Duration::from_millis(2000));
        prop_assert_eq!(saved(&store, "progress-p"), Some(last));
    }

    /// Property: the percentage is always a defined number in 0-100
    #[test]
    fn percent_is_always_defined(
        top in -1.0e6f64..1.0e6,
        height in 0.0f64..1.0e6,
        client in 0.0f64..1.0e6,
    ) {
        let percent = ScrollMetrics::new(top, height, client).percent();
        prop_assert!(percent.is_finite());
        prop_assert!((0.0..=100.0).contains(&percent));
    }

    /// Property: pausing at any moment saves exactly the position at that moment
    #[test]
    fn finish_saves_exact_position(
        ticks in prop::collection::vec(1u64..700, 0..40),
        final_time in 0.0f64..3600.0,
    ) {
        let store = Arc::new(MemoryStore::new());
        let mut tracker = ProgressTracker::new(store.clone());
        let t0 = Instant::now();
        let time = Cell::new(0.0);
        let source = || time.get();

        let mut schedule = tracker.schedule_sample(
            PositionKey::podcast("p"),
            Cadence::Every(Duration::from_millis(2000)),
            t0,
        );

        let mut now = t0;
        for tick in ticks {
            now += Duration::from_millis(tick);
            time.set(time.get() + tick as f64 / 1000.0);
            schedule.poll(&mut tracker, &source, now);
        }

        time.set(final_time);
        schedule.finish(&mut tracker, &source);
        prop_assert_eq!(saved(&store, "podcast-progress-p"), Some(final_time));
    }

    /// Property: periodic writes happen at most once per period
    #[test]
    fn periodic_writes_respect_window(
        ticks in prop::collection::vec(1u64..900, 1..80)
    ) {
        let store = Arc::new(MemoryStore::new());
        let mut tracker = ProgressTracker::new(store.clone());
        let t0 = Instant::now();
        let window = Duration::from_millis(2000);
        let mut schedule = tracker.schedule_sample(PositionKey::podcast("w"), Cadence::Every(window), t0);

        let mut now = t0;
        let mut writes = Vec::new();
        for tick in ticks {
            now += Duration::from_millis(tick);
            if schedule.poll(&mut tracker, &|| 1.0, now).is_some() {
                writes.push(now);
            }
        }

        let periods: Vec<u128> = writes
            .iter()
            .map(|w| (*w - t0).as_millis() / window.as_millis())
            .collect();
        for pair in periods.windows(2) {
            prop_assert!(pair[1] > pair[0], "two writes in one period: {:?}", periods);
        }
        let elapsed = now - t0;
        prop_assert!(writes.len() as u128 <= elapsed.as_millis() / window.as_millis());
    }
}
