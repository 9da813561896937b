//! Local reader state: reading history, likes and bookmarks
//!
//! Stored as JSON values in the same key-value store as saved positions, under
//! fixed keys shared by every story.

use folio_core::{KeyValueStore, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Titles of recently opened stories (JSON array)
pub const READING_HISTORY_KEY: &str = "readingHistory";

/// Liked story ids (JSON object of `id -> true`)
pub const LIKED_STORIES_KEY: &str = "likedStories";

/// Bookmarked story ids (JSON object of `id -> true`)
pub const BOOKMARKED_STORIES_KEY: &str = "bookmarkedStories";

/// Maximum number of titles kept in the reading history
const HISTORY_LIMIT: usize = 10;

/// Per-reader story flags and history
///
/// Reads never fail: missing or corrupt values read as empty. Writes return
/// the store error so the caller can decide whether to tell the user.
#[derive(Clone)]
pub struct ReaderShelf {
    store: Arc<dyn KeyValueStore>,
}

impl ReaderShelf {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Record that a story was opened
    ///
    /// Titles already in the history are not repeated. Only the most recent
    /// entries are kept.
    pub fn record_visit(&self, title: &str) -> Result<()> {
        let mut history: Vec<String> = self.load(READING_HISTORY_KEY);
        if history.iter().any(|t| t == title) {
            return Ok(());
        }

        history.push(title.to_string());
        if history.len() > HISTORY_LIMIT {
            history.drain(..history.len() - HISTORY_LIMIT);
        }

        self.save(READING_HISTORY_KEY, &history)
    }

    /// Recently opened titles, oldest first
    pub fn reading_history(&self) -> Vec<String> {
        self.load(READING_HISTORY_KEY)
    }

    pub fn is_liked(&self, story_id: &str) -> bool {
        self.flag(LIKED_STORIES_KEY, story_id)
    }

    /// Flip the like flag, returning the new state
    pub fn toggle_like(&self, story_id: &str) -> Result<bool> {
        self.toggle(LIKED_STORIES_KEY, story_id)
    }

    pub fn is_bookmarked(&self, story_id: &str) -> bool {
        self.flag(BOOKMARKED_STORIES_KEY, story_id)
    }

    /// Flip the bookmark flag, returning the new state
    pub fn toggle_bookmark(&self, story_id: &str) -> Result<bool> {
        self.toggle(BOOKMARKED_STORIES_KEY, story_id)
    }

    /// Ids of all bookmarked stories, sorted
    pub fn bookmarked_ids(&self) -> Vec<String> {
        let flags: BTreeMap<String, bool> = self.load(BOOKMARKED_STORIES_KEY);
        flags
            .into_iter()
            .filter_map(|(id, set)| set.then_some(id))
            .collect()
    }

    fn flag(&self, key: &str, story_id: &str) -> bool {
        let flags: BTreeMap<String, bool> = self.load(key);
        flags.get(story_id).copied().unwrap_or(false)
    }

    fn toggle(&self, key: &str, story_id: &str) -> Result<bool> {
        let mut flags: BTreeMap<String, bool> = self.load(key);

        let now_set = if flags.get(story_id).copied().unwrap_or(false) {
            flags.remove(story_id);
            false
        } else {
            flags.insert(story_id.to_string(), true);
            true
        };

        self.save(key, &flags)?;
        Ok(now_set)
    }

    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.store.get(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                debug!(key, error = %e, "Ignoring corrupt shelf value");
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                debug!(key, error = %e, "Shelf read failed");
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, &raw)
    }
}
