//! Storage keys for saved positions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one saved position: one content item, one modality.
///
/// Scroll offsets and each audio variant of the same story must use distinct
/// keys; the constructors below build the ones the reader app uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionKey(String);

impl PositionKey {
    /// Wrap a caller-built key
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Article scroll offset for a story
    pub fn reading(story_id: &str) -> Self {
        Self(format!("progress-{}", story_id))
    }

    /// Playback offset for a podcast episode
    pub fn podcast(podcast_id: &str) -> Self {
        Self(format!("podcast-progress-{}", podcast_id))
    }

    /// Playback offset for one narration voice of a story
    pub fn narration(story_id: &str, voice: &str) -> Self {
        Self(format!("narration-progress-{}-{}", story_id, voice))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PositionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PositionKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for PositionKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modality_keys_are_distinct() {
        let scroll = PositionKey::reading("42");
        let voice_a = PositionKey::narration("42", "algenib");
        let voice_b = PositionKey::narration("42", "achernar");

        assert_eq!(scroll.as_str(), "progress-42");
        assert_ne!(scroll, voice_a);
        assert_ne!(voice_a, voice_b);
    }

    #[test]
    fn podcast_key_format() {
        assert_eq!(PositionKey::podcast("7").to_string(), "podcast-progress-7");
    }

    #[test]
    fn serializes_as_plain_string() {
        let key = PositionKey::from("custom");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"custom\"");
    }
}
