//! Saved resume offsets and their storage encoding
//!
//! Positions are stored as plain decimal text so they stay readable in the
//! browser-style string stores they end up in (`"1234"`, `"12.75"`).

use crate::key::PositionKey;
use serde::{Deserialize, Serialize};

/// A resume offset: scroll pixels or playback seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedPosition {
    pub key: PositionKey,
    pub position: f64,
}

impl PersistedPosition {
    /// Build a position record
    ///
    /// Returns `None` for negative or non-finite positions, which are never stored.
    pub fn new(key: PositionKey, position: f64) -> Option<Self> {
        is_valid(position).then_some(Self { key, position })
    }

    /// Storage text for this position
    pub fn encode(&self) -> String {
        self.position.to_string()
    }

    /// Parse stored text
    ///
    /// Missing, corrupt, negative and non-finite values all read as `None`.
    pub fn decode(raw: &str) -> Option<f64> {
        raw.trim().parse::<f64>().ok().filter(|p| is_valid(*p))
    }
}

fn is_valid(position: f64) -> bool {
    position.is_finite() && position >= 0.0
}
