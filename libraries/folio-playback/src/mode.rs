//! Transport modes and their capabilities

use crate::volume::Volume;

/// What kind of audio the transport is driving
///
/// Each mode has a fixed capability set instead of scattered live checks.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportMode {
    /// Fixed-length asset: seekable, rate-adjustable, position is remembered
    Recorded,

    /// Unseekable stream of indefinite length: only volume and mute
    Live { volume: Volume },
}

impl TransportMode {
    /// Live mode at full volume
    pub fn live() -> Self {
        TransportMode::Live {
            volume: Volume::default(),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, TransportMode::Live { .. })
    }

    /// Play/pause, seek, skip and rate change
    pub fn has_transport_controls(&self) -> bool {
        !self.is_live()
    }

    /// Saved and restored resume offsets
    pub fn persists_position(&self) -> bool {
        !self.is_live()
    }

    pub fn volume(&self) -> Option<&Volume> {
        match self {
            TransportMode::Live { volume } => Some(volume),
            TransportMode::Recorded => None,
        }
    }
}
