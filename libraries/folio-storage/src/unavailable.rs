//! Store used when persistent storage is switched off

use folio_core::{FolioError, KeyValueStore, Result};

/// Key-value store that refuses every call
///
/// Models a host where storage is disabled or over quota. Trackers built on it
/// keep working for the session without remembering anything.
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Default for UnavailableStore {
    fn default() -> Self {
        Self::new("storage disabled")
    }
}

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(FolioError::store(self.reason.clone()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(FolioError::store(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_call_fails_with_reason() {
        let store = UnavailableStore::new("quota exceeded");
        let err = store.set("k", "v").unwrap_err();
        assert_eq!(err.to_string(), "Store unavailable: quota exceeded");
        assert!(store.get("k").is_err());
    }
}
