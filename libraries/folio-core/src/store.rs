//! Key-value store abstraction
//!
//! Everything that remembers a position writes through this trait, so call
//! sites can be tested against an in-memory map instead of a browser global.

use crate::error::Result;

/// Synchronous string key-value store
///
/// Implementations are process-wide singletons shared behind an `Arc`, hence
/// `&self` receivers with interior mutability. Writes are last-write-wins.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    ///
    /// # Returns
    /// * `Ok(None)` - Nothing stored under this key
    /// * `Err(_)` - Store could not be read
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;
}
