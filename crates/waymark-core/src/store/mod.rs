//! # Marker Storage
//!
//! The gate persists its four markers through the [`MarkerStore`] trait.
//! Any string key-value store with durable writes can back it.
//!
//! Two implementations ship with the crate:
//! - [`MemoryStore`]: volatile, for tests and for hosts that persist elsewhere
//! - [`RedbStore`]: disk-backed, every write committed before returning

mod redb_store;

pub use redb_store::RedbStore;

use crate::GateError;
use std::collections::BTreeMap;

// =============================================================================
// MARKERSTORE TRAIT
// =============================================================================

/// String key-value storage for gate markers.
///
/// Implementations must make a successful `set` durable before returning:
/// a marker that is reported written and then lost lets a one-time action
/// run again on the next launch.
pub trait MarkerStore {
    /// Read the value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, GateError>;

    /// Store `value` under `key`. `None` deletes the key.
    fn set(&mut self, key: &str, value: Option<&str>) -> Result<(), GateError>;

    /// Apply several writes.
    ///
    /// The default applies them one by one; stores with transactions should
    /// override this to commit all entries together.
    fn set_many(&mut self, entries: &[(&str, Option<&str>)]) -> Result<(), GateError> {
        for (key, value) in entries {
            self.set(key, *value)?;
        }
        Ok(())
    }
}

impl<S: MarkerStore + ?Sized> MarkerStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, GateError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: Option<&str>) -> Result<(), GateError> {
        (**self).set(key, value)
    }

    fn set_many(&mut self, entries: &[(&str, Option<&str>)]) -> Result<(), GateError> {
        (**self).set_many(entries)
    }
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Volatile marker store backed by a `BTreeMap`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MarkerStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, GateError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Option<&str>) -> Result<(), GateError> {
        match value {
            Some(v) => {
                self.entries.insert(key.to_string(), v.to_string());
            }
            None => {
                self.entries.remove(key);
            }
        }
        Ok(())
    }
}
