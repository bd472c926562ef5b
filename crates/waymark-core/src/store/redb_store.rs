//! # redb-backed Marker Storage
//!
//! A disk-backed marker store using the redb embedded database.
//!
//! redb gives us what the gate needs from persistence:
//! - Crash safety (copy-on-write B-trees)
//! - Immediate durability: a committed write is on disk when `commit` returns
//! - Atomic multi-key writes, used by `reset` to clear all markers at once

use super::MarkerStore;
use crate::{GateError, primitives};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::{Path, PathBuf};

/// Table for markers: qualified key -> marker value
const MARKERS: TableDefinition<&str, &str> = TableDefinition::new(primitives::MARKER_TABLE);

/// A marker store persisted in a redb database file.
pub struct RedbStore {
    /// The redb database handle.
    db: Database,
    /// Location of the database file.
    path: PathBuf,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a marker database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GateError> {
        let path = path.as_ref().to_path_buf();
        let db = Database::create(&path).map_err(|e| GateError::StorageError(e.to_string()))?;

        // Initialize the table so first reads see an empty table, not a missing one
        {
            let write_txn = db
                .begin_write()
                .map_err(|e| GateError::StorageError(e.to_string()))?;
            let _ = write_txn
                .open_table(MARKERS)
                .map_err(|e| GateError::StorageError(e.to_string()))?;
            write_txn
                .commit()
                .map_err(|e| GateError::StorageError(e.to_string()))?;
        }

        tracing::debug!(path = %path.display(), "opened marker store");
        Ok(Self { db, path })
    }

    /// Path of the underlying database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored markers in key order.
    pub fn entries(&self) -> Result<Vec<(String, String)>, GateError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| GateError::StorageError(e.to_string()))?;
        let table = read_txn
            .open_table(MARKERS)
            .map_err(|e| GateError::StorageError(e.to_string()))?;

        let mut entries = Vec::new();
        for entry in table
            .iter()
            .map_err(|e| GateError::StorageError(e.to_string()))?
        {
            let (key, value) = entry.map_err(|e| GateError::StorageError(e.to_string()))?;
            entries.push((key.value().to_string(), value.value().to_string()));
        }
        Ok(entries)
    }
}

// =============================================================================
// MARKERSTORE TRAIT IMPLEMENTATION
// =============================================================================

impl MarkerStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<String>, GateError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| GateError::StorageError(e.to_string()))?;
        let table = read_txn
            .open_table(MARKERS)
            .map_err(|e| GateError::StorageError(e.to_string()))?;
        let value = table
            .get(key)
            .map_err(|e| GateError::StorageError(e.to_string()))?
            .map(|v| v.value().to_string());
        Ok(value)
    }

    fn set(&mut self, key: &str, value: Option<&str>) -> Result<(), GateError> {
        self.set_many(&[(key, value)])
    }

    fn set_many(&mut self, entries: &[(&str, Option<&str>)]) -> Result<(), GateError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| GateError::StorageError(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(MARKERS)
                .map_err(|e| GateError::StorageError(e.to_string()))?;
            for (key, value) in entries {
                match value {
                    Some(v) => {
                        table
                            .insert(*key, *v)
                            .map_err(|e| GateError::StorageError(e.to_string()))?;
                    }
                    None => {
                        table
                            .remove(*key)
                            .map_err(|e| GateError::StorageError(e.to_string()))?;
                    }
                }
            }
        }
        // Default durability is Immediate: commit returns after fsync.
        write_txn
            .commit()
            .map_err(|e| GateError::StorageError(e.to_string()))?;
        Ok(())
    }
}
