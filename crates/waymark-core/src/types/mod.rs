//! # Core Type Definitions
//!
//! This module contains the value types shared by the gate and its collaborators:
//! - Tracks and marker keys (`Track`, `MarkerKey`)
//! - Gate results (`GateOutcome`, `SkipReason`)
//! - A read-only view of persisted state (`MarkerSnapshot`)
//! - Error types (`GateError`)

use crate::primitives;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// TRACKS & MARKER KEYS
// =============================================================================

/// Which application identifier a gate is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Track {
    /// The user-facing version string (e.g. `"1.4.2"`).
    Version,
    /// The build number (e.g. `"1207"`).
    Build,
}

impl Track {
    /// Marker recording the highest migration that fired on this track.
    #[must_use]
    pub const fn migration_marker(self) -> MarkerKey {
        match self {
            Track::Version => MarkerKey::LastMigrationVersion,
            Track::Build => MarkerKey::LastMigrationBuild,
        }
    }

    /// Marker mirroring the app value observed by the last update gate.
    #[must_use]
    pub const fn app_marker(self) -> MarkerKey {
        match self {
            Track::Version => MarkerKey::LastAppVersion,
            Track::Build => MarkerKey::LastAppBuild,
        }
    }

    /// Lowercase name used in log fields.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Track::Version => "version",
            Track::Build => "build",
        }
    }
}

/// One of the four persisted markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MarkerKey {
    LastMigrationVersion,
    LastMigrationBuild,
    LastAppVersion,
    LastAppBuild,
}

impl MarkerKey {
    /// All markers, in the order `reset` clears them.
    pub const ALL: [MarkerKey; 4] = [
        MarkerKey::LastAppVersion,
        MarkerKey::LastMigrationVersion,
        MarkerKey::LastAppBuild,
        MarkerKey::LastMigrationBuild,
    ];

    /// Key suffix without namespace.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            MarkerKey::LastMigrationVersion => primitives::LAST_MIGRATION_VERSION,
            MarkerKey::LastMigrationBuild => primitives::LAST_MIGRATION_BUILD,
            MarkerKey::LastAppVersion => primitives::LAST_APP_VERSION,
            MarkerKey::LastAppBuild => primitives::LAST_APP_BUILD,
        }
    }

    /// Fully qualified store key, e.g. `migration.last_app_build`.
    #[must_use]
    pub fn qualified(self, namespace: &str) -> String {
        format!(
            "{}{}{}",
            namespace,
            primitives::KEY_SEPARATOR,
            self.suffix()
        )
    }
}

// =============================================================================
// GATE OUTCOME
// =============================================================================

/// Why a gate did not run its action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkipReason {
    /// The target is not newer than the recorded migration marker.
    AlreadyMigrated,
    /// The target is newer than the running application.
    AheadOfApp,
    /// The running application matches the recorded value.
    Unchanged,
}

/// Result of a single gate call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateOutcome {
    /// The action ran to completion and the marker was advanced.
    Ran,
    /// The action was not invoked.
    Skipped(SkipReason),
}

impl GateOutcome {
    /// Returns `true` if the action ran.
    #[must_use]
    pub const fn ran(self) -> bool {
        matches!(self, GateOutcome::Ran)
    }
}

// =============================================================================
// MARKER SNAPSHOT
// =============================================================================

/// Point-in-time copy of all four markers. `None` means never recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSnapshot {
    pub last_migration_version: Option<String>,
    pub last_migration_build: Option<String>,
    pub last_app_version: Option<String>,
    pub last_app_build: Option<String>,
}

impl MarkerSnapshot {
    /// Check if no marker has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.last_migration_version.is_none()
            && self.last_migration_build.is_none()
            && self.last_app_version.is_none()
            && self.last_app_build.is_none()
    }

    pub(crate) fn slot_mut(&mut self, key: MarkerKey) -> &mut Option<String> {
        match key {
            MarkerKey::LastMigrationVersion => &mut self.last_migration_version,
            MarkerKey::LastMigrationBuild => &mut self.last_migration_build,
            MarkerKey::LastAppVersion => &mut self.last_app_version,
            MarkerKey::LastAppBuild => &mut self.last_app_build,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while gating.
///
/// - Malformed version strings are never an error; ordering is total
/// - Storage failures are surfaced, never swallowed
/// - Action failures belong to the caller and are not wrapped here
#[derive(Debug, Error)]
pub enum GateError {
    /// The marker store could not be read or written.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// The configuration is malformed or invalid.
    #[error("Config error: {0}")]
    ConfigError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
