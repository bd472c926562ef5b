//! # Migration Gate
//!
//! Runs a caller-supplied action once when the application crosses a version
//! or build threshold it has not seen before.
//!
//! ## Gates
//!
//! | Operation | Fires when | Marker written |
//! |-----------|------------|----------------|
//! | `migrate_to_version(v)` | `last < v <= current version` | `last_migration_version = v` |
//! | `migrate_to_build(b)` | `last < b <= current build` | `last_migration_build = b` |
//! | `application_update()` | `last != current version` | `last_app_version = current` |
//! | `build_number_update()` | `last != current build` | `last_app_build = current` |
//!
//! Comparisons use [`version::compare`](crate::version::compare); an absent
//! marker reads as the empty string. The update gates use plain inequality,
//! so a downgrade or reinstall of an older build fires them too.
//!
//! ## Atomicity
//!
//! Every operation holds the store lock from the first read to the marker
//! write, so concurrent callers cannot both run the same migration. The
//! marker is written only after the action returns successfully: an action
//! that fails or panics leaves the marker where it was, and the next call
//! tries again.
//!
//! A crash between the action finishing and the marker commit means the
//! action runs again on the next launch. Actions should tolerate running
//! more than once.

use crate::config::GateConfig;
use crate::identity::AppIdentity;
use crate::store::{MarkerStore, RedbStore};
use crate::{GateError, GateOutcome, MarkerKey, MarkerSnapshot, SkipReason, Track, version};
use std::sync::{Mutex, MutexGuard, PoisonError};

// =============================================================================
// MIGRATION GATE
// =============================================================================

/// One-shot gates over a marker store and an application identity.
///
/// # Example
/// ```
/// use waymark_core::{MemoryStore, MigrationGate, StaticIdentity};
///
/// let gate = MigrationGate::new(MemoryStore::new(), StaticIdentity::new("1.0", "1"));
///
/// let mut runs = 0;
/// gate.migrate_to_version("0.9", || runs += 1).expect("gate");
/// gate.migrate_to_version("0.9", || runs += 1).expect("gate");
/// assert_eq!(runs, 1);
/// ```
#[derive(Debug)]
pub struct MigrationGate<S, I> {
    store: Mutex<S>,
    identity: I,
    namespace: String,
}

impl<S: MarkerStore, I: AppIdentity> MigrationGate<S, I> {
    /// Create a gate using the default key namespace.
    pub fn new(store: S, identity: I) -> Self {
        Self {
            store: Mutex::new(store),
            identity,
            namespace: crate::primitives::DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Create a gate using the namespace from `config`.
    pub fn with_config(store: S, identity: I, config: &GateConfig) -> Result<Self, GateError> {
        config.validate()?;
        Ok(Self {
            store: Mutex::new(store),
            identity,
            namespace: config.namespace.clone(),
        })
    }

    /// Namespace prepended to every marker key.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Consume the gate and return its store.
    pub fn into_store(self) -> S {
        self.store
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // GATES
    // =========================================================================

    /// Run `action` once when `version` is newer than the last version
    /// migration and not newer than the running app.
    pub fn migrate_to_version(
        &self,
        version: &str,
        action: impl FnOnce(),
    ) -> Result<GateOutcome, GateError> {
        self.migrate(Track::Version, version, infallible(action))
    }

    /// Fallible form of [`migrate_to_version`](Self::migrate_to_version).
    ///
    /// An `Err` from `action` is returned unchanged and the marker is not advanced.
    pub fn try_migrate_to_version<E: From<GateError>>(
        &self,
        version: &str,
        action: impl FnOnce() -> Result<(), E>,
    ) -> Result<GateOutcome, E> {
        self.migrate(Track::Version, version, action)
    }

    /// Run `action` once when `build` is newer than the last build
    /// migration and not newer than the running build.
    pub fn migrate_to_build(
        &self,
        build: &str,
        action: impl FnOnce(),
    ) -> Result<GateOutcome, GateError> {
        self.migrate(Track::Build, build, infallible(action))
    }

    /// Fallible form of [`migrate_to_build`](Self::migrate_to_build).
    pub fn try_migrate_to_build<E: From<GateError>>(
        &self,
        build: &str,
        action: impl FnOnce() -> Result<(), E>,
    ) -> Result<GateOutcome, E> {
        self.migrate(Track::Build, build, action)
    }

    /// Run `action` once per distinct app version, including downgrades.
    pub fn application_update(&self, action: impl FnOnce()) -> Result<GateOutcome, GateError> {
        self.update(Track::Version, infallible(action))
    }

    /// Fallible form of [`application_update`](Self::application_update).
    pub fn try_application_update<E: From<GateError>>(
        &self,
        action: impl FnOnce() -> Result<(), E>,
    ) -> Result<GateOutcome, E> {
        self.update(Track::Version, action)
    }

    /// Run `action` once per distinct build number, including downgrades.
    pub fn build_number_update(&self, action: impl FnOnce()) -> Result<GateOutcome, GateError> {
        self.update(Track::Build, infallible(action))
    }

    /// Fallible form of [`build_number_update`](Self::build_number_update).
    pub fn try_build_number_update<E: From<GateError>>(
        &self,
        action: impl FnOnce() -> Result<(), E>,
    ) -> Result<GateOutcome, E> {
        self.update(Track::Build, action)
    }

    /// Clear all four markers in one store write.
    pub fn reset(&self) -> Result<(), GateError> {
        let mut store = self.lock();
        let keys: Vec<String> = MarkerKey::ALL
            .iter()
            .map(|key| key.qualified(&self.namespace))
            .collect();
        let entries: Vec<(&str, Option<&str>)> =
            keys.iter().map(|key| (key.as_str(), None)).collect();
        store.set_many(&entries)?;
        tracing::info!(namespace = %self.namespace, "migration markers reset");
        Ok(())
    }

    // =========================================================================
    // MARKER ACCESS
    // =========================================================================

    /// Highest version for which a version migration fired.
    pub fn last_migration_version(&self) -> Result<Option<String>, GateError> {
        self.read(MarkerKey::LastMigrationVersion)
    }

    /// Highest build for which a build migration fired.
    pub fn last_migration_build(&self) -> Result<Option<String>, GateError> {
        self.read(MarkerKey::LastMigrationBuild)
    }

    /// App version recorded by the last `application_update`.
    pub fn last_app_version(&self) -> Result<Option<String>, GateError> {
        self.read(MarkerKey::LastAppVersion)
    }

    /// App build recorded by the last `build_number_update`.
    pub fn last_app_build(&self) -> Result<Option<String>, GateError> {
        self.read(MarkerKey::LastAppBuild)
    }

    /// Read all four markers under one lock.
    pub fn markers(&self) -> Result<MarkerSnapshot, GateError> {
        let store = self.lock();
        let mut snapshot = MarkerSnapshot::default();
        for key in MarkerKey::ALL {
            *snapshot.slot_mut(key) = store.get(&key.qualified(&self.namespace))?;
        }
        Ok(snapshot)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn migrate<E: From<GateError>>(
        &self,
        track: Track,
        threshold: &str,
        action: impl FnOnce() -> Result<(), E>,
    ) -> Result<GateOutcome, E> {
        let mut store = self.lock();
        let key = track.migration_marker().qualified(&self.namespace);
        let last = store.get(&key)?.unwrap_or_default();
        let current = self.current(track);

        if !version::is_newer(threshold, &last) {
            tracing::debug!(track = track.name(), threshold, last = %last, "migration already applied");
            return Ok(GateOutcome::Skipped(SkipReason::AlreadyMigrated));
        }
        if version::is_newer(threshold, &current) {
            tracing::debug!(track = track.name(), threshold, current = %current, "migration ahead of running app");
            return Ok(GateOutcome::Skipped(SkipReason::AheadOfApp));
        }

        run_action(&key, threshold, action)?;
        store.set(&key, Some(threshold))?;
        tracing::info!(track = track.name(), key = %key, threshold, last = %last, "migration applied");
        Ok(GateOutcome::Ran)
    }

    fn update<E: From<GateError>>(
        &self,
        track: Track,
        action: impl FnOnce() -> Result<(), E>,
    ) -> Result<GateOutcome, E> {
        let mut store = self.lock();
        let key = track.app_marker().qualified(&self.namespace);
        let last = store.get(&key)?.unwrap_or_default();
        let current = self.current(track);

        if last == current {
            tracing::debug!(track = track.name(), current = %current, "app unchanged");
            return Ok(GateOutcome::Skipped(SkipReason::Unchanged));
        }

        run_action(&key, &current, action)?;
        store.set(&key, Some(&current))?;
        tracing::info!(track = track.name(), key = %key, last = %last, current = %current, "app update recorded");
        Ok(GateOutcome::Ran)
    }

    fn read(&self, key: MarkerKey) -> Result<Option<String>, GateError> {
        self.lock().get(&key.qualified(&self.namespace))
    }

    fn current(&self, track: Track) -> String {
        match track {
            Track::Version => self.identity.current_version(),
            Track::Build => self.identity.current_build(),
        }
    }

    // A panicking action poisons the mutex, but it never wrote a marker,
    // so the store behind it is still consistent.
    fn lock(&self) -> MutexGuard<'_, S> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<I: AppIdentity> MigrationGate<RedbStore, I> {
    /// Open the redb store at `config.store_path` and build a gate over it.
    pub fn open(config: &GateConfig, identity: I) -> Result<Self, GateError> {
        config.validate()?;
        let store = RedbStore::open(&config.store_path)?;
        Self::with_config(store, identity, config)
    }
}

// =============================================================================
// ACTION EXECUTION
// =============================================================================

fn infallible(action: impl FnOnce()) -> impl FnOnce() -> Result<(), GateError> {
    move || {
        action();
        Ok(())
    }
}

/// Logs a held-back marker if dropped before the action reported success,
/// which covers both an `Err` return and an unwinding panic.
struct PendingAction<'a> {
    key: &'a str,
    value: &'a str,
    completed: bool,
}

impl Drop for PendingAction<'_> {
    fn drop(&mut self) {
        if !self.completed {
            tracing::warn!(key = self.key, value = self.value, "gate action did not complete, marker not advanced");
        }
    }
}

fn run_action<E>(key: &str, value: &str, action: impl FnOnce() -> Result<(), E>) -> Result<(), E> {
    let mut pending = PendingAction {
        key,
        value,
        completed: false,
    };
    action()?;
    pending.completed = true;
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, StaticIdentity};
    use std::cell::Cell;

    fn gate(version: &str, build: &str) -> MigrationGate<MemoryStore, StaticIdentity> {
        MigrationGate::new(MemoryStore::new(), StaticIdentity::new(version, build))
    }

    #[test]
    fn migrates_on_first_run() {
        let gate = gate("1.0", "1");
        let ran = Cell::new(false);
        let outcome = gate
            .migrate_to_version("1.0", || ran.set(true))
            .expect("gate");
        assert!(ran.get());
        assert_eq!(outcome, GateOutcome::Ran);
        assert_eq!(
            gate.last_migration_version().expect("read").as_deref(),
            Some("1.0")
        );
    }

    #[test]
    fn migrates_once() {
        let gate = gate("1.0", "1");
        let runs = Cell::new(0);
        gate.migrate_to_version("1.0", || runs.set(runs.get() + 1))
            .expect("gate");
        let outcome = gate
            .migrate_to_version("1.0", || runs.set(runs.get() + 1))
            .expect("gate");
        assert_eq!(runs.get(), 1);
        assert_eq!(outcome, GateOutcome::Skipped(SkipReason::AlreadyMigrated));
    }

    #[test]
    fn upper_bound_is_inclusive() {
        let gate = gate("2.3", "1");
        assert!(gate.migrate_to_version("2.3", || {}).expect("gate").ran());
    }

    #[test]
    fn future_version_never_fires() {
        let gate = gate("1.0", "1");
        let outcome = gate
            .migrate_to_version("1.1", || {})
            .expect("gate");
        assert_eq!(outcome, GateOutcome::Skipped(SkipReason::AheadOfApp));
        assert_eq!(gate.last_migration_version().expect("read"), None);
    }

    #[test]
    fn empty_current_version_blocks_migrations() {
        let gate = gate("", "");
        let outcome = gate.migrate_to_version("0.1", || {}).expect("gate");
        assert_eq!(outcome, GateOutcome::Skipped(SkipReason::AheadOfApp));
    }

    #[test]
    fn build_track_is_independent_of_version_track() {
        let gate = gate("1.0", "20");
        assert!(gate.migrate_to_version("1.0", || {}).expect("gate").ran());
        assert!(gate.migrate_to_build("3", || {}).expect("gate").ran());
        assert!(gate.migrate_to_build("20", || {}).expect("gate").ran());
        assert!(!gate.migrate_to_build("9", || {}).expect("gate").ran());

        let markers = gate.markers().expect("markers");
        assert_eq!(markers.last_migration_version.as_deref(), Some("1.0"));
        assert_eq!(markers.last_migration_build.as_deref(), Some("20"));
    }

    #[test]
    fn application_update_fires_once_per_value() {
        let gate = gate("1.0", "1");
        let runs = Cell::new(0);
        gate.application_update(|| runs.set(runs.get() + 1))
            .expect("gate");
        let outcome = gate
            .application_update(|| runs.set(runs.get() + 1))
            .expect("gate");
        assert_eq!(runs.get(), 1);
        assert_eq!(outcome, GateOutcome::Skipped(SkipReason::Unchanged));
        assert_eq!(gate.last_app_version().expect("read").as_deref(), Some("1.0"));
    }

    #[test]
    fn downgrade_triggers_update_gate() {
        let store = {
            let newer = gate("2.0", "200");
            newer.application_update(|| {}).expect("gate");
            newer.build_number_update(|| {}).expect("gate");
            newer.into_store()
        };

        let older = MigrationGate::new(store, StaticIdentity::new("1.5", "150"));
        assert!(older.application_update(|| {}).expect("gate").ran());
        assert!(older.build_number_update(|| {}).expect("gate").ran());
        assert_eq!(older.last_app_version().expect("read").as_deref(), Some("1.5"));
        assert_eq!(older.last_app_build().expect("read").as_deref(), Some("150"));
    }

    #[test]
    fn failed_action_does_not_advance_marker() {
        let gate = gate("1.0", "1");
        let result: Result<GateOutcome, GateError> = gate.try_migrate_to_version("0.9", || {
            Err(GateError::IoError("backup target missing".to_string()))
        });
        assert!(matches!(result, Err(GateError::IoError(_))));
        assert_eq!(gate.last_migration_version().expect("read"), None);

        // Next launch retries
        assert!(gate.migrate_to_version("0.9", || {}).expect("gate").ran());
    }

    #[test]
    fn failed_update_action_does_not_record_app_value() {
        let gate = gate("1.0", "7");
        let result = gate.try_build_number_update(|| {
            Err::<(), _>(GateError::StorageError("cache dir locked".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(gate.last_app_build().expect("read"), None);
    }

    #[test]
    fn panicking_action_leaves_gate_usable() {
        let gate = gate("1.0", "1");
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = gate.migrate_to_version("1.0", || {
                std::panic::resume_unwind(Box::new("migration aborted"));
            });
        }));
        assert!(outcome.is_err());
        assert_eq!(gate.last_migration_version().expect("read"), None);
        assert!(gate.migrate_to_version("1.0", || {}).expect("gate").ran());
    }

    #[test]
    fn reset_clears_every_marker() {
        let gate = gate("1.0", "1");
        gate.migrate_to_version("1.0", || {}).expect("gate");
        gate.migrate_to_build("1", || {}).expect("gate");
        gate.application_update(|| {}).expect("gate");
        gate.build_number_update(|| {}).expect("gate");
        assert!(!gate.markers().expect("markers").is_empty());

        gate.reset().expect("reset");
        assert!(gate.markers().expect("markers").is_empty());
        assert!(gate.into_store().is_empty());
    }

    #[test]
    fn namespace_from_config_prefixes_keys() {
        let config = GateConfig::default().with_namespace("plugins");
        let gate = MigrationGate::with_config(
            MemoryStore::new(),
            StaticIdentity::new("1.0", "1"),
            &config,
        )
        .expect("gate");
        gate.migrate_to_version("1.0", || {}).expect("gate");

        assert_eq!(gate.namespace(), "plugins");
        let store = gate.into_store();
        assert_eq!(
            store.get("plugins.last_migration_version").expect("get").as_deref(),
            Some("1.0")
        );
        assert_eq!(store.get("migration.last_migration_version").expect("get"), None);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GateConfig::default().with_namespace("");
        let result = MigrationGate::with_config(
            MemoryStore::new(),
            StaticIdentity::new("1.0", "1"),
            &config,
        );
        assert!(matches!(result, Err(GateError::ConfigError(_))));
    }
}
