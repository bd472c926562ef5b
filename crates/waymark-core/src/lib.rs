//! # waymark-core
//!
//! One-shot migration gates for applications.
//!
//! A gate runs a block of code exactly once when the running application's
//! version or build number crosses a threshold it has not seen before. The
//! last-seen values are persisted as four string markers, so the decision
//! survives process restarts.
//!
//! ```
//! use waymark_core::{MemoryStore, MigrationGate, StaticIdentity};
//!
//! let gate = MigrationGate::new(MemoryStore::new(), StaticIdentity::new("1.0", "12"));
//!
//! gate.migrate_to_version("0.9", || { /* move settings file */ }).expect("gate");
//! gate.migrate_to_version("1.0", || { /* rebuild caches */ }).expect("gate");
//! gate.migrate_to_build("12", || { /* drop stale thumbnails */ }).expect("gate");
//! gate.application_update(|| { /* show "what's new" */ }).expect("gate");
//! ```
//!
//! ## Collaborators
//!
//! - [`MarkerStore`]: where markers live ([`MemoryStore`], [`RedbStore`])
//! - [`AppIdentity`]: where the running version and build come from
//!   ([`StaticIdentity`], [`EnvIdentity`])
//!
//! ## Constraints
//!
//! - No async, no network dependencies
//! - Version ordering is natural: `"0.9" < "0.10" < "1.0"`
//! - Markers advance only after the action succeeds

// =============================================================================
// MODULES
// =============================================================================

pub mod config;
pub mod gate;
pub mod identity;
pub mod primitives;
pub mod store;
pub mod types;
pub mod version;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{GateError, GateOutcome, MarkerKey, MarkerSnapshot, SkipReason, Track};

// =============================================================================
// RE-EXPORTS: Gate & Collaborators
// =============================================================================

pub use config::GateConfig;
pub use gate::MigrationGate;
pub use identity::{AppIdentity, EnvIdentity, StaticIdentity};
pub use store::{MarkerStore, MemoryStore, RedbStore};
