//! # Application Identity
//!
//! Where the gate learns which version and build are currently running.
//! Values are read on every gate call, never cached by the gate.

use std::sync::Arc;

/// Source of the running application's version and build identifiers.
///
/// Both methods return an empty string when the value is unavailable; an
/// empty current value sorts below every migration target, so no
/// migration fires against it.
pub trait AppIdentity {
    /// User-facing version string, e.g. `"2.4.1"`.
    fn current_version(&self) -> String;

    /// Build number, e.g. `"1187"`.
    fn current_build(&self) -> String;
}

impl<I: AppIdentity + ?Sized> AppIdentity for &I {
    fn current_version(&self) -> String {
        (**self).current_version()
    }

    fn current_build(&self) -> String {
        (**self).current_build()
    }
}

impl<I: AppIdentity + ?Sized> AppIdentity for Arc<I> {
    fn current_version(&self) -> String {
        (**self).current_version()
    }

    fn current_build(&self) -> String {
        (**self).current_build()
    }
}

// =============================================================================
// STATIC IDENTITY
// =============================================================================

/// Identity fixed at construction, typically from compile-time metadata.
///
/// # Example
/// ```
/// use waymark_core::{AppIdentity, StaticIdentity};
///
/// let identity = StaticIdentity::new(env!("CARGO_PKG_VERSION"), "1");
/// assert_eq!(identity.current_build(), "1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity {
    version: String,
    build: String,
}

impl StaticIdentity {
    /// Create an identity with the given version and build.
    #[must_use]
    pub fn new(version: impl Into<String>, build: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            build: build.into(),
        }
    }
}

impl AppIdentity for StaticIdentity {
    fn current_version(&self) -> String {
        self.version.clone()
    }

    fn current_build(&self) -> String {
        self.build.clone()
    }
}

// =============================================================================
// ENVIRONMENT IDENTITY
// =============================================================================

/// Identity read from two environment variables on every call.
///
/// Missing or non-UTF-8 variables read as the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvIdentity {
    version_var: String,
    build_var: String,
}

impl EnvIdentity {
    /// Read the version and build from the named variables.
    #[must_use]
    pub fn new(version_var: impl Into<String>, build_var: impl Into<String>) -> Self {
        Self {
            version_var: version_var.into(),
            build_var: build_var.into(),
        }
    }

    /// Name of the variable holding the version.
    #[must_use]
    pub fn version_var(&self) -> &str {
        &self.version_var
    }

    /// Name of the variable holding the build number.
    #[must_use]
    pub fn build_var(&self) -> &str {
        &self.build_var
    }
}

impl Default for EnvIdentity {
    fn default() -> Self {
        Self::new(
            crate::primitives::DEFAULT_VERSION_VAR,
            crate::primitives::DEFAULT_BUILD_VAR,
        )
    }
}

impl AppIdentity for EnvIdentity {
    fn current_version(&self) -> String {
        std::env::var(&self.version_var).unwrap_or_default()
    }

    fn current_build(&self) -> String {
        std::env::var(&self.build_var).unwrap_or_default()
    }
}
