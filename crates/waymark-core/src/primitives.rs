//! # Fixed Primitives
//!
//! Compile-time constants shared by the gate, the stores and the config layer.
//!
//! Marker keys are laid out as `<namespace>.<suffix>`, so with the default
//! namespace the four markers live at:
//!
//! | Key | Written by |
//! |-----|------------|
//! | `migration.last_migration_version` | `migrate_to_version` |
//! | `migration.last_migration_build` | `migrate_to_build` |
//! | `migration.last_app_version` | `application_update` |
//! | `migration.last_app_build` | `build_number_update` |

/// Namespace prepended to every marker key unless configured otherwise.
pub const DEFAULT_NAMESPACE: &str = "migration";

/// Separator between the namespace and the marker suffix.
pub const KEY_SEPARATOR: char = '.';

/// Suffix of the highest version for which a version migration fired.
pub const LAST_MIGRATION_VERSION: &str = "last_migration_version";

/// Suffix of the highest build for which a build migration fired.
pub const LAST_MIGRATION_BUILD: &str = "last_migration_build";

/// Suffix of the app version seen by the last `application_update`.
pub const LAST_APP_VERSION: &str = "last_app_version";

/// Suffix of the app build seen by the last `build_number_update`.
pub const LAST_APP_BUILD: &str = "last_app_build";

/// Name of the redb table holding all markers.
pub const MARKER_TABLE: &str = "markers";

/// Default on-disk location of the redb marker database.
pub const DEFAULT_STORE_FILE: &str = "waymark.redb";

/// Environment variable read by `EnvIdentity` for the app version by default.
pub const DEFAULT_VERSION_VAR: &str = "WAYMARK_APP_VERSION";

/// Environment variable read by `EnvIdentity` for the build number by default.
pub const DEFAULT_BUILD_VAR: &str = "WAYMARK_APP_BUILD";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffixes_are_distinct() {
        let suffixes = [
            LAST_MIGRATION_VERSION,
            LAST_MIGRATION_BUILD,
            LAST_APP_VERSION,
            LAST_APP_BUILD,
        ];
        for (i, a) in suffixes.iter().enumerate() {
            for b in suffixes.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn default_namespace_has_no_separator() {
        assert!(!DEFAULT_NAMESPACE.contains(KEY_SEPARATOR));
    }
}
