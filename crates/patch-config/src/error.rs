//! Project load/save diagnostics (`SERIAL_*`).

use thiserror::Error;

/// Fatal project-load failures. A caller that receives one of these keeps
/// whatever project it already had loaded — `patch-config` has no notion of
/// "current" state to fall back to itself; see [`crate::load_project`].
#[derive(Debug, Error)]
pub enum SerialError {
    /// The document wasn't valid JSON at all.
    #[error("failed to parse project JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// `schemaVersion` named a version newer than this build understands.
    #[error("project schema version {found} is newer than the supported {current}")]
    VersionUnsupported {
        /// The version the document declared.
        found: u32,
        /// The newest version this build can migrate to.
        current: u32,
    },
    /// A field expected to hold a JSON object/array had the wrong shape
    /// partway through migration (e.g. a top-level `groups` that isn't an
    /// object).
    #[error("migration step for schema version {step} found `{field}` with an unexpected shape")]
    MigrationShape {
        /// The version the migration step was moving *from*.
        step: u32,
        /// The field whose shape didn't match expectations.
        field: &'static str,
    },
}

impl SerialError {
    /// Stable machine-readable error code (`SERIAL_*`).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "SERIAL_PARSE_ERROR",
            Self::VersionUnsupported { .. } => "SERIAL_VERSION_UNSUPPORTED",
            Self::MigrationShape { .. } => "SERIAL_MIGRATION_SHAPE",
        }
    }
}

/// Non-fatal conditions observed while loading an older project document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialWarning {
    /// The document was migrated forward from an older schema version.
    VersionMigrated {
        /// The version found on disk.
        from: u32,
        /// The version it was migrated to.
        to: u32,
    },
}

impl SerialWarning {
    /// Stable machine-readable warning code (`SERIAL_*`).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::VersionMigrated { .. } => "SERIAL_VERSION_MIGRATED",
        }
    }
}
