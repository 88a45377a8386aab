//! The project JSON document: the `Project`/`GraphSnapshot` wire shape plus
//! stepwise schema migration.
//!
//! Modeled on a `Preset`-style single serde round-trip document, loaded and
//! saved as one unit, adapted from TOML presets to this JSON project format;
//! migration replaces an unversioned preset format with a stepwise
//! `schemaVersion` walk.

use patch_core::SampleSlot;
use patch_model::GraphSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{SerialError, SerialWarning};

/// Newest schema version this build knows how to read and write.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// The project's 8-slot sample table (`samples?: Slot[8]` in the wire format).
pub type SampleTable = [Option<SampleSlot>; 8];

/// Transport settings persisted alongside the graph.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// Beats per minute.
    #[serde(default)]
    pub tempo: f64,
}

/// Free-form project metadata. None of these fields affect simulation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectMeta {
    /// User-facing project name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Opaque creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "createdAt")]
    pub created_at: Option<String>,
    /// Opaque last-modified timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "updatedAt")]
    pub updated_at: Option<String>,
}

/// The full on-disk project document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Schema version this document was written at.
    #[serde(rename = "schemaVersion")]
    pub schema_version: u32,
    /// The graph itself: nodes, edges, and group definitions.
    pub graph: GraphSnapshot,
    /// The project's sample table, if one has been assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<SampleTable>,
    /// Transport settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<ProjectSettings>,
    /// Free-form metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectMeta>,
}

impl Project {
    /// An empty project at the current schema version.
    #[must_use]
    pub fn new() -> Self {
        Self { schema_version: CURRENT_SCHEMA_VERSION, graph: GraphSnapshot::new(), samples: None, settings: None, project: None }
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks a raw JSON document forward through schema versions, producing a
/// [`Project`] at [`CURRENT_SCHEMA_VERSION`] plus any warnings the walk
/// collected along the way.
///
/// # Errors
///
/// Returns [`SerialError::VersionUnsupported`] if the document's
/// `schemaVersion` is newer than this build understands, or
/// [`SerialError::MigrationShape`]/[`SerialError::Parse`] if the document
/// doesn't have the shape a migration step (or the final typed decode)
/// expects.
pub fn migrate(mut value: Value) -> Result<(Project, Vec<SerialWarning>), SerialError> {
    let found = u32::try_from(value.get("schemaVersion").and_then(Value::as_u64).unwrap_or(0)).unwrap_or(u32::MAX);
    if found > CURRENT_SCHEMA_VERSION {
        warn!(found, current = CURRENT_SCHEMA_VERSION, "project schema version unsupported");
        return Err(SerialError::VersionUnsupported { found, current: CURRENT_SCHEMA_VERSION });
    }

    let mut warnings = Vec::new();
    let mut version = found;
    if version < 1 {
        migrate_v0_to_v1(&mut value)?;
        version = 1;
        info!(from = found, to = version, "migrated project schema");
        warnings.push(SerialWarning::VersionMigrated { from: found, to: version });
    }

    let obj = value.as_object_mut().ok_or(SerialError::MigrationShape { step: version, field: "$" })?;
    obj.insert("schemaVersion".to_string(), Value::from(CURRENT_SCHEMA_VERSION));

    let project: Project = serde_json::from_value(value)?;
    Ok((project, warnings))
}

/// `v0 -> v1`: a top-level `groups` map moves under `graph.groups`.
fn migrate_v0_to_v1(value: &mut Value) -> Result<(), SerialError> {
    let obj = value.as_object_mut().ok_or(SerialError::MigrationShape { step: 0, field: "$" })?;
    let Some(groups) = obj.remove("groups") else { return Ok(()) };
    let graph = obj.entry("graph").or_insert_with(|| Value::Object(serde_json::Map::new()));
    let graph_obj = graph.as_object_mut().ok_or(SerialError::MigrationShape { step: 0, field: "graph" })?;
    graph_obj.insert("groups".to_string(), groups);
    Ok(())
}

/// Parses and migrates a project document from its JSON text.
///
/// On a fatal error the caller should keep whatever [`Project`] it already
/// had loaded rather than overwrite it with a half-migrated or default one
/// — this crate is stateless and has no "current project" of its own to
/// fall back to.
///
/// # Errors
///
/// See [`migrate`].
pub fn load_project(json: &str) -> Result<(Project, Vec<SerialWarning>), SerialError> {
    let value: Value = serde_json::from_str(json)?;
    migrate(value)
}

/// Serializes a project to its canonical JSON text, always at
/// [`CURRENT_SCHEMA_VERSION`].
///
/// # Errors
///
/// Returns [`SerialError::Parse`] if serialization fails (only possible if
/// a field holds a non-finite float, which `serde_json` refuses to encode).
pub fn save_project(project: &Project) -> Result<String, SerialError> {
    serde_json::to_string(project).map_err(SerialError::Parse)
}
