//! Project JSON persistence for the patchgraph engine.
//!
//! `patch-config` owns the on-disk `Project` document: the
//! `{schemaVersion, graph, samples, settings, project}` shape and the
//! stepwise schema migration that keeps older documents loadable. It is
//! stateless — loading, migrating, and saving are plain functions over a
//! [`Project`] value, with no notion of a "current" project or a file
//! system of its own.
//!
//! # Example
//!
//! ```rust
//! use patch_config::{Project, ProjectSettings, load_project, save_project};
//!
//! let mut project = Project::new();
//! project.settings = Some(ProjectSettings { tempo: 120.0 });
//!
//! let json = save_project(&project).unwrap();
//! let (loaded, warnings) = load_project(&json).unwrap();
//! assert!(warnings.is_empty());
//! assert_eq!(loaded, project);
//! ```

mod error;
mod project;

pub use error::{SerialError, SerialWarning};
pub use project::{
    CURRENT_SCHEMA_VERSION, Project, ProjectMeta, ProjectSettings, SampleTable, load_project, migrate, save_project,
};
