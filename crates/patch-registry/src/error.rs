//! Registry validation errors (`REG_*`).
//!
//! Detected once, at `NodeRegistry::new()` / `NodeRegistry::register()` time
//! — these are fatal startup errors in dev/test builds, never a runtime
//! condition.

use thiserror::Error;

/// A registry-construction validation failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two entries declared the same `type_key`.
    #[error("duplicate node type `{0}`")]
    DuplicateType(String),

    /// A type key isn't kebab-case (`^[a-z][a-z0-9]*(-[a-z0-9]+)*$`).
    #[error("node type `{0}` is not kebab-case")]
    NotKebabCase(String),

    /// `display_name` was empty.
    #[error("node type `{0}` is missing a display name")]
    MissingField(String),

    /// The archetype named by `layout` doesn't exist.
    #[error("node type `{0}` declares an unknown archetype")]
    InvalidArchetype(String),

    /// Declared `(inputs, outputs, control_ports)` disagree with the
    /// archetype's fixed shape.
    #[error("node type `{type_key}` declares {inputs} inputs / {outputs} outputs / {control_ports} control ports, which does not match its archetype")]
    PortCountMismatch {
        /// The offending type.
        type_key: String,
        /// Declared signal-input count.
        inputs: usize,
        /// Declared output count.
        outputs: usize,
        /// Declared control-port count.
        control_ports: usize,
    },

    /// `control_ports > 0` on an archetype that doesn't allow a control port.
    #[error("node type `{0}` declares a control port on a layout that does not allow one")]
    ControlOnDisallowedLayout(String),

    /// A non-structural type has no `onSignal`.
    #[error("node type `{0}` is missing onSignal")]
    MissingOnSignal(String),

    /// `default_param` fell outside `1..=8`.
    #[error("node type `{type_key}` declares default_param {default_param}, outside 1..=8")]
    DefaultParamOutOfRange {
        /// The offending type.
        type_key: String,
        /// The out-of-range value.
        default_param: i32,
    },
}

impl RegistryError {
    /// Stable machine-readable error code (`REG_*`).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::DuplicateType(_) => "REG_DUPLICATE_TYPE",
            RegistryError::NotKebabCase(_) => "REG_NOT_KEBAB_CASE",
            RegistryError::MissingField(_) => "REG_MISSING_FIELD",
            RegistryError::InvalidArchetype(_) => "REG_INVALID_ARCHETYPE",
            RegistryError::PortCountMismatch { .. } => "REG_PORT_COUNT_MISMATCH",
            RegistryError::ControlOnDisallowedLayout(_) => "REG_CONTROL_ON_DISALLOWED_LAYOUT",
            RegistryError::MissingOnSignal(_) => "REG_MISSING_ON_SIGNAL",
            RegistryError::DefaultParamOutOfRange { .. } => "REG_DEFAULT_PARAM_OUT_OF_RANGE",
        }
    }
}
