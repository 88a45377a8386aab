//! `NodeRegistry`: the validated, read-only node-type catalog.

use std::collections::HashMap;

use crate::builtins::builtin_descriptors;
use crate::descriptor::NodeDescriptor;
use crate::error::RegistryError;

fn is_kebab_case(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    let mut prev_was_sep = true;
    for b in s.bytes() {
        match b {
            b'a'..=b'z' | b'0'..=b'9' => prev_was_sep = false,
            b'-' => {
                if prev_was_sep {
                    return false;
                }
                prev_was_sep = true;
            }
            _ => return false,
        }
    }
    !prev_was_sep
}

/// The static, validated node-type catalog.
///
/// Constructed once at startup (`NodeRegistry::new()`) and passed by
/// reference everywhere downstream — model, build, and runtime all hold a
/// `&NodeRegistry`, never a singleton.
pub struct NodeRegistry {
    by_type: HashMap<&'static str, NodeDescriptor>,
    order: Vec<&'static str>,
}

impl NodeRegistry {
    /// Builds the registry with the fixed builtin catalog, validating every
    /// entry. Returns every accumulated `REG_*` violation rather than
    /// failing on the first — construction-time validation is a dev/test
    /// startup error, so collecting the full list is more useful than one
    /// error at a time.
    pub fn new() -> Result<Self, Vec<RegistryError>> {
        let mut registry = NodeRegistry { by_type: HashMap::new(), order: Vec::new() };
        let mut errors = Vec::new();
        for descriptor in builtin_descriptors() {
            if let Err(e) = registry.register(descriptor) {
                errors.extend(e);
            }
        }
        if errors.is_empty() {
            Ok(registry)
        } else {
            Err(errors)
        }
    }

    /// Validates and inserts one descriptor. On validation failure the
    /// descriptor is not inserted and every violation found is returned.
    pub fn register(&mut self, descriptor: NodeDescriptor) -> Result<(), Vec<RegistryError>> {
        let mut errors = Vec::new();

        if self.by_type.contains_key(descriptor.type_key) {
            errors.push(RegistryError::DuplicateType(descriptor.type_key.to_string()));
        }
        if !is_kebab_case(descriptor.type_key) {
            errors.push(RegistryError::NotKebabCase(descriptor.type_key.to_string()));
        }
        if descriptor.display_name.is_empty() {
            errors.push(RegistryError::MissingField(descriptor.type_key.to_string()));
        }
        if let Some((inputs, outputs, control_ports)) = descriptor.layout.fixed_counts() {
            if (inputs, outputs, control_ports) != (descriptor.inputs, descriptor.outputs, descriptor.control_ports) {
                errors.push(RegistryError::PortCountMismatch {
                    type_key: descriptor.type_key.to_string(),
                    inputs: descriptor.inputs,
                    outputs: descriptor.outputs,
                    control_ports: descriptor.control_ports,
                });
            }
        }
        if descriptor.control_ports > 0 && !descriptor.layout.allows_control() {
            errors.push(RegistryError::ControlOnDisallowedLayout(descriptor.type_key.to_string()));
        }
        if !descriptor.is_structural && !(1..=8).contains(&descriptor.default_param) {
            errors.push(RegistryError::DefaultParamOutOfRange {
                type_key: descriptor.type_key.to_string(),
                default_param: descriptor.default_param,
            });
        }
        if !descriptor.is_structural && descriptor.behavior.on_signal.is_none() {
            errors.push(RegistryError::MissingOnSignal(descriptor.type_key.to_string()));
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        self.order.push(descriptor.type_key);
        self.by_type.insert(descriptor.type_key, descriptor);
        Ok(())
    }

    /// Looks up a descriptor by type key.
    #[must_use]
    pub fn get(&self, type_key: &str) -> Option<&NodeDescriptor> {
        self.by_type.get(type_key)
    }

    /// All registered type keys, in registration order.
    #[must_use]
    pub fn all_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}
