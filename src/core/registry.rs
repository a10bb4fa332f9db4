//! Target registry - the name -> target table.
//!
//! Dependencies between targets are stored as names and only resolved
//! through the registry, so targets may be declared in any order and a
//! cyclic configuration never becomes a cyclic data structure.

use std::collections::BTreeMap;

use crate::core::target::Target;
use crate::resolver::ConfigError;

/// Owns every target of one configuration run.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    targets: BTreeMap<String, Target>,
}

impl TargetRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        TargetRegistry {
            targets: BTreeMap::new(),
        }
    }

    /// Register a target. A name may only be registered once.
    pub fn register(&mut self, target: Target) -> Result<(), ConfigError> {
        if self.targets.contains_key(target.name()) {
            return Err(ConfigError::DuplicateName {
                name: target.name().to_string(),
            });
        }

        tracing::debug!("registered {} `{}`", target.kind().as_str(), target.name());
        self.targets.insert(target.name().to_string(), target);
        Ok(())
    }

    /// Look up a target by name.
    pub fn lookup(&self, name: &str) -> Result<&Target, ConfigError> {
        self.targets
            .get(name)
            .ok_or_else(|| ConfigError::unknown_target(name, None, self.names()))
    }

    /// Look up a target without building an error.
    pub fn get(&self, name: &str) -> Option<&Target> {
        self.targets.get(name)
    }

    /// Target names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    /// Targets in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
