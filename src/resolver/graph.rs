//! Transitive dependency walks over the target registry.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::{Target, TargetRegistry};
use crate::resolver::ConfigError;

/// Every target reachable from some root, keyed (and so ordered) by name.
pub type TransitiveDeps<'a> = BTreeMap<&'a str, &'a Target>;

/// Collect every target reachable from `target`, excluding `target` itself.
///
/// Each reachable target appears once however many paths lead to it. A
/// cycle anywhere below `target` is reported rather than cut short by the
/// visited set.
pub fn transitive_dependencies<'a>(
    registry: &'a TargetRegistry,
    target: &'a Target,
) -> Result<TransitiveDeps<'a>, ConfigError> {
    let mut walk = Walk {
        registry,
        found: BTreeMap::new(),
        path: Vec::new(),
    };
    walk.visit(target)?;
    Ok(walk.found)
}

struct Walk<'a> {
    registry: &'a TargetRegistry,
    found: TransitiveDeps<'a>,
    /// Targets currently being expanded, root first
    path: Vec<&'a str>,
}

impl<'a> Walk<'a> {
    fn visit(&mut self, from: &'a Target) -> Result<(), ConfigError> {
        self.path.push(from.name());

        for name in from.dependencies() {
            if let Some(pos) = self.path.iter().position(|p| *p == name.as_str()) {
                let mut cycle: Vec<String> =
                    self.path[pos..].iter().map(|p| p.to_string()).collect();
                cycle.push(name.clone());
                return Err(ConfigError::CyclicDependency { cycle });
            }
            if self.found.contains_key(name.as_str()) {
                continue;
            }

            let dep = self.registry.get(name).ok_or_else(|| {
                ConfigError::unknown_target(name, Some(from.name()), self.registry.names())
            })?;
            self.found.insert(dep.name(), dep);
            self.visit(dep)?;
        }

        self.path.pop();
        Ok(())
    }
}

/// Order every registered target so that each one follows all of its
/// transitive dependencies.
///
/// Roots are taken in name order and their dependencies are placed in name
/// order, so the result is stable for a given registry. Each target's
/// dependencies are resolved before it is placed, so a cycle fails there
/// and the recursion below never revisits a target in progress.
pub fn dependency_order(registry: &TargetRegistry) -> Result<Vec<&Target>, ConfigError> {
    let mut order = Order {
        registry,
        emitted: BTreeSet::new(),
        out: Vec::with_capacity(registry.len()),
    };
    for target in registry.iter() {
        order.place(target)?;
    }
    Ok(order.out)
}

struct Order<'a> {
    registry: &'a TargetRegistry,
    emitted: BTreeSet<&'a str>,
    out: Vec<&'a Target>,
}

impl<'a> Order<'a> {
    fn place(&mut self, target: &'a Target) -> Result<(), ConfigError> {
        if self.emitted.contains(target.name()) {
            return Ok(());
        }
        for dep in transitive_dependencies(self.registry, target)?.into_values() {
            self.place(dep)?;
        }

        self.emitted.insert(target.name());
        self.out.push(target);
        Ok(())
    }
}
