//! Read-only queries: `makegen deps` and `makegen targets`.

use anyhow::Result;
use serde::Serialize;

use crate::core::{TargetKind, Workspace};
use crate::resolver::transitive_dependencies;

/// One line of `makegen targets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetSummary {
    pub name: String,
    pub kind: TargetKind,
    pub artifacts: Vec<String>,
    pub sources: usize,
    pub headers: usize,
    /// Direct dependencies
    pub dependencies: Vec<String>,
}

/// Every target reachable from `name`, in name order.
pub fn transitive_deps(ws: &Workspace, name: &str) -> Result<Vec<String>> {
    let registry = ws.registry()?;
    let target = registry.lookup(name)?;
    let deps = transitive_dependencies(&registry, target)?;
    Ok(deps.keys().map(|k| k.to_string()).collect())
}

/// Summarize every target, in name order.
pub fn list_targets(ws: &Workspace) -> Result<Vec<TargetSummary>> {
    let registry = ws.registry()?;
    Ok(registry
        .iter()
        .map(|t| TargetSummary {
            name: t.name().to_string(),
            kind: t.kind(),
            artifacts: t.artifacts().iter().cloned().collect(),
            sources: t.sources().len(),
            headers: t.headers().len(),
            dependencies: t.dependencies().iter().cloned().collect(),
        })
        .collect())
}
