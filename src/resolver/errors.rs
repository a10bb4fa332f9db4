//! Configuration error types and diagnostics.
//!
//! Every error here is raised while the manifest is read or the target
//! graph is built and validated, before any rule text reaches disk.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// A fatal problem with the target graph.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to load manifest `{}`: {reason}", .path.display())]
    #[diagnostic(
        code(makegen::config::invalid_manifest),
        help("A manifest needs a `[project]` table; targets are `[[target]]` tables")
    )]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("duplicate target name `{name}`")]
    #[diagnostic(
        code(makegen::config::duplicate_name),
        help("Target names must be unique; rename one of the `{name}` targets")
    )]
    DuplicateName { name: String },

    #[error("{}", unknown_target_message(.name, .required_by.as_deref()))]
    #[diagnostic(code(makegen::config::unknown_target))]
    UnknownTarget {
        name: String,
        required_by: Option<String>,
        #[help]
        help: Option<String>,
    },

    #[error("cycle detected in target dependencies: {}", .cycle.join(" -> "))]
    #[diagnostic(
        code(makegen::config::cyclic_dependency),
        help("Break the cycle by removing or restructuring dependencies")
    )]
    CyclicDependency { cycle: Vec<String> },

    #[error("bad path `{}` in target `{target}`: {reason}", .path.display())]
    #[diagnostic(
        code(makegen::config::path_derivation),
        help("Adjust `build-dir`, `obj-dir` or `obj-skip` so every file path is distinct")
    )]
    PathDerivation {
        target: String,
        path: PathBuf,
        reason: String,
    },

    #[error("invalid target name `{name}`")]
    #[diagnostic(
        code(makegen::config::invalid_name),
        help(
            "Use letters, digits, `_`, `-` and `.`, not starting with `-` or `.`; \
             `all`, `clean` and `default` are reserved"
        )
    )]
    InvalidTargetName { name: String },
}

fn unknown_target_message(name: &str, required_by: Option<&str>) -> String {
    match required_by {
        Some(dependent) => format!("unknown target `{}` (required by `{}`)", name, dependent),
        None => format!("unknown target `{}`", name),
    }
}

impl ConfigError {
    /// Create an unknown-target error listing the targets that do exist.
    pub fn unknown_target<'a>(
        name: impl Into<String>,
        required_by: Option<&str>,
        available: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let available: Vec<&str> = available.into_iter().collect();
        let help = if available.is_empty() {
            None
        } else {
            Some(format!("available targets: {}", available.join(", ")))
        };

        ConfigError::UnknownTarget {
            name: name.into(),
            required_by: required_by.map(str::to_string),
            help,
        }
    }

    /// Create an error for a manifest that cannot be read or parsed.
    pub fn invalid_manifest(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidManifest {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a path derivation error.
    pub fn path_derivation(
        target: impl Into<String>,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        ConfigError::PathDerivation {
            target: target.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }
}
