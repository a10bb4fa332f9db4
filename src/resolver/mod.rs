//! Dependency resolution.
//!
//! Resolves the name-keyed dependency edges of a [`TargetRegistry`] into
//! concrete targets. Resolution is pure and deterministic: every result is
//! ordered by target name and no I/O happens here.
//!
//! [`TargetRegistry`]: crate::core::TargetRegistry

pub mod errors;
pub mod graph;

pub use errors::ConfigError;
pub use graph::{dependency_order, transitive_dependencies, TransitiveDeps};
