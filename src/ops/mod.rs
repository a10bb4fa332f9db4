//! High-level operations.
//!
//! This module contains the implementation of makegen commands.

pub mod inspect;
pub mod makegen_build;

pub use inspect::{list_targets, transitive_deps, TargetSummary};
pub use makegen_build::{build, generate, plan, BuildOptions, GenerateOptions, GenerateResult};
