//! makegen - a Makefile generator for C projects
//!
//! This crate provides the core library functionality for makegen: the
//! target model, transitive dependency resolution, Makefile rule emission
//! and the make invocation.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities and fixtures for makegen unit tests.
///
/// This module is only available when compiling with `--cfg test`.
#[cfg(test)]
pub mod test_support;

pub use core::{Manifest, Target, TargetKind, TargetRegistry, Workspace};

pub use builder::{BuildConfig, RuleEmitter};
pub use resolver::ConfigError;

/// Exit status for configuration errors, distinct from make's own 1 and 2.
pub const CONFIG_ERROR_EXIT_CODE: i32 = 3;
