//! Makefile generation and execution.
//!
//! This module turns a target registry into Makefile rules and runs make
//! against the result.

pub mod context;
pub mod emitter;
pub mod executor;

pub use context::{BuildConfig, BuildContext, BuildMode, LinkMode};
pub use emitter::{RuleBlock, RuleEmitter, RuleScript};
pub use executor::MakeExecutor;
