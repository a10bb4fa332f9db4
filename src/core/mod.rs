//! Core data structures for makegen.
//!
//! This module contains the target model and everything needed to build it:
//! - Targets and their accumulated sources, headers and includes
//! - The registry that owns them by name
//! - File set resolution
//! - Manifests and workspaces

pub mod fileset;
pub mod manifest;
pub mod registry;
pub mod target;
pub mod workspace;

pub use fileset::{FileResolver, GlobResolver};
pub use manifest::{BuildSection, Manifest, TargetSpec};
pub use registry::TargetRegistry;
pub use target::{Target, TargetKind, TargetRef};
pub use workspace::{find_manifest, Workspace, MAKEFILE_NAME, MANIFEST_NAME};
