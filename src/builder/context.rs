//! Build context - configuration and paths for a generation run.
//!
//! Combines the manifest's `[build]` section with the run's
//! [`BuildConfig`] into the concrete flag sets and directories the rule
//! emitter writes out.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::Manifest;

/// Optimization profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Debug,
    Release,
}

/// How executables are linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    #[default]
    Static,
    Dynamic,
}

/// Options for one generation/build run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildConfig {
    pub mode: BuildMode,

    /// Enable the manifest's developer flag set
    pub dev: bool,

    /// Additional compiler flags
    pub extra_flags: BTreeSet<String>,

    pub link_mode: LinkMode,

    /// Rebuild everything regardless of timestamps
    pub force_rebuild: bool,

    /// Parallel make jobs; `Some(0)` means unbounded, `None` picks a default
    pub parallelism: Option<usize>,
}

impl BuildConfig {
    /// Job count handed to make: `None` for unbounded.
    pub fn jobs(&self) -> Option<usize> {
        match self.parallelism {
            Some(0) => None,
            Some(n) => Some(n),
            None => Some(default_jobs()),
        }
    }
}

/// Half the available cores, at least one.
pub fn default_jobs() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cpus / 2).max(1)
}

/// Flags and layout for rule emission.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Artifact directory, relative to the project root
    pub build_dir: PathBuf,

    /// Object root, relative to the project root
    pub obj_dir: PathBuf,

    /// Compiler flags; a set, emitted sorted
    pub cflags: BTreeSet<String>,

    /// Linker flags; order matters
    pub ldflags: Vec<String>,

    /// Default goal target
    pub default_target: Option<String>,

    /// Arguments the default goal runs its executable with
    pub run_args: Option<Vec<String>>,
}

impl BuildContext {
    /// Create a build context from a manifest and run configuration.
    pub fn new(manifest: &Manifest, config: &BuildConfig) -> Self {
        let build = &manifest.build;

        let mut cflags: BTreeSet<String> = build.cflags.iter().cloned().collect();
        match config.mode {
            BuildMode::Debug => cflags.extend(build.debug_cflags.iter().cloned()),
            BuildMode::Release => cflags.extend(build.release_cflags.iter().cloned()),
        }
        if config.dev {
            cflags.extend(build.dev_cflags.iter().cloned());
        }
        cflags.extend(config.extra_flags.iter().cloned());

        let ldflags = match config.link_mode {
            LinkMode::Static => build.static_ldflags.clone(),
            LinkMode::Dynamic => Vec::new(),
        };

        tracing::debug!(
            "{:?} build, {:?} linking, {} compiler flag(s)",
            config.mode,
            config.link_mode,
            cflags.len()
        );

        BuildContext {
            build_dir: build.build_dir.clone(),
            obj_dir: build.obj_dir(),
            cflags,
            ldflags,
            default_target: manifest.project.default.clone(),
            run_args: manifest.project.run_args.clone(),
        }
    }

    /// Path of an artifact produced by a target.
    pub fn artifact_path(&self, artifact: &str) -> PathBuf {
        self.build_dir.join(artifact)
    }
}
