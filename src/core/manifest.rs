//! Makegen.toml manifest parsing and schema.
//!
//! The manifest declares the project's targets and the flag sets the
//! generated Makefile is built with.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::fileset::FileResolver;
use crate::core::registry::TargetRegistry;
use crate::core::target::{Target, TargetKind};
use crate::core::workspace::MANIFEST_NAME;
use crate::resolver::ConfigError;

/// A parsed Makegen.toml.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub project: ProjectSection,

    #[serde(default)]
    pub build: BuildSection,

    /// `[[target]]` tables, in declaration order
    #[serde(default, rename = "target")]
    pub targets: Vec<TargetSpec>,
}

/// The `[project]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectSection {
    /// Project name
    pub name: String,

    /// Target built (and optionally run) by a bare `make`
    #[serde(default)]
    pub default: Option<String>,

    /// When set, the default goal also runs the default executable with these arguments
    #[serde(default)]
    pub run_args: Option<Vec<String>>,
}

/// The `[build]` section: output layout and flag sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct BuildSection {
    /// Directory receiving linked artifacts
    pub build_dir: PathBuf,

    /// Object root (defaults to `<build-dir>/obj`)
    pub obj_dir: Option<PathBuf>,

    /// Flags used in every mode
    pub cflags: Vec<String>,

    /// Flags added in debug mode
    pub debug_cflags: Vec<String>,

    /// Flags added in release mode
    pub release_cflags: Vec<String>,

    /// Extra developer flags, enabled with `--dev`
    pub dev_cflags: Vec<String>,

    /// Linker flags for static linking; order is preserved
    pub static_ldflags: Vec<String>,
}

impl Default for BuildSection {
    fn default() -> Self {
        BuildSection {
            build_dir: PathBuf::from("build"),
            obj_dir: None,
            cflags: strings(&["-Wall", "-pedantic", "-std=c99"]),
            debug_cflags: strings(&["-g", "-Og"]),
            release_cflags: strings(&["-O2"]),
            dev_cflags: strings(&["-Wextra", "-Werror"]),
            static_ldflags: strings(&["-static", "-static-libgcc"]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl BuildSection {
    /// Effective object root.
    pub fn obj_dir(&self) -> PathBuf {
        self.obj_dir
            .clone()
            .unwrap_or_else(|| self.build_dir.join("obj"))
    }
}

/// A `[[target]]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TargetSpec {
    pub name: String,

    #[serde(default)]
    pub kind: TargetKind,

    /// Source globs
    #[serde(default)]
    pub sources: Vec<String>,

    /// Header globs that sources of this target (and its dependents) rebuild on
    #[serde(default)]
    pub headers: Vec<String>,

    /// Include search paths, in priority order
    #[serde(default)]
    pub includes: Vec<String>,

    /// Names of targets this one needs
    #[serde(default)]
    pub deps: Vec<String>,

    /// Leading source path components dropped when deriving object paths
    #[serde(default)]
    pub obj_skip: usize,

    /// Link libraries, propagated to dependents
    #[serde(default)]
    pub libs: Vec<String>,
}

impl FromStr for Manifest {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        Self::parse(Path::new(MANIFEST_NAME), s)
    }
}

impl Manifest {
    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::invalid_manifest(path, e.to_string()))?;
        Self::parse(path, &contents)
    }

    fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::invalid_manifest(path, e.to_string().trim_end()))
    }

    /// Construct every declared target and register it.
    ///
    /// Dependency names are not checked here; they are resolved when rules
    /// are emitted, so targets may refer to ones declared later.
    pub fn build_registry(&self, resolver: &dyn FileResolver) -> Result<TargetRegistry> {
        let obj_root = self.build.obj_dir();
        let mut registry = TargetRegistry::new();

        for spec in &self.targets {
            let mut target = Target::new(spec.name.as_str(), spec.kind)?;
            target
                .add_sources(resolver, &obj_root, &spec.sources, spec.obj_skip)
                .with_context(|| format!("failed to collect sources for `{}`", spec.name))?;
            target
                .add_headers(resolver, &spec.headers)
                .with_context(|| format!("failed to collect headers for `{}`", spec.name))?;
            target.add_includes(spec.includes.iter().cloned());
            target.add_dependencies(&spec.deps);
            target.add_libs(spec.libs.iter().cloned());

            registry.register(target)?;
        }

        tracing::debug!(
            "loaded {} target(s) for project `{}`",
            registry.len(),
            self.project.name
        );
        Ok(registry)
    }
}
