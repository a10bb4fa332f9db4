//! Configuration file support for makegen.
//!
//! makegen supports two configuration file locations:
//! - Global: `~/.makegen/config.toml` - User-wide defaults
//! - Project: `.makegen/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// makegen configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildDefaults,
}

/// Defaults for `makegen build` and `makegen generate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildDefaults {
    /// Default number of parallel make jobs (0 = unbounded, None = auto-detect)
    pub jobs: Option<usize>,

    /// Build in release mode by default
    pub release: Option<bool>,

    /// Link dynamically by default
    pub dynamic: Option<bool>,

    /// Enable the developer flag set by default
    pub dev: Option<bool>,

    /// Extra compiler flags always added
    pub extra_cflags: Vec<String>,

    /// Where to write the generated Makefile (relative to the project root)
    pub makefile: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.release.is_some() {
            self.build.release = other.build.release;
        }
        if other.build.dynamic.is_some() {
            self.build.dynamic = other.build.dynamic;
        }
        if other.build.dev.is_some() {
            self.build.dev = other.build.dev;
        }
        // Flag sets accumulate
        for flag in other.build.extra_cflags {
            if !self.build.extra_cflags.contains(&flag) {
                self.build.extra_cflags.push(flag);
            }
        }
        if other.build.makefile.is_some() {
            self.build.makefile = other.build.makefile;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.makegen/config.toml)
/// 2. Global config (~/.makegen/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global makegen config directory (~/.makegen).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".makegen"))
}

/// Get the global config path (~/.makegen/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.makegen/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".makegen").join("config.toml")
}
