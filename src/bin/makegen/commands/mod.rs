//! Command implementations

pub mod build;
pub mod completions;
pub mod deps;
pub mod generate;
pub mod targets;

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::{FlagArgs, GlobalArgs};
use makegen::builder::{BuildConfig, BuildMode, LinkMode};
use makegen::core::{find_manifest, Workspace};
use makegen::ops::GenerateOptions;
use makegen::util::config::{global_config_path, load_config, project_config_path};
use makegen::util::Config;

/// Locate and load the project.
pub fn load_workspace(global: &GlobalArgs) -> Result<Workspace> {
    let manifest_path = match &global.manifest_path {
        Some(path) => path.clone(),
        None => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            find_manifest(&cwd)?
        }
    };
    Workspace::new(&manifest_path)
}

/// Load global + project configuration for a workspace.
pub fn load_user_config(ws: &Workspace) -> Config {
    load_config(
        global_config_path().as_deref(),
        &project_config_path(ws.root()),
    )
}

/// Combine command-line flags with configuration files; flags win.
pub fn generate_options(
    flags: &FlagArgs,
    config: &Config,
    force_rebuild: bool,
    jobs: Option<usize>,
) -> GenerateOptions {
    let defaults = &config.build;

    let release = flags.release || defaults.release.unwrap_or(false);
    let dynamic = flags.dynamic || defaults.dynamic.unwrap_or(false);

    let build_config = BuildConfig {
        mode: if release {
            BuildMode::Release
        } else {
            BuildMode::Debug
        },
        dev: flags.dev || defaults.dev.unwrap_or(false),
        extra_flags: defaults
            .extra_cflags
            .iter()
            .chain(flags.cflags.iter())
            .cloned()
            .collect(),
        link_mode: if dynamic {
            LinkMode::Dynamic
        } else {
            LinkMode::Static
        },
        force_rebuild,
        parallelism: jobs.or(defaults.jobs),
    };

    let makefile: Option<PathBuf> = flags.makefile.clone().or_else(|| defaults.makefile.clone());

    GenerateOptions {
        config: build_config,
        makefile,
    }
}
