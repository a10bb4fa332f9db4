//! Implementation of `makegen generate` and `makegen build`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::{BuildConfig, BuildContext, MakeExecutor, RuleEmitter, RuleScript};
use crate::core::Workspace;
use crate::util::fs::{ensure_dir, write_if_changed};

/// Options for generating the Makefile.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Flag and link configuration
    pub config: BuildConfig,

    /// Output path; relative paths are taken from the project root
    pub makefile: Option<PathBuf>,
}

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub generate: GenerateOptions,

    /// Make goals (empty = the Makefile's default goal)
    pub goals: Vec<String>,
}

/// Result of generating the Makefile.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    /// Where the Makefile was written
    pub makefile: PathBuf,

    /// False when an identical Makefile was already in place
    pub changed: bool,

    pub script: RuleScript,
}

/// Lay out the rules for a workspace without writing anything.
pub fn plan(ws: &Workspace, config: &BuildConfig) -> Result<RuleScript> {
    let registry = ws.registry()?;
    let ctx = BuildContext::new(ws.manifest(), config);
    let script = RuleEmitter::new(&ctx).plan(&registry)?;
    Ok(script)
}

/// Generate the Makefile and create the directories its rules write into.
///
/// Nothing is written unless the whole configuration is valid.
pub fn generate(ws: &Workspace, opts: &GenerateOptions) -> Result<GenerateResult> {
    let script = plan(ws, &opts.config)?;
    let makefile = makefile_path(ws, opts.makefile.as_deref());

    let changed = write_if_changed(&makefile, &script.to_string())?;
    if changed {
        tracing::info!("wrote {}", makefile.display());
    } else {
        tracing::info!("{} is up to date", makefile.display());
    }

    create_output_dirs(ws.root(), &script)?;

    Ok(GenerateResult {
        makefile,
        changed,
        script,
    })
}

/// Generate the Makefile, then run make; returns make's exit code.
pub fn build(ws: &Workspace, opts: &BuildOptions) -> Result<i32> {
    let generated = generate(ws, &opts.generate)?;

    MakeExecutor::locate(ws.root(), &generated.makefile)?
        .with_config(&opts.generate.config)
        .goals(opts.goals.iter().cloned())
        .run()
}

fn makefile_path(ws: &Workspace, makefile: Option<&Path>) -> PathBuf {
    match makefile {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => ws.root().join(path),
        None => ws.default_makefile(),
    }
}

/// Artifact and object directories must exist before make runs.
fn create_output_dirs(root: &Path, script: &RuleScript) -> Result<()> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    for block in &script.blocks {
        let outputs = block
            .objects
            .iter()
            .chain(block.artifacts.iter());
        for output in outputs {
            if let Some(parent) = output.parent() {
                let dir = root.join(parent);
                if !dirs.contains(&dir) {
                    dirs.push(dir);
                }
            }
        }
    }

    for dir in &dirs {
        ensure_dir(dir)?;
    }
    Ok(())
}
