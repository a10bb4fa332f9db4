//! Workspace - the project being generated for.
//!
//! A Workspace pairs a loaded manifest with the directory it lives in.
//! Every relative path in the manifest, and in the generated Makefile, is
//! relative to that directory.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::core::fileset::GlobResolver;
use crate::core::manifest::Manifest;
use crate::core::registry::TargetRegistry;

/// Manifest filename.
pub const MANIFEST_NAME: &str = "Makegen.toml";

/// Default name of the generated rule script.
pub const MAKEFILE_NAME: &str = "Makefile";

/// Find the manifest in `start` or the nearest ancestor containing one.
pub fn find_manifest(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(MANIFEST_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            bail!(
                "could not find `{}` in `{}` or any parent directory",
                MANIFEST_NAME,
                start.display()
            );
        }
    }
}

/// A loaded project.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    manifest_path: PathBuf,
    manifest: Manifest,
}

impl Workspace {
    /// Create a new workspace from a manifest path.
    pub fn new(manifest_path: &Path) -> Result<Self> {
        let manifest = Manifest::load(manifest_path)?;
        let root = manifest_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();

        Ok(Workspace {
            root,
            manifest_path: manifest_path.to_path_buf(),
            manifest,
        })
    }

    /// Project root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Default location of the generated Makefile.
    pub fn default_makefile(&self) -> PathBuf {
        self.root.join(MAKEFILE_NAME)
    }

    /// Resolve the manifest's patterns on disk and register every target.
    pub fn registry(&self) -> Result<TargetRegistry> {
        self.manifest
            .build_registry(&GlobResolver::new(&self.root))
    }
}
