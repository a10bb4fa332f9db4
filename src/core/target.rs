//! Target definitions - what gets built.
//!
//! A Target is one named build unit: an executable linked from its own
//! objects plus the objects of everything it depends on, or a source-only
//! library whose objects are linked into its dependents.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::core::fileset::FileResolver;
use crate::resolver::ConfigError;

/// Suffix appended to executable artifacts on this platform.
pub const EXE_EXT: &str = if cfg!(windows) { ".exe" } else { "" };

/// Extension given to compiled objects.
pub const OBJECT_EXT: &str = "o";

/// The kind of target being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// Executable binary
    #[default]
    #[serde(alias = "exe", alias = "bin")]
    Executable,

    /// Source library; its objects are linked straight into dependents
    #[serde(alias = "lib")]
    Library,
}

impl TargetKind {
    /// Output filenames a target of this kind produces.
    pub fn artifacts(&self, name: &str) -> BTreeSet<String> {
        match self {
            TargetKind::Executable => BTreeSet::from([format!("{}{}", name, EXE_EXT)]),
            TargetKind::Library => BTreeSet::new(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Executable => "executable",
            TargetKind::Library => "library",
        }
    }
}

/// Anything that names a target: a plain name or the target itself.
pub trait TargetRef {
    fn target_name(&self) -> &str;
}

impl TargetRef for str {
    fn target_name(&self) -> &str {
        self
    }
}

impl TargetRef for String {
    fn target_name(&self) -> &str {
        self
    }
}

impl TargetRef for Target {
    fn target_name(&self) -> &str {
        &self.name
    }
}

impl<T: TargetRef + ?Sized> TargetRef for &T {
    fn target_name(&self) -> &str {
        (**self).target_name()
    }
}

/// A build target with its accumulated inputs.
#[derive(Debug, Clone)]
pub struct Target {
    name: String,
    kind: TargetKind,
    artifacts: BTreeSet<String>,
    /// source path => object path
    sources: BTreeMap<PathBuf, PathBuf>,
    headers: BTreeSet<PathBuf>,
    /// Ordered; first match wins during compilation
    includes: Vec<String>,
    /// Target names, resolved through the registry at emission time
    dependencies: BTreeSet<String>,
    libs: Vec<String>,
}

impl Target {
    /// Create a new target with the given name and kind.
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Result<Self, ConfigError> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(ConfigError::InvalidTargetName { name });
        }

        Ok(Target {
            artifacts: kind.artifacts(&name),
            name,
            kind,
            sources: BTreeMap::new(),
            headers: BTreeSet::new(),
            includes: Vec::new(),
            dependencies: BTreeSet::new(),
            libs: Vec::new(),
        })
    }

    /// Create a new executable target.
    pub fn executable(name: impl Into<String>) -> Result<Self, ConfigError> {
        Self::new(name, TargetKind::Executable)
    }

    /// Create a new source library target.
    pub fn library(name: impl Into<String>) -> Result<Self, ConfigError> {
        Self::new(name, TargetKind::Library)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn artifacts(&self) -> &BTreeSet<String> {
        &self.artifacts
    }

    pub fn sources(&self) -> &BTreeMap<PathBuf, PathBuf> {
        &self.sources
    }

    /// Object paths, sorted.
    pub fn objects(&self) -> BTreeSet<&Path> {
        self.sources.values().map(PathBuf::as_path).collect()
    }

    pub fn headers(&self) -> &BTreeSet<PathBuf> {
        &self.headers
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    pub fn libs(&self) -> &[String] {
        &self.libs
    }

    /// Add sources matching `patterns`, placing their objects under `obj_root`.
    ///
    /// `obj_skip` leading components are dropped from each source path
    /// before it is relocated, so `src/vm/gc.c` with a skip of 1 becomes
    /// `<obj_root>/vm/gc.o`. A pattern matching nothing contributes nothing.
    pub fn add_sources<P: AsRef<str>>(
        &mut self,
        resolver: &dyn FileResolver,
        obj_root: &Path,
        patterns: &[P],
        obj_skip: usize,
    ) -> Result<()> {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let files = resolver.resolve(pattern)?;
            if files.is_empty() {
                tracing::warn!(
                    "source pattern `{}` in target `{}` matched no files",
                    pattern,
                    self.name
                );
            }

            for source in files {
                let object = object_path(obj_root, &source, obj_skip)
                    .map_err(|reason| ConfigError::path_derivation(&self.name, &source, reason))?;
                self.insert_source(source, object)?;
            }
        }
        Ok(())
    }

    /// Map a single source to an explicit object path.
    pub fn insert_source(
        &mut self,
        source: impl Into<PathBuf>,
        object: impl Into<PathBuf>,
    ) -> Result<(), ConfigError> {
        let source = source.into();
        let object = object.into();

        if let Some((other, _)) = self
            .sources
            .iter()
            .find(|(src, obj)| **obj == object && **src != source)
        {
            return Err(ConfigError::path_derivation(
                &self.name,
                &source,
                format!(
                    "object `{}` is already produced by `{}`",
                    object.display(),
                    other.display()
                ),
            ));
        }

        tracing::trace!(
            "{}: {} -> {}",
            self.name,
            source.display(),
            object.display()
        );
        self.sources.insert(source, object);
        Ok(())
    }

    /// Add headers matching `patterns`.
    pub fn add_headers<P: AsRef<str>>(
        &mut self,
        resolver: &dyn FileResolver,
        patterns: &[P],
    ) -> Result<()> {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let files = resolver.resolve(pattern)?;
            if files.is_empty() {
                tracing::warn!(
                    "header pattern `{}` in target `{}` matched no files",
                    pattern,
                    self.name
                );
            }
            self.headers.extend(files);
        }
        Ok(())
    }

    /// Append include search paths, keeping first-seen order.
    pub fn add_includes<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for path in paths {
            let path = path.into();
            if !self.includes.contains(&path) {
                self.includes.push(path);
            }
        }
    }

    /// Depend on other targets, by name or by reference.
    pub fn add_dependencies<I, D>(&mut self, deps: I)
    where
        I: IntoIterator<Item = D>,
        D: TargetRef,
    {
        self.dependencies
            .extend(deps.into_iter().map(|d| d.target_name().to_string()));
    }

    /// Append link libraries (e.g. `-lm`), keeping first-seen order.
    pub fn add_libs<I, S>(&mut self, libs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for lib in libs {
            let lib = lib.into();
            if !self.libs.contains(&lib) {
                self.libs.push(lib);
            }
        }
    }
}

/// Goals every generated Makefile defines itself.
const RESERVED_NAMES: &[&str] = &["all", "clean", "default"];

/// Names double as Make variable prefixes and phony goals.
fn is_valid_name(name: &str) -> bool {
    let Some(first) = name.chars().next() else {
        return false;
    };
    !RESERVED_NAMES.contains(&name)
        && first != '-'
        && first != '.'
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Derive the object path for `source` under `obj_root`.
///
/// Returns the reason on failure; the caller attaches target context.
pub fn object_path(obj_root: &Path, source: &Path, skip: usize) -> Result<PathBuf, String> {
    let relocated = source.with_extension(OBJECT_EXT);
    let parts: Vec<Component<'_>> = relocated
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    if parts.len() <= skip {
        return Err(format!(
            "stripping {} leading component(s) leaves nothing",
            skip
        ));
    }

    let mut object = obj_root.to_path_buf();
    for part in &parts[skip..] {
        match part {
            Component::Normal(p) => object.push(p),
            Component::ParentDir => {
                return Err("`..` would place the object outside the object root".to_string())
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(
                    "absolute path would place the object outside the object root".to_string(),
                )
            }
            Component::CurDir => {}
        }
    }
    Ok(object)
}
