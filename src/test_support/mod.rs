//! Test utilities and mocks for makegen unit tests.
//!
//! Provides an in-memory [`FileResolver`] so target construction can be
//! tested without touching disk, plus helpers for building registries and
//! on-disk fixture projects.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use glob::{MatchOptions, Pattern};
use tempfile::TempDir;

use crate::core::{FileResolver, Target, TargetRegistry};

/// In-memory file set matched with the same glob rules as the real resolver.
#[derive(Debug, Clone, Default)]
pub struct MockFileSet {
    files: Vec<PathBuf>,
}

impl MockFileSet {
    pub fn new<'a>(files: impl IntoIterator<Item = &'a str>) -> Self {
        let mut files: Vec<PathBuf> = files.into_iter().map(PathBuf::from).collect();
        files.sort();
        files.dedup();
        MockFileSet { files }
    }
}

impl FileResolver for MockFileSet {
    fn resolve(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let pattern = Pattern::new(pattern)?;
        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::default()
        };
        Ok(self
            .files
            .iter()
            .filter(|f| pattern.matches_path_with(f, options))
            .cloned()
            .collect())
    }
}

/// Build a registry of library targets from `(name, deps)` pairs.
pub fn registry_of(targets: &[(&str, &[&str])]) -> TargetRegistry {
    let mut registry = TargetRegistry::new();
    for (name, deps) in targets {
        let mut target = Target::library(*name).unwrap();
        target.add_dependencies(deps.iter());
        registry.register(target).unwrap();
    }
    registry
}

/// The two-target project used throughout the emitter tests:
/// `lib` owns `a.c`, `app` owns `main.c` and depends on `lib`.
pub fn lib_and_app() -> TargetRegistry {
    let mut registry = TargetRegistry::new();

    let mut lib = Target::library("lib").unwrap();
    lib.insert_source("a.c", "build/obj/a.o").unwrap();
    registry.register(lib).unwrap();

    let mut app = Target::executable("app").unwrap();
    app.insert_source("main.c", "build/obj/main.o").unwrap();
    app.add_dependencies(["lib"]);
    registry.register(app).unwrap();

    registry
}

/// A project directory on disk.
pub struct FixtureProject {
    dir: TempDir,
}

impl FixtureProject {
    pub fn new() -> Self {
        FixtureProject {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the project root, creating parent directories.
    pub fn file(self, path: &str, contents: &str) -> Self {
        let full = self.dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, contents).unwrap();
        self
    }

    /// Write the manifest.
    pub fn manifest(self, contents: &str) -> Self {
        self.file(crate::core::MANIFEST_NAME, contents)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.path().join(crate::core::MANIFEST_NAME)
    }
}

/// Manifest for a small library + executable project.
pub const LIB_AND_APP_MANIFEST: &str = r#"
[project]
name = "demo"
default = "app"

[[target]]
name = "lib"
kind = "library"
sources = ["lib/**/*.c"]
headers = ["lib/**/*.h"]
includes = ["lib"]

[[target]]
name = "app"
kind = "executable"
sources = ["src/*.c"]
deps = ["lib"]
"#;

/// A fixture project matching [`LIB_AND_APP_MANIFEST`].
pub fn lib_and_app_project() -> FixtureProject {
    FixtureProject::new()
        .manifest(LIB_AND_APP_MANIFEST)
        .file("lib/a.c", "int a(void) { return 1; }\n")
        .file("lib/a.h", "int a(void);\n")
        .file(
            "src/main.c",
            "#include \"a.h\"\nint main(void) { return a() - 1; }\n",
        )
}
