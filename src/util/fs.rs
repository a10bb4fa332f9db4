//! Filesystem utilities.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{glob_with, MatchOptions, Pattern};
use tempfile::NamedTempFile;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Write `contents` to `path` unless it already holds exactly that.
///
/// The write goes through a temporary file in the same directory that is
/// then renamed over `path`, so readers never observe a half-written file.
/// Returns whether the file changed.
pub fn write_if_changed(path: &Path, contents: &str) -> Result<bool> {
    if let Ok(existing) = fs::read_to_string(path) {
        if existing == contents {
            return Ok(false);
        }
    }

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temporary file in {}", parent.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("failed to write file: {}", path.display()))?;
    Ok(true)
}

/// Find files matching a glob pattern relative to a base directory.
///
/// Results are relative to `base`, sorted and de-duplicated; directories
/// are skipped. `**` matches any number of directories.
pub fn glob_files(base: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    // The base itself may contain glob metacharacters.
    let full_pattern = Path::new(&Pattern::escape(&base.to_string_lossy())).join(pattern);
    let pattern_str = full_pattern.to_string_lossy();

    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::default()
    };

    let mut results = Vec::new();
    for entry in glob_with(&pattern_str, options)
        .with_context(|| format!("invalid glob pattern: {}", pattern))?
    {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    results.push(relative_path(base, &path));
                }
            }
            Err(e) => {
                tracing::warn!("glob error: {}", e);
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(base) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf()),
    }
}
