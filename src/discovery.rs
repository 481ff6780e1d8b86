//! Matching container files across the three parallel directory trees
//!
//! The base tree drives discovery: every file with the configured extension
//! under it is paired with the file at the same relative path in the updated
//! and translation trees.

use crate::config::CarryConfig;
use crate::runner::RunResult;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Root directories of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    pub base: PathBuf,
    pub updated: PathBuf,
    pub translation: PathBuf,
    /// Directory of review files; present in merge mode only
    pub overrides: Option<PathBuf>,
}

impl Roots {
    pub fn new<P: Into<PathBuf>>(base: P, updated: P, translation: P) -> Self {
        Roots {
            base: base.into(),
            updated: updated.into(),
            translation: translation.into(),
            overrides: None,
        }
    }

    pub fn with_overrides<P: Into<PathBuf>>(mut self, overrides: P) -> Self {
        self.overrides = Some(overrides.into());
        self
    }
}

/// The matching files for one relative path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    /// Path relative to each root, e.g. `menu/item.fmg`
    pub relative: PathBuf,
    pub base: PathBuf,
    pub updated: PathBuf,
    pub translation: PathBuf,
    /// Review file holding overrides, e.g. `<overrides>/menu/item.fmg.txt`
    pub overrides: Option<PathBuf>,
}

impl FileSet {
    /// Relative path of this set's review file
    pub fn review_path(&self, config: &CarryConfig) -> PathBuf {
        review_path(&self.relative, config)
    }
}

fn review_path(relative: &Path, config: &CarryConfig) -> PathBuf {
    let name = relative
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    relative.with_file_name(config.review_file_name(&name))
}

/// Walk the base tree and pair up files in sorted order
///
/// Files missing from the updated or translation tree are logged and skipped.
pub fn discover(roots: &Roots, config: &CarryConfig) -> RunResult<Vec<FileSet>> {
    let extension = config.extension();
    let mut sets = Vec::new();

    for entry in WalkDir::new(&roots.base).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }

        let relative = match path.strip_prefix(&roots.base) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => continue,
        };

        let updated = roots.updated.join(&relative);
        let translation = roots.translation.join(&relative);
        if !updated.is_file() {
            warn!("{:?} has no counterpart in {:?}, skipped", relative, roots.updated);
            continue;
        }
        if !translation.is_file() {
            warn!(
                "{:?} has no counterpart in {:?}, skipped",
                relative, roots.translation
            );
            continue;
        }

        let overrides = roots
            .overrides
            .as_ref()
            .map(|dir| dir.join(review_path(&relative, config)));

        debug!("Matched {:?}", relative);
        sets.push(FileSet {
            relative,
            base: path.to_path_buf(),
            updated,
            translation,
            overrides,
        });
    }

    Ok(sets)
}
