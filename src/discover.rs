//! Log file discovery
//!
//! A plain recursive walk with the selection rule passed in as a predicate,
//! so callers decide what counts as a log file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// Collect every file under `root` (any depth) accepted by `predicate`,
/// in sorted order. macOS `.DS_Store` droppings are always skipped.
pub fn list_files(
    root: &Path,
    predicate: impl Fn(&Path) -> bool,
) -> Result<Vec<PathBuf>, PipelineError> {
    let mut found = Vec::new();
    walk(root, &predicate, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk(
    dir: &Path,
    predicate: &impl Fn(&Path) -> bool,
    found: &mut Vec<PathBuf>,
) -> Result<(), PipelineError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, predicate, found)?;
        } else {
            if path.file_name().map(|n| n == ".DS_Store").unwrap_or(false) {
                continue;
            }
            if predicate(&path) {
                found.push(path);
            }
        }
    }
    Ok(())
}
