// src/discovery.rs
use crate::config::MergeConfig;
use crate::error::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Finds every result file under `root`, largest first.
///
/// Ties keep walk order, which is sorted by file name.
///
/// # Errors
/// Returns error if the pattern is invalid or the file system walk fails.
pub fn discover(root: &Path, config: &MergeConfig) -> Result<Vec<PathBuf>> {
    let pattern = config.file_regex()?;
    let mut sized = walk_results(root, &pattern)?;
    sized.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(sized.into_iter().map(|(path, _)| path).collect())
}

fn walk_results(root: &Path, pattern: &Regex) -> Result<Vec<(PathBuf, u64)>> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_result_file(entry.path(), pattern) {
            continue;
        }
        let size = entry.metadata()?.len();
        found.push((entry.into_path(), size));
    }
    Ok(found)
}

fn is_result_file(path: &Path, pattern: &Regex) -> bool {
    path.file_name()
        .and_then(|f| f.to_str())
        .is_some_and(|name| pattern.is_match(name))
}
