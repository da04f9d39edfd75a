// src/merge/namespace.rs
//! Project namespace derivation.
//!
//! The namespace is the directory path between the search root and the
//! build-output marker directory, joined with the configured delimiter:
//! `root/jcache/remote/target/surefire-reports/TEST-x.xml` gives `jcache_remote`.

use crate::config::{MergeConfig, MissingMarker};
use crate::error::{PrepError, Result};
use std::path::{Component, Path};

/// Derives the project namespace for `file`, found under `root`.
///
/// Markers are tried in configured order; the last occurrence of a marker
/// in the path is the one that counts. When the marker sits in `root`
/// itself (the scan started inside a build output directory) the namespace
/// is empty.
///
/// # Errors
/// Returns [`PrepError::MissingProjectMarker`] when no marker is present and
/// the config asks for a hard failure.
pub fn derive(root: &Path, file: &Path, config: &MergeConfig) -> Result<String> {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let dirs = segments(relative.parent().unwrap_or(Path::new("")));
    let markers: Vec<&str> = config
        .project_markers
        .iter()
        .map(String::as_str)
        .filter(|m| !m.is_empty())
        .collect();

    for marker in &markers {
        if let Some(pos) = dirs.iter().rposition(|d| d == marker) {
            return Ok(dirs[..pos].join(config.namespace_delimiter.as_str()));
        }
    }

    let root_dirs = segments(root);
    if markers.iter().any(|m| root_dirs.contains(m)) {
        return Ok(String::new());
    }

    match config.missing_marker {
        MissingMarker::Error => Err(PrepError::MissingProjectMarker {
            path: file.to_path_buf(),
        }),
        MissingMarker::Empty => {
            tracing::warn!(path = %file.display(), "no project marker, using empty namespace");
            Ok(String::new())
        }
    }
}

fn segments(path: &Path) -> Vec<&str> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect()
}
