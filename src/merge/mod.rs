// src/merge/mod.rs
//! Merges many xUnit suite reports into one file Polarion can import.
//!
//! Every `<testcase>` classname is prefixed with the project namespace of the
//! file it came from, suite counters are summed into one combined suite, and
//! the property block of the first (largest) file is kept once.

pub mod namespace;
pub mod rewriter;
pub mod totals;
pub mod writer;

pub use self::totals::{Counter, SuiteTotals};

use crate::config::MergeConfig;
use crate::discovery;
use crate::error::{PrepError, Result};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// State accumulated across every file of one merge run.
#[derive(Debug, Default)]
pub struct MergeState {
    pub totals: SuiteTotals,
    /// Property lines from the first file, written once after the combined suite tag.
    pub properties: Vec<Vec<u8>>,
}

/// Outcome of a completed merge.
#[derive(Debug, Clone)]
pub struct MergeSummary {
    pub files: usize,
    pub output: PathBuf,
    pub totals: SuiteTotals,
}

/// Runs the whole pipeline under `root` and writes the merged document there.
///
/// `on_progress` is called with `(index, total, path)` before each file.
///
/// # Errors
/// Returns error on I/O failure, a malformed suite counter, or a file with no
/// project marker when the config treats that as fatal. No output is written
/// in that case.
pub fn run<F>(root: &Path, config: &MergeConfig, mut on_progress: F) -> Result<MergeSummary>
where
    F: FnMut(usize, usize, &Path),
{
    config.validate()?;
    let files = discovery::discover(root, config)?;
    let total = files.len();

    let mut state = MergeState::default();
    let body = NamedTempFile::new().map_err(PrepError::io(std::env::temp_dir()))?;
    {
        let mut out = BufWriter::new(body.as_file());
        for (i, path) in files.iter().enumerate() {
            on_progress(i + 1, total, path);
            let namespace = namespace::derive(root, path, config)?;
            let prefix = format!("{namespace}{}", config.namespace_delimiter);
            rewriter::rewrite_file(path, &prefix, i == 0, &mut state, &mut out)?;
        }
        out.flush().map_err(PrepError::io(body.path()))?;
    }

    let output = root.join(&config.output_name);
    let mut reader = body.reopen().map_err(PrepError::io(body.path()))?;
    writer::write_document(&output, &state, &mut reader)?;

    Ok(MergeSummary {
        files: total,
        output,
        totals: state.totals,
    })
}
