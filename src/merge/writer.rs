// src/merge/writer.rs
use super::MergeState;
use crate::error::{PrepError, Result};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

/// Name carried by the single combined suite.
pub const MERGED_SUITE_NAME: &str = "ResultsForPolarion";

/// Writes the merged document: wrapper, totals suite, properties, then `body`.
///
/// # Errors
/// Returns error if the output cannot be created or written.
pub fn write_document<R: Read>(output: &Path, state: &MergeState, body: &mut R) -> Result<()> {
    let file = File::create(output).map_err(PrepError::io(output))?;
    let mut out = BufWriter::new(file);
    render(&mut out, state, body).map_err(PrepError::io(output))?;
    out.flush().map_err(PrepError::io(output))?;
    Ok(())
}

fn render<W: Write, R: Read>(out: &mut W, state: &MergeState, body: &mut R) -> io::Result<()> {
    let t = &state.totals;
    writeln!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(out, "<testsuites>")?;
    writeln!(
        out,
        "<testsuite name=\"{MERGED_SUITE_NAME}\"  time=\"{}\" tests=\"{}\" errors=\"{}\" skipped=\"{}\" failures=\"{}\" >",
        t.time, t.tests, t.errors, t.skipped, t.failures
    )?;
    for prop in &state.properties {
        out.write_all(prop)?;
    }
    io::copy(body, out)?;
    writeln!(out, "</testsuite>")?;
    writeln!(out, "</testsuites>")?;
    Ok(())
}
