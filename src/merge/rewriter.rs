// src/merge/rewriter.rs
//! Line-oriented rewriting of one result file into the merged body.
//!
//! Works on raw lines, never on a parsed XML tree, so the merged output keeps
//! the formatting of the inputs byte for byte apart from the rewritten fields.

use super::MergeState;
use crate::error::{PrepError, Result};
use regex::bytes::{NoExpand, Regex};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::LazyLock;

const PROPERTY_MARKERS: &[&str] = &["<properties>", "</properties>", "<property "];
const PROPERTY_CONTINUATION: &str = "\"/>";
const PROLOG_MARKER: &str = "<?xml ";
const TESTCASE_MARKER: &str = "<testcase ";
const SUITE_MARKER: &str = "<testsuite ";
const CLASSNAME_ATTR: &str = "classname=\"";

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"timestamp="(?-u:[^"])*""#).unwrap_or_else(|_| panic!("Invalid Regex"))
});
static CLASSNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&regex::escape(CLASSNAME_ATTR)).unwrap_or_else(|_| panic!("Invalid Regex"))
});

/// How a single input line is handled. Variants are listed in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Property block line from the first file; kept once for the whole run.
    Property,
    /// `<testcase` line; classname gets the namespace prefix.
    TestCase,
    /// `<testsuite` line; feeds the totals and loses its timestamp.
    SuiteOpen,
    /// Prolog or a property line from a later file.
    Discard,
    Passthrough,
}

/// Classifies a decoded line. All markers are ASCII, so a lossily decoded
/// line classifies the same as its raw bytes.
#[must_use]
pub fn classify(line: &str, first_file: bool) -> LineKind {
    let property = is_property_line(line);
    if first_file && property {
        return LineKind::Property;
    }
    if line.contains(TESTCASE_MARKER) {
        return LineKind::TestCase;
    }
    if line.contains(SUITE_MARKER) {
        return LineKind::SuiteOpen;
    }
    if property || line.contains(PROLOG_MARKER) {
        return LineKind::Discard;
    }
    LineKind::Passthrough
}

fn is_property_line(line: &str) -> bool {
    PROPERTY_MARKERS.iter().any(|m| line.contains(m))
        || line.trim_end_matches(['\r', '\n']) == PROPERTY_CONTINUATION
}

/// Inserts `prefix` at the start of every `classname` value on the line.
#[must_use]
pub fn prefix_classname<'a>(line: &'a [u8], prefix: &str) -> Cow<'a, [u8]> {
    let replacement = format!("{CLASSNAME_ATTR}{prefix}");
    CLASSNAME_RE.replace_all(line, NoExpand(replacement.as_bytes()))
}

#[must_use]
pub fn strip_timestamp(line: &[u8]) -> Cow<'_, [u8]> {
    TIMESTAMP_RE.replace_all(line, &b""[..])
}

/// Streams `path` line by line into `out`, updating `state` as it goes.
///
/// Lines are handled as raw bytes; invalid UTF-8 in passthrough content is
/// copied unchanged.
///
/// `prefix` is the namespace plus delimiter prepended to each classname.
///
/// # Errors
/// Returns error on I/O failure or a malformed suite counter.
pub fn rewrite_file<W: Write>(
    path: &Path,
    prefix: &str,
    first_file: bool,
    state: &mut MergeState,
    out: &mut W,
) -> Result<()> {
    let file = File::open(path).map_err(PrepError::io(path))?;
    let mut reader = BufReader::new(file);
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).map_err(PrepError::io(path))? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&line);
        match classify(&text, first_file) {
            LineKind::Property => state.properties.push(line.clone()),
            LineKind::TestCase => out.write_all(&prefix_classname(&line, prefix))?,
            LineKind::SuiteOpen => {
                state.totals.add_suite_line(path, &text)?;
                out.write_all(b"\n")?;
                out.write_all(&strip_timestamp(&line))?;
            }
            LineKind::Discard => {
                tracing::debug!(file = %path.display(), line = text.trim_end(), "skipping line");
            }
            LineKind::Passthrough => out.write_all(&line)?,
        }
    }
    Ok(())
}
