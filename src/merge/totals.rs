// src/merge/totals.rs
//! Suite counter accumulation.

use crate::error::{PrepError, Result};
use std::fmt;
use std::path::Path;

/// Attributes that never feed the totals.
const IGNORED_KEYS: &[&str] = &["name", "hostname", "timestamp"];

/// A summed suite attribute. Stays integral until a fractional value is added.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Counter {
    Int(i64),
    Float(f64),
}

impl Default for Counter {
    fn default() -> Self {
        Self::Int(0)
    }
}

impl Counter {
    #[must_use]
    pub fn add(self, other: Self) -> Self {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a
                .checked_add(b)
                .map_or_else(|| Self::Float(a as f64 + b as f64), Self::Int),
            (a, b) => Self::Float(a.as_f64() + b.as_f64()),
        }
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    /// Parses an integer or decimal literal such as `8`, `-3`, `1.207` or `2e3`.
    #[must_use]
    pub fn parse(literal: &str) -> Option<Self> {
        let literal = literal.trim();
        let numeric_chars = literal
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
        if literal.is_empty() || !numeric_chars {
            return None;
        }
        if let Ok(v) = literal.parse::<i64>() {
            return Some(Self::Int(v));
        }
        literal
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Self::Float)
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) if v.fract() == 0.0 => write!(f, "{v:.1}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

/// Run-wide sums of every suite's counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuiteTotals {
    pub time: Counter,
    pub tests: Counter,
    pub errors: Counter,
    pub skipped: Counter,
    pub failures: Counter,
}

impl SuiteTotals {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn counter_mut(&mut self, key: &str) -> Option<&mut Counter> {
        match key {
            "time" => Some(&mut self.time),
            "tests" => Some(&mut self.tests),
            "errors" => Some(&mut self.errors),
            "skipped" => Some(&mut self.skipped),
            "failures" => Some(&mut self.failures),
            _ => None,
        }
    }

    /// Adds the counters of one `<testsuite ...>` line.
    ///
    /// Example input:
    /// `<testsuite hostname="localhost" name="org.Foo" tests="8" failures="0" timestamp="25 Aug 2014 13:07:12 GMT" time="1.207" errors="0">`
    ///
    /// # Errors
    /// Returns [`PrepError::InvalidCounter`] if a counter value is not numeric.
    /// Totals may be partially updated when that happens.
    pub fn add_suite_line(&mut self, file: &Path, line: &str) -> Result<()> {
        let attrs = line
            .trim()
            .replace("<testsuite ", "")
            .replace("/>", "")
            .replace(['>', '"', '\''], "");

        for token in attrs.split_whitespace() {
            let Some((key, value)) = token.split_once('=') else {
                continue;
            };
            if IGNORED_KEYS.contains(&key) {
                continue;
            }
            let Some(slot) = self.counter_mut(key) else {
                tracing::debug!(key, file = %file.display(), "ignoring suite attribute");
                continue;
            };
            let normalized = value.replace(',', "");
            let parsed = Counter::parse(&normalized).ok_or_else(|| PrepError::InvalidCounter {
                file: file.to_path_buf(),
                key: key.to_string(),
                value: value.to_string(),
            })?;
            *slot = slot.add(parsed);
        }
        Ok(())
    }
}
