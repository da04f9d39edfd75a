// src/cli/handlers.rs
//! Top-level handlers for the two binaries.

use super::args::{MapCli, MergeCli};
use super::dispatch;
use crate::config::{Config, PolarionConfig};
use crate::error::{PrepError, Result as PrepResult};
use crate::exit::PrepExit;
use crate::mapping::{self, PolarionClient, TestCaseRecord, WorkItemSource};
use crate::merge;
use anyhow::{anyhow, Context, Result};
use colored::Colorize;

/// Merges every result file under the given directory.
///
/// # Errors
/// Returns error if config loading or the merge fails.
pub fn handle_merge(cli: &MergeCli) -> Result<PrepExit> {
    if !cli.dir.is_dir() {
        eprintln!("{} Not a directory: {}", "Usage:".yellow(), cli.dir.display());
        return Ok(PrepExit::Usage);
    }
    let config = Config::load().context("Failed to load polarion-prep.toml")?;

    let summary = merge::run(&cli.dir, &config.merge, |_, _, path| {
        println!("Processing file: '{}'", path.display());
    })
    .with_context(|| format!("Failed to merge results under {}", cli.dir.display()))?;

    if summary.files == 0 {
        println!("{}", "No xUnit result files found.".yellow());
    }
    println!(
        "{} {} ({} files, {} tests, {} failures, {} errors)",
        "Wrote".green().bold(),
        summary.output.display(),
        summary.files,
        summary.totals.tests,
        summary.totals.failures,
        summary.totals.errors
    );
    Ok(PrepExit::Success)
}

/// Runs a mapping subcommand against the project's file store.
///
/// # Errors
/// Returns error if no project is configured, the store cannot be opened or
/// flushed, or the subcommand fails.
pub fn handle_map(cli: &MapCli) -> Result<PrepExit> {
    let config = Config::load().context("Failed to load polarion-prep.toml")?;
    let project = cli
        .project
        .clone()
        .or_else(|| config.polarion.project.clone())
        .ok_or_else(|| anyhow!("No Polarion project (use --project or set POLARION_PROJECT)"))?;
    let store_dir = cli
        .store_dir
        .clone()
        .unwrap_or_else(|| config.polarion.store_dir.clone());

    let remote = Remote::from_config(&config.polarion)?;
    let exit = mapping::with_file_store(&store_dir, &project, remote, |store| {
        dispatch::execute(&cli.command, store)
    })?;
    Ok(exit)
}

/// The query service, or the reason there is none.
///
/// Commands that never query (`set`, `delete`, `list`) work without a URL.
enum Remote {
    Polarion(PolarionClient),
    Unconfigured(String),
}

impl Remote {
    fn from_config(config: &PolarionConfig) -> PrepResult<Self> {
        match PolarionClient::from_config(config) {
            Ok(client) => Ok(Self::Polarion(client)),
            Err(PrepError::Config(reason)) => Ok(Self::Unconfigured(reason)),
            Err(e) => Err(e),
        }
    }
}

impl WorkItemSource for Remote {
    fn query(&self, query: &str, fields: &[&str], project: &str) -> PrepResult<Vec<TestCaseRecord>> {
        match self {
            Self::Polarion(client) => client.query(query, fields, project),
            Self::Unconfigured(reason) => Err(PrepError::Config(reason.clone())),
        }
    }
}
