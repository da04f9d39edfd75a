//! Mapping subcommand dispatch, generic over the store backend.

use super::args::MapCommand;
use crate::error::Result;
use crate::exit::PrepExit;
use crate::mapping::{KeyValueStore, MappingStore, WorkItemSource};
use colored::Colorize;

/// Executes one mapping subcommand against `store`.
///
/// # Errors
/// Returns error if a Polarion query fails or a lookup is ambiguous.
pub fn execute<S, Q>(command: &MapCommand, store: &mut MappingStore<S, Q>) -> Result<PrepExit>
where
    S: KeyValueStore,
    Q: WorkItemSource,
{
    match command {
        MapCommand::Get { key } => Ok(match store.get(key)? {
            Some(id) => {
                println!("{id}");
                PrepExit::Success
            }
            None => {
                eprintln!("Test case '{key}' does not exist in Polarion");
                PrepExit::NotFound
            }
        }),
        MapCommand::Set { key, value } => {
            store.set(key, value);
            Ok(PrepExit::Success)
        }
        MapCommand::Delete { key } => {
            if store.delete(key).is_none() {
                eprintln!("{}", format!("'{key}' was not mapped").dimmed());
            }
            Ok(PrepExit::Success)
        }
        MapCommand::List => {
            for (key, id) in store.iter() {
                println!("{key}\t{id}");
            }
            Ok(PrepExit::Success)
        }
        MapCommand::Sync { full } => {
            let report = store.sync(*full)?;
            for (key, id) in &report.added {
                println!("Adding '{key}' with ID '{id}'");
            }
            println!(
                "{}",
                format!(
                    "Synced {}: {} added, {} total",
                    store.project(),
                    report.added.len(),
                    store.len()
                )
                .green()
            );
            Ok(PrepExit::Success)
        }
    }
}
