use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "merge-xunit",
    version,
    about = "Merge xUnit suite results into a single file for Polarion import"
)]
pub struct MergeCli {
    /// Directory to search for TEST-*.xml files; the merged file is written here
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Parser, Debug)]
#[command(
    name = "polarion-map",
    version,
    about = "Map test case IDs to Polarion work item IDs"
)]
pub struct MapCli {
    /// Polarion project (defaults to polarion.project / POLARION_PROJECT)
    #[arg(long, short)]
    pub project: Option<String>,
    /// Directory holding the per-project mapping stores
    #[arg(long, value_name = "DIR")]
    pub store_dir: Option<PathBuf>,
    #[arg(long, short, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: MapCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum MapCommand {
    /// Print the work item ID for a test case, querying Polarion if needed
    Get { key: String },
    /// Store a work item ID for a test case
    Set { key: String, value: String },
    /// Forget a test case
    Delete { key: String },
    /// Print every stored mapping
    List,
    /// Add every Polarion test case missing from the store
    Sync {
        /// Clear the store first and rebuild it from Polarion
        #[arg(long)]
        full: bool,
    },
}
