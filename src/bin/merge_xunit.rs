use clap::Parser;
use colored::Colorize;
use polarion_prep_core::cli::{handlers, MergeCli};
use polarion_prep_core::exit::PrepExit;
use polarion_prep_core::logging;

fn main() -> PrepExit {
    let cli = MergeCli::parse();
    logging::init(cli.verbose);

    match handlers::handle_merge(&cli) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red());
            PrepExit::Error
        }
    }
}
