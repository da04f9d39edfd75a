use clap::Parser;
use colored::Colorize;
use polarion_prep_core::cli::{handlers, MapCli};
use polarion_prep_core::exit::PrepExit;
use polarion_prep_core::logging;

fn main() -> PrepExit {
    let cli = MapCli::parse();
    logging::init(cli.verbose);

    match handlers::handle_map(&cli) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red());
            PrepExit::Error
        }
    }
}
