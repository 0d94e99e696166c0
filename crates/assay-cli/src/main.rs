//! Assay CLI - start an analysis context and report on it.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect {
            config,
            output,
            log_level,
            json,
        } => commands::inspect::run(config, output, log_level, json, cli.verbose),

        Commands::Validate { config } => commands::validate::run(config, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
