//! CLI argument definitions using clap.

use std::path::PathBuf;

use assay::Severity;
use clap::{Parser, Subcommand};

/// Assay: analysis context startup for tabular datasets
#[derive(Parser)]
#[command(name = "assay")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run startup and show the resulting analysis context
    Inspect {
        /// Path to the analysis config (JSON)
        #[arg(short, long, value_name = "CONFIG")]
        config: PathBuf,

        /// Output directory (default: the config's output_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Log level: debug, info, warning, error, critical or 10..50
        #[arg(short, long, default_value = "warning", value_parser = parse_level)]
        log_level: Severity,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that a config and its dataset load, without keeping a context
    Validate {
        /// Path to the analysis config (JSON)
        #[arg(short, long, value_name = "CONFIG")]
        config: PathBuf,
    },
}

fn parse_level(s: &str) -> Result<Severity, String> {
    s.parse().map_err(|e: assay::AssayError| e.to_string())
}
