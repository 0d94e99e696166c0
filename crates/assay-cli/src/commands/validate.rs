//! Validate command - check that a config and its dataset load.

use std::path::PathBuf;

use assay::{AnalysisContext, Loader};
use colored::Colorize;

pub fn run(config: PathBuf, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "{} {}",
        "Validating".cyan().bold(),
        config.display().to_string().white()
    );

    // Load without publishing so an active context is never disturbed
    let context = AnalysisContext::load(&Loader::default(), &config, None)?;
    let dataset = context.dataset();

    if verbose {
        println!("  {:10} {}", "Data:", context.config().data().path.display());
        println!("  {:10} {}", "Output:", context.output_path().display());
    }

    println!(
        "{} template {}, {} rows, {} columns",
        "✓".green().bold(),
        context.template().green(),
        dataset.row_count(),
        dataset.column_count()
    );

    Ok(())
}
