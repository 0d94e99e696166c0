//! Inspect command - run startup and show the active analysis context.

use std::path::PathBuf;

use assay::{AnalysisContext, Severity, Startup};
use colored::Colorize;

pub fn run(
    config: PathBuf,
    output: Option<PathBuf>,
    log_level: Severity,
    json: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut startup = Startup::new(&config).log_level(log_level);
    if let Some(dir) = output {
        startup = startup.output_path(dir);
    }
    let context = startup.run()?;
    context.ensure_output_dir()?;

    let summary = context.summary();

    if json {
        println!("{}", summary.to_json()?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Context".cyan().bold(),
        summary.config_path.display().to_string().white()
    );
    println!("  {:10} {}", "Output:", summary.output_path.display());
    println!("  {:10} {}", "Template:", summary.template.green());
    println!(
        "  {:10} {} rows, {} columns",
        "Data:",
        summary.row_count.to_string().white().bold(),
        summary.column_count.to_string().white().bold()
    );

    if verbose {
        print_dataset_details(&context);
    }

    println!(
        "  {:10} {}",
        "Loaded:",
        summary.loaded_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
    );

    Ok(())
}

fn print_dataset_details(context: &AnalysisContext) {
    let dataset = context.dataset();

    if let Some(source) = dataset.source() {
        println!();
        println!("{}", "Source:".yellow().bold());
        println!("  {:10} {}", "File:", source.file_name());
        println!("  {:10} {}", "Format:", source.format);
        println!("  {:10} {} bytes", "Size:", source.size_bytes);
        println!("  {:10} {}", "Hash:", source.hash.dimmed());
    }

    println!();
    println!("{}", "Columns:".yellow().bold());
    for (index, name) in dataset.headers().enumerate() {
        let filled = dataset.column_values(index).filter(|v| !v.is_empty()).count();
        println!("  {:20} {}/{} filled", name, filled, dataset.row_count());
    }
    println!();
}
