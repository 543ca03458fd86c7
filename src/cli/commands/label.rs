//! The `label` command

use super::shared::{load_configuration, print_output_file, print_summary, setup_logging};
use crate::cli::args::LabelArgs;
use crate::processor::LabelingPipeline;
use anyhow::Context;
use colored::*;

/// Label one snapshot and write the output tables
pub async fn run_label(args: LabelArgs) -> anyhow::Result<()> {
    setup_logging(&args.logging)?;
    args.validate()?;

    let mut config = load_configuration(args.config_file.as_deref())
        .context("Failed to load configuration")?;
    if let Some(format) = args.format {
        config = config.with_output_format(format);
    }
    let pipeline = LabelingPipeline::new(config).context("Invalid configuration")?;

    println!("{}", "Labeling camera images".bright_green().bold());
    println!("  {} {}", "Snapshot:".bright_cyan(), args.input_path.display());
    println!("  {} {}", "Output:".bright_cyan(), args.output_path.display());

    let output = pipeline
        .process(&args.input_path, &args.output_path)
        .await
        .with_context(|| format!("Failed to label snapshot in {}", args.input_path.display()))?;

    print_summary(&output.stats);
    println!("\n{}", "Output files".bright_green().bold());
    print_output_file("Images:", &output.images_path);
    print_output_file("Sensors:", &output.sensors_path);

    Ok(())
}
