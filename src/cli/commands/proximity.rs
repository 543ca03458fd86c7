//! The `proximity` command

use super::shared::{load_configuration, print_output_file, setup_logging};
use crate::cli::args::ProximityArgs;
use crate::ingest::Snapshot;
use crate::processor::LabelingPipeline;
use crate::processor::writer::write_proximity_report;
use anyhow::Context;
use colored::*;
use std::path::PathBuf;

/// Match camera and weather stations and write the report as JSON
pub async fn run_proximity(args: ProximityArgs) -> anyhow::Result<()> {
    setup_logging(&args.logging)?;
    args.validate()?;

    let mut config = load_configuration(args.config_file.as_deref())
        .context("Failed to load configuration")?;
    if let Some(radius_m) = args.radius_m {
        config = config.with_radius(radius_m);
    }
    let output_path = args
        .output_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.proximity_file));
    let pipeline = LabelingPipeline::new(config).context("Invalid configuration")?;

    let snapshot = Snapshot::load(&args.input_path, &pipeline.config().input)
        .await
        .with_context(|| format!("Failed to load snapshot from {}", args.input_path.display()))?;
    let report = pipeline.proximity_report(&snapshot)?;
    write_proximity_report(&report, &output_path)?;

    let cameras_with_neighbours = report
        .cameras
        .iter()
        .filter(|camera| !camera.weather_stations_nearby.is_empty())
        .count();

    println!("{}", "Station proximity".bright_green().bold());
    println!(
        "  {} {} m",
        "Radius:".bright_cyan(),
        report.radius_m.to_string().bright_white()
    );
    println!(
        "  {} {} of {} located camera stations have a weather station nearby",
        "Cameras:".bright_cyan(),
        cameras_with_neighbours.to_string().bright_white().bold(),
        report.cameras.len()
    );
    print_output_file("Report:", &output_path);

    Ok(())
}
