//! Shared components for CLI commands
//!
//! Logging setup, configuration loading and summary printing used by both
//! commands.

use crate::cli::args::LoggingArgs;
use crate::config::LabelerConfig;
use crate::error::{LabelerError, Result};
use crate::processor::PipelineStats;
use colored::*;
use std::path::Path;
use tracing::{debug, info};

/// Set up structured logging on stderr
///
/// `RUST_LOG` takes precedence over the command-line verbosity.
pub fn setup_logging(args: &LoggingArgs) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("roadcam_labeler={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| LabelerError::configuration(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration from an explicit file, the user file or the defaults
pub fn load_configuration(config_file: Option<&Path>) -> Result<LabelerConfig> {
    match config_file {
        Some(path) => info!("Using config file: {}", path.display()),
        None => match LabelerConfig::default_path().filter(|path| path.exists()) {
            Some(path) => info!("Using config file: {}", path.display()),
            None => info!("No config file found, using defaults"),
        },
    }
    LabelerConfig::load(config_file)
}

/// Format a byte count in human-readable form
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Print one output file with its size
pub fn print_output_file(label: &str, path: &Path) {
    let size = std::fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);
    println!(
        "  {} {} ({})",
        label.bright_cyan(),
        path.display(),
        format_size(size).bright_white()
    );
}

/// Print the pipeline counters
pub fn print_summary(stats: &PipelineStats) {
    println!("\n{}", "Labeling Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {} readings from {} weather stations ({} co-located pairs)",
        "Sensors:".bright_cyan(),
        stats.sensor_readings.to_string().bright_white(),
        stats.weather_stations.to_string().bright_white(),
        stats.co_location_pairs.to_string().bright_white()
    );
    println!(
        "  {} {} stations, {} without road reading, {} without weather reading",
        "Conditions:".bright_cyan(),
        stats.condition_records.to_string().bright_white(),
        stats.no_road_condition,
        stats.no_weather_condition
    );
    println!(
        "  {} {} of {} presets from {} camera stations",
        "Images:".bright_cyan(),
        stats.image_rows.to_string().bright_white().bold(),
        stats.camera_presets,
        stats.camera_stations
    );
    if stats.join_misses > 0 {
        println!(
            "  {} {} presets without a matching weather station",
            "Dropped:".bright_yellow(),
            stats.join_misses.to_string().bright_yellow().bold()
        );
    }
    if stats.unmapped_labels > 0 {
        println!(
            "  {} {} labels outside the name key enumerations",
            "Unmapped:".bright_yellow(),
            stats.unmapped_labels.to_string().bright_yellow()
        );
    }
    println!(
        "  {} {}",
        "Undefined labels:".bright_cyan(),
        stats.undefined_labels.to_string().bright_white()
    );
}
