//! Command-line argument definitions for the road camera labeler
//!
//! Defines the CLI interface using the clap derive API: a `label` command
//! that writes the labeled image and sensor tables, and a `proximity` command
//! that writes the station proximity report.

use crate::config::OutputFormat;
use crate::error::{LabelerError, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// CLI arguments for the road camera labeler
///
/// Reconciles redundant road weather sensors into one road and weather
/// condition per site and labels every roadside camera image with it.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "roadcam-labeler",
    version,
    about = "Label roadside camera images with reconciled road and weather conditions",
    long_about = "Reads one snapshot of road weather sensor values, weather station and camera \
                  station metadata, reconciles the redundant sensors of every station, votes one \
                  road and one weather condition per site and attaches it to every camera preset \
                  whose nearest weather station is that site."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Label camera images from a snapshot and write the output tables
    Label(LabelArgs),
    /// Report camera and weather stations within a radius of each other
    Proximity(ProximityArgs),
}

/// Logging flags shared by every command
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct LoggingArgs {
    /// Increase logging verbosity
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: debug, -vv: trace)"
    )]
    pub verbose: u8,

    /// Only show warnings and errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Only show warnings and errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl LoggingArgs {
    /// Get the log level based on verbosity settings
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}

/// Arguments for the label command
#[derive(Debug, Clone, Parser)]
pub struct LabelArgs {
    /// Directory holding the four snapshot JSON files
    #[arg(short = 'i', long = "input", value_name = "DIR")]
    pub input_path: PathBuf,

    /// Directory the image and sensor tables are written to
    ///
    /// Created if it does not exist.
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_path: PathBuf,

    /// Table format, overriding the configuration file
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration file (TOML)
    ///
    /// Defaults to the user configuration file when present.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

/// Arguments for the proximity command
#[derive(Debug, Clone, Parser)]
pub struct ProximityArgs {
    /// Directory holding the four snapshot JSON files
    #[arg(short = 'i', long = "input", value_name = "DIR")]
    pub input_path: PathBuf,

    /// Report file; defaults to the configured proximity file in the current directory
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Matching radius in metres, overriding the configuration file
    #[arg(short = 'r', long = "radius", value_name = "METRES")]
    pub radius_m: Option<f64>,

    /// Configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

fn validate_input_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(LabelerError::configuration(format!(
            "Input directory does not exist: {}",
            path.display()
        )));
    }
    Ok(())
}

impl LabelArgs {
    /// Validate the label command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        validate_input_dir(&self.input_path)?;
        if self.output_path.is_file() {
            return Err(LabelerError::configuration(format!(
                "Output path is a file, expected a directory: {}",
                self.output_path.display()
            )));
        }
        Ok(())
    }
}

impl ProximityArgs {
    /// Validate the proximity command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        validate_input_dir(&self.input_path)?;
        if let Some(radius) = self.radius_m {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(LabelerError::configuration(format!(
                    "Radius must be a positive number of metres, got {}",
                    radius
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_label_command() {
        let args = Args::try_parse_from([
            "roadcam-labeler",
            "label",
            "--input",
            "snapshot",
            "--output",
            "out",
            "--format",
            "csv",
            "-v",
        ])
        .unwrap();

        match args.command {
            Some(Commands::Label(label)) => {
                assert_eq!(label.input_path, PathBuf::from("snapshot"));
                assert_eq!(label.output_path, PathBuf::from("out"));
                assert_eq!(label.format, Some(OutputFormat::Csv));
                assert_eq!(label.logging.get_log_level(), "debug");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_proximity_command() {
        let args =
            Args::try_parse_from(["roadcam-labeler", "proximity", "-i", "snapshot", "-r", "150"])
                .unwrap();

        match args.command {
            Some(Commands::Proximity(proximity)) => {
                assert_eq!(proximity.radius_m, Some(150.0));
                assert_eq!(proximity.output_path, None);
                assert_eq!(proximity.logging.get_log_level(), "info");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Args::try_parse_from([
            "roadcam-labeler",
            "label",
            "-i",
            "a",
            "-o",
            "b",
            "-q",
            "-v",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_label_requires_paths() {
        assert!(Args::try_parse_from(["roadcam-labeler", "label", "-i", "a"]).is_err());
    }

    #[test]
    fn test_validation() {
        let dir = TempDir::new().unwrap();
        let label = LabelArgs {
            input_path: dir.path().to_path_buf(),
            output_path: dir.path().join("out"),
            format: None,
            config_file: None,
            logging: LoggingArgs::default(),
        };
        assert!(label.validate().is_ok());

        let missing = LabelArgs {
            input_path: dir.path().join("missing"),
            ..label.clone()
        };
        assert!(missing.validate().is_err());

        let proximity = ProximityArgs {
            input_path: dir.path().to_path_buf(),
            output_path: None,
            radius_m: Some(-5.0),
            config_file: None,
            logging: LoggingArgs::default(),
        };
        assert!(proximity.validate().is_err());
    }
}
