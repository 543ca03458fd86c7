//! Configuration management and validation.
//!
//! Every table the pipeline depends on (sensor roles, text normalization,
//! severity weights, proximity radius) is carried here with defaults that
//! reproduce the production behaviour. A TOML file may override any part.

use crate::constants::{
    BARE_PRECIPITATION, CONFIG_DIR_NAME, CONFIG_FILE_NAME, DESCRIPTION_ALIASES,
    FAULT_MARKER, INTENSITY_WORDS, PROXIMITY_RADIUS_M, RARE_PRECIPITATION, WEATHER_REMAPPINGS,
    input_files, output_files, sensor_roles,
};
use crate::error::{LabelerError, Result};
use crate::labels::{ConditionLabel, ConditionTables, RoadCondition, SeverityTable, WeatherCondition};
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Global configuration for one labeling run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelerConfig {
    /// Snapshot file names
    pub input: InputConfig,

    /// Per-station reconciliation of redundant sensors
    pub reconcile: ReconcileConfig,

    /// Voting tables and weather text normalization
    pub voting: VotingConfig,

    /// Station proximity matching
    pub proximity: ProximityConfig,

    /// Output tables
    pub output: OutputConfig,
}

/// File names of the four snapshot inputs, relative to the input directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub weather_data: String,
    pub weather_stations: String,
    pub camera_data: String,
    pub camera_stations: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            weather_data: input_files::WEATHER_DATA.to_string(),
            weather_stations: input_files::WEATHER_STATIONS.to_string(),
            camera_data: input_files::CAMERA_DATA.to_string(),
            camera_stations: input_files::CAMERA_STATIONS.to_string(),
        }
    }
}

/// The two redundant sensors measuring one quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePair {
    pub primary: String,
    pub secondary: String,
}

impl RolePair {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }
}

/// A literal text replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextReplacement {
    pub from: String,
    pub to: String,
}

impl TextReplacement {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

fn replacements(pairs: &[(&str, &str)]) -> Vec<TextReplacement> {
    pairs
        .iter()
        .map(|(from, to)| TextReplacement::new(*from, *to))
        .collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Reconciliation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Road surface sensors
    pub road_roles: RolePair,

    /// Precipitation sensors
    pub weather_roles: RolePair,

    /// Roles never used as a condition source
    pub excluded_roles: Vec<String>,

    /// Description of a malfunctioning sensor
    pub fault_marker: String,

    /// Exact description replacements applied before reconciliation
    pub description_aliases: Vec<TextReplacement>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            road_roles: RolePair::new(
                sensor_roles::ROAD_SURFACE_PRIMARY,
                sensor_roles::ROAD_SURFACE_SECONDARY,
            ),
            weather_roles: RolePair::new(
                sensor_roles::PRECIPITATION_TYPE,
                sensor_roles::PRECIPITATION,
            ),
            excluded_roles: strings(sensor_roles::EXCLUDED),
            fault_marker: FAULT_MARKER.to_string(),
            description_aliases: replacements(DESCRIPTION_ALIASES),
        }
    }
}

/// Voting settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VotingConfig {
    /// Road label to severity weight
    pub road_severity: BTreeMap<String, f64>,

    /// Weather label to severity weight
    pub weather_severity: BTreeMap<String, f64>,

    /// Substring remappings applied in order to weather readings
    pub weather_remappings: Vec<TextReplacement>,

    /// Bare intensity words completed with " rain" when reported second
    pub intensity_words: Vec<String>,

    /// Rare precipitation descriptors folded into `snow_sleet_token`
    pub rare_precipitation: Vec<String>,

    /// Token that rare descriptors are folded into
    pub snow_sleet_token: String,

    /// Single tokens promoted to their "Weak" category
    pub bare_precipitation: Vec<String>,
}

fn severity_map<L: ConditionLabel>() -> BTreeMap<String, f64> {
    L::ALL
        .iter()
        .map(|label| (label.label().to_string(), label.default_severity()))
        .collect()
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            road_severity: severity_map::<RoadCondition>(),
            weather_severity: severity_map::<WeatherCondition>(),
            weather_remappings: replacements(WEATHER_REMAPPINGS),
            intensity_words: strings(INTENSITY_WORDS),
            rare_precipitation: strings(RARE_PRECIPITATION),
            snow_sleet_token: "snow/sleet".to_string(),
            bare_precipitation: strings(BARE_PRECIPITATION),
        }
    }
}

impl VotingConfig {
    /// Convert the severity maps into typed, total tables
    pub fn condition_tables(&self) -> Result<ConditionTables> {
        Ok(ConditionTables {
            road: SeverityTable::from_labels(
                self.road_severity.iter().map(|(label, weight)| (label.as_str(), *weight)),
            )?,
            weather: SeverityTable::from_labels(
                self.weather_severity
                    .iter()
                    .map(|(label, weight)| (label.as_str(), *weight)),
            )?,
        })
    }
}

/// Proximity matching settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Inclusive geodesic radius in metres
    pub radius_m: f64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            radius_m: PROXIMITY_RADIUS_M,
        }
    }
}

/// Supported table formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Parquet,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Parquet => "parquet",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Parquet compression codecs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    #[default]
    Snappy,
    Zstd,
    Lz4,
    Uncompressed,
}

impl CompressionAlgorithm {
    pub fn to_polars_compression(self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

/// Output table settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Only used for Parquet output
    pub compression: CompressionAlgorithm,
    pub images_stem: String,
    pub sensors_stem: String,
    pub proximity_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            compression: CompressionAlgorithm::default(),
            images_stem: output_files::IMAGES.to_string(),
            sensors_stem: output_files::SENSORS.to_string(),
            proximity_file: output_files::PROXIMITY.to_string(),
        }
    }
}

impl LabelerConfig {
    /// Location of the user configuration file, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the user configuration file
    /// is used when present and the built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path().filter(|candidate| candidate.exists()) {
                Some(path) => path,
                None => {
                    debug!("No configuration file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        debug!("Loading configuration from {}", path.display());
        let contents = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text; absent sections keep their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Check the configuration and build the typed lookup tables
    pub fn validate(&self) -> Result<ConditionTables> {
        if !(self.proximity.radius_m.is_finite() && self.proximity.radius_m > 0.0) {
            return Err(LabelerError::configuration(format!(
                "proximity radius must be a positive number of metres, got {}",
                self.proximity.radius_m
            )));
        }

        for roles in [&self.reconcile.road_roles, &self.reconcile.weather_roles] {
            if roles.primary.is_empty() || roles.secondary.is_empty() {
                return Err(LabelerError::configuration("sensor role names must not be empty"));
            }
            if self.reconcile.excluded_roles.contains(&roles.primary)
                || self.reconcile.excluded_roles.contains(&roles.secondary)
            {
                return Err(LabelerError::configuration(format!(
                    "role pair {}/{} overlaps the excluded roles",
                    roles.primary, roles.secondary
                )));
            }
        }

        if self
            .voting
            .weather_remappings
            .iter()
            .chain(&self.reconcile.description_aliases)
            .any(|replacement| replacement.from.is_empty())
        {
            return Err(LabelerError::configuration("text replacements need a non-empty 'from'"));
        }

        self.voting.condition_tables()
    }

    /// Override the proximity radius
    pub fn with_radius(mut self, radius_m: f64) -> Self {
        self.proximity.radius_m = radius_m;
        self
    }

    /// Override the output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output.format = format;
        self
    }
}
