//! Road Camera Labeler Library
//!
//! Turns one snapshot of road weather sensor values and station metadata into
//! a labeled dataset of roadside camera images.
//!
//! This library provides tools for:
//! - Flattening per-station sensor collections into time-ordered readings
//! - Reconciling the two redundant sensors of each station into one reading
//! - Merging road readings of weather stations that share one site
//! - Voting one road and one weather condition per station
//! - Joining camera presets to the voted conditions with deterministic image names
//! - Geodesic proximity matching between camera and weather stations
//! - Writing the labeled tables as Parquet or CSV

pub mod colocation;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod geo_proximity;
pub mod ingest;
pub mod labels;
pub mod models;
pub mod processor;
pub mod reconcile;
pub mod station_registry;
pub mod voting;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::LabelerConfig;
pub use error::{LabelerError, Result};
pub use ingest::Snapshot;
pub use labels::{Candidates, ConditionTables, RoadCondition, WeatherCondition};
pub use models::ImageRecord;
pub use processor::{LabeledDataset, LabelingPipeline, PipelineStats};
