//! Labeling pipeline over one snapshot
//!
//! Runs the stages in order: sensor normalization, station registry,
//! reconciliation, co-location merging, voting and dataset assembly. The
//! stages themselves are synchronous; only snapshot loading and output
//! writing touch the filesystem.

pub mod writer;

#[cfg(test)]
pub mod tests;

use self::writer::OutputWriter;

use crate::colocation::CoLocationMerger;
use crate::config::LabelerConfig;
use crate::dataset::{DatasetAssembler, referenced_sensor_rows};
use crate::error::Result;
use crate::geo_proximity::GeoProximityMatcher;
use crate::ingest::{Snapshot, normalize_sensor_values};
use crate::labels::ConditionTables;
use crate::models::{ImageRecord, LocatedReading};
use crate::reconcile::ConditionReconciler;
use crate::station_registry::{ProximityReport, StationRegistry};
use crate::voting::ConditionVoter;

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Counters collected while labeling one snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub sensor_readings: usize,
    pub weather_stations: usize,
    pub camera_stations: usize,
    pub co_location_pairs: usize,
    pub condition_records: usize,
    /// Stations where neither road sensor gave a usable reading
    pub no_road_condition: usize,
    /// Stations where neither weather sensor gave a usable reading
    pub no_weather_condition: usize,
    pub camera_presets: usize,
    pub image_rows: usize,
    /// Presets dropped by the inner joins of dataset assembly
    pub join_misses: usize,
    pub unmapped_labels: usize,
    pub undefined_labels: usize,
    pub sensor_rows: usize,
    pub processing_time_ms: u128,
}

/// Output of one labeling run
#[derive(Debug, Clone, Default)]
pub struct LabeledDataset {
    pub images: Vec<ImageRecord>,
    /// Readings of the weather stations referenced by `images`, with coordinates
    pub sensors: Vec<LocatedReading>,
    pub stats: PipelineStats,
}

/// Files written by [`LabelingPipeline::process`]
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub images_path: PathBuf,
    pub sensors_path: PathBuf,
    pub stats: PipelineStats,
}

/// Labels camera images from one snapshot of sensor and station feeds
#[derive(Debug, Clone)]
pub struct LabelingPipeline {
    config: LabelerConfig,
    tables: ConditionTables,
}

impl LabelingPipeline {
    /// Validate the configuration and build the lookup tables
    pub fn new(config: LabelerConfig) -> Result<Self> {
        let tables = config.validate()?;
        Ok(Self { config, tables })
    }

    pub fn config(&self) -> &LabelerConfig {
        &self.config
    }

    /// Label one snapshot
    ///
    /// Fails without partial output when an input is structurally malformed.
    pub fn run(&self, snapshot: &Snapshot) -> Result<LabeledDataset> {
        let start_time = Instant::now();

        let readings = normalize_sensor_values(&snapshot.weather_data)?;
        let registry = StationRegistry::from_snapshot(snapshot)?;

        let records = ConditionReconciler::new(&self.config.reconcile).reconcile(&readings);
        let merged = CoLocationMerger::new(registry.co_location_pairs()).merge(&records);
        let voted = ConditionVoter::new(&self.tables, &self.config.voting).vote_all(&merged);
        debug_assert_eq!(voted.len(), records.len());

        let (images, assembly) =
            DatasetAssembler::new(&self.tables).assemble(registry.camera_stations(), &voted);
        let sensors = referenced_sensor_rows(&registry.locate_readings(&readings), &images);

        let stats = PipelineStats {
            sensor_readings: readings.len(),
            weather_stations: registry.weather_station_count(),
            camera_stations: registry.camera_station_count(),
            co_location_pairs: registry.co_location_pairs().len(),
            condition_records: records.len(),
            no_road_condition: records.iter().filter(|record| record.road.is_none()).count(),
            no_weather_condition: records
                .iter()
                .filter(|record| record.weather.is_none())
                .count(),
            camera_presets: assembly.presets,
            image_rows: images.len(),
            join_misses: assembly.join_misses(),
            unmapped_labels: assembly.unmapped_labels,
            undefined_labels: assembly.undefined_labels,
            sensor_rows: sensors.len(),
            processing_time_ms: start_time.elapsed().as_millis(),
        };

        info!(
            "Labeled {} images from {} stations in {}ms",
            stats.image_rows, stats.condition_records, stats.processing_time_ms
        );

        Ok(LabeledDataset {
            images,
            sensors,
            stats,
        })
    }

    /// Proximity between camera and weather stations of one snapshot
    pub fn proximity_report(&self, snapshot: &Snapshot) -> Result<ProximityReport> {
        let registry = StationRegistry::from_snapshot(snapshot)?;
        let matcher = GeoProximityMatcher::new(self.config.proximity.radius_m);
        registry.proximity_report(&matcher)
    }

    /// Load a snapshot from `input_dir`, label it and write both tables to `output_dir`
    pub async fn process(&self, input_dir: &Path, output_dir: &Path) -> Result<ProcessOutput> {
        let snapshot = Snapshot::load(input_dir, &self.config.input).await?;
        let dataset = self.run(&snapshot)?;

        let writer = OutputWriter::new(output_dir, self.config.output.clone());
        let (images_path, sensors_path) = writer.write_dataset(&dataset.images, &dataset.sensors)?;
        debug!(
            "Output written to {} and {}",
            images_path.display(),
            sensors_path.display()
        );

        Ok(ProcessOutput {
            images_path,
            sensors_path,
            stats: dataset.stats,
        })
    }
}
