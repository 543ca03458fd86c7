//! Output writing for labeled datasets
//!
//! Converts image rows and located sensor readings into polars DataFrames and
//! writes them as Parquet or CSV. Both tables are staged next to their final
//! paths and only moved into place once both are complete. The proximity
//! report is written as JSON.

use crate::config::{OutputConfig, OutputFormat};
use crate::error::{LabelerError, Result};
use crate::models::{ImageRecord, LocatedReading};
use crate::station_registry::ProximityReport;

use polars::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Image table, one row per labeled camera preset
pub fn images_frame(images: &[ImageRecord]) -> Result<DataFrame> {
    let frame = df!(
        "camera_preset_id" => images.iter().map(|row| row.camera_preset_id.clone()).collect::<Vec<_>>(),
        "camera_station_id" => images.iter().map(|row| row.camera_station_id.clone()).collect::<Vec<_>>(),
        "nearest_weather_station_id" => images.iter().map(|row| row.nearest_weather_station_id).collect::<Vec<u32>>(),
        "image_url" => images.iter().map(|row| row.image_url.clone()).collect::<Vec<Option<String>>>(),
        "road_condition" => images.iter().map(|row| row.road_condition.clone()).collect::<Vec<_>>(),
        "weather_condition" => images.iter().map(|row| row.weather_condition.clone()).collect::<Vec<_>>(),
        "measured_time" => images.iter().map(|row| row.measured_time.clone()).collect::<Vec<_>>(),
        "image_name" => images.iter().map(|row| row.image_name.clone()).collect::<Vec<_>>(),
    )?;
    Ok(frame)
}

/// Sensor table with station coordinates; times are UTC milliseconds
pub fn sensors_frame(rows: &[LocatedReading]) -> Result<DataFrame> {
    let measured_time = Column::new(
        "measured_time".into(),
        rows.iter()
            .map(|row| row.reading.measured_time.timestamp_millis())
            .collect::<Vec<i64>>(),
    )
    .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

    let mut frame = df!(
        "station_id" => rows.iter().map(|row| row.reading.station_id).collect::<Vec<u32>>(),
        "sensor_id" => rows.iter().map(|row| row.reading.sensor_id).collect::<Vec<u64>>(),
        "role" => rows.iter().map(|row| row.reading.role.clone()).collect::<Vec<_>>(),
        "value" => rows.iter().map(|row| row.reading.value).collect::<Vec<Option<f64>>>(),
        "unit" => rows.iter().map(|row| row.reading.unit.clone()).collect::<Vec<Option<String>>>(),
        "description" => rows.iter().map(|row| row.reading.description.clone()).collect::<Vec<Option<String>>>(),
        "latitude" => rows.iter().map(|row| row.location.latitude).collect::<Vec<f64>>(),
        "longitude" => rows.iter().map(|row| row.location.longitude).collect::<Vec<f64>>(),
    )?;
    frame.with_column(measured_time)?;
    Ok(frame)
}

/// Writes the output tables of one run into a directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    output_dir: PathBuf,
    config: OutputConfig,
}

impl OutputWriter {
    pub fn new(output_dir: impl Into<PathBuf>, config: OutputConfig) -> Self {
        Self {
            output_dir: output_dir.into(),
            config,
        }
    }

    pub fn images_path(&self) -> PathBuf {
        self.table_path(&self.config.images_stem)
    }

    pub fn sensors_path(&self) -> PathBuf {
        self.table_path(&self.config.sensors_stem)
    }

    fn table_path(&self, stem: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", stem, self.config.format.extension()))
    }

    /// Write both tables, returning the image and sensor table paths
    ///
    /// Either both tables end up at their paths or neither does: a failed
    /// write leaves no table of this run behind.
    pub fn write_dataset(
        &self,
        images: &[ImageRecord],
        sensors: &[LocatedReading],
    ) -> Result<(PathBuf, PathBuf)> {
        let mut images = images_frame(images)?;
        let mut sensors = sensors_frame(sensors)?;

        std::fs::create_dir_all(&self.output_dir)?;
        let staged_images = self.stage_frame(&mut images)?;
        let staged_sensors = self.stage_frame(&mut sensors)?;

        let images_path = self.images_path();
        let sensors_path = self.sensors_path();
        staged_images
            .persist(&images_path)
            .map_err(|error| error.error)?;
        if let Err(error) = staged_sensors.persist(&sensors_path) {
            if let Err(cleanup) = std::fs::remove_file(&images_path) {
                warn!("Could not remove {}: {}", images_path.display(), cleanup);
            }
            return Err(error.error.into());
        }

        info!("Wrote {} rows to {}", images.height(), images_path.display());
        info!("Wrote {} rows to {}", sensors.height(), sensors_path.display());
        Ok((images_path, sensors_path))
    }

    /// Write `frame` to a hidden temporary file in the output directory
    fn stage_frame(&self, frame: &mut DataFrame) -> Result<NamedTempFile> {
        let mut staged = tempfile::Builder::new()
            .prefix(".")
            .suffix(".partial")
            .tempfile_in(&self.output_dir)?;

        match self.config.format {
            OutputFormat::Parquet => {
                ParquetWriter::new(staged.as_file_mut())
                    .with_compression(self.config.compression.to_polars_compression())
                    .finish(frame)?;
            }
            OutputFormat::Csv => {
                CsvWriter::new(staged.as_file_mut())
                    .include_header(true)
                    .finish(frame)?;
            }
        }

        debug!("Staged {} rows in {}", frame.height(), staged.path().display());
        Ok(staged)
    }
}

/// Write the proximity report as pretty-printed JSON
pub fn write_proximity_report(report: &ProximityReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report).map_err(|source| LabelerError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json)?;
    debug!(
        "Proximity report for {} cameras and {} weather stations written to {}",
        report.cameras.len(),
        report.weather_stations.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::parse_timestamp;
    use crate::models::{GeoPoint, SensorReading};
    use std::fs::File;
    use tempfile::TempDir;

    fn image(preset: &str, station: u32) -> ImageRecord {
        ImageRecord {
            camera_preset_id: preset.to_string(),
            camera_station_id: "C01".to_string(),
            nearest_weather_station_id: station,
            image_url: None,
            road_condition: "Dry".to_string(),
            weather_condition: "Clear".to_string(),
            measured_time: "2021-03-04T10:15:00+00:00".to_string(),
            image_name: format!("{}_r0_w0_2021-03-04_10-15-00", preset),
        }
    }

    fn located(station: u32, description: Option<&str>) -> LocatedReading {
        LocatedReading {
            reading: SensorReading {
                sensor_id: 16,
                station_id: station,
                role: "roadsurfaceconditions1".to_string(),
                value: None,
                unit: None,
                description: description.map(str::to_string),
                measured_time: parse_timestamp("2021-03-04T12:15:00+02:00").unwrap(),
            },
            location: GeoPoint::new(60.2, 24.9),
        }
    }

    #[test]
    fn test_images_frame_columns() {
        let frame = images_frame(&[image("C0100101", 1), image("C0100102", 1)]).unwrap();
        assert_eq!(frame.height(), 2);
        assert_eq!(
            frame.get_column_names_str(),
            [
                "camera_preset_id",
                "camera_station_id",
                "nearest_weather_station_id",
                "image_url",
                "road_condition",
                "weather_condition",
                "measured_time",
                "image_name"
            ]
        );
        assert_eq!(frame.column("image_url").unwrap().null_count(), 2);
    }

    #[test]
    fn test_sensors_frame_time_is_utc_datetime() {
        let frame = sensors_frame(&[located(1, Some("Dry")), located(2, None)]).unwrap();
        let time = frame.column("measured_time").unwrap();
        assert_eq!(time.dtype(), &DataType::Datetime(TimeUnit::Milliseconds, None));
        assert_eq!(frame.column("description").unwrap().null_count(), 1);
    }

    #[test]
    fn test_empty_tables_still_have_schema() {
        let frame = images_frame(&[]).unwrap();
        assert_eq!(frame.height(), 0);
        assert_eq!(frame.width(), 8);
    }

    #[test]
    fn test_write_parquet_and_read_back() {
        let dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(dir.path(), OutputConfig::default());

        let (path, sensors_path) = writer.write_dataset(&[image("C0100101", 1)], &[]).unwrap();
        assert_eq!(path, dir.path().join("images_database.parquet"));
        assert_eq!(sensors_path, dir.path().join("sensors_data.parquet"));

        let frame = ParquetReader::new(File::open(&path).unwrap()).finish().unwrap();
        assert_eq!(frame.height(), 1);
        let names = frame.column("image_name").unwrap().str().unwrap().get(0);
        assert_eq!(names, Some("C0100101_r0_w0_2021-03-04_10-15-00"));
    }

    #[test]
    fn test_write_csv() {
        let dir = TempDir::new().unwrap();
        let config = OutputConfig {
            format: OutputFormat::Csv,
            ..OutputConfig::default()
        };
        let writer = OutputWriter::new(dir.path().join("nested"), config);

        let (_, path) = writer.write_dataset(&[], &[located(1, Some("Dry"))]).unwrap();
        assert_eq!(path.file_name().unwrap(), "sensors_data.csv");

        let text = std::fs::read_to_string(&path).unwrap();
        let header = text.lines().next().unwrap();
        assert!(header.starts_with("station_id,sensor_id,role"));
        assert!(header.ends_with("measured_time"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_failed_write_leaves_no_table_behind() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sensors_data.parquet")).unwrap();
        let writer = OutputWriter::new(dir.path(), OutputConfig::default());

        let result = writer.write_dataset(&[image("C0100101", 1)], &[located(1, Some("Dry"))]);
        assert!(result.is_err());
        assert!(!writer.images_path().exists());

        // Only the blocking directory remains, no staged files
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, ["sensors_data.parquet"]);
    }

    #[test]
    fn test_rewrite_replaces_previous_tables() {
        let dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(dir.path(), OutputConfig::default());
        writer.write_dataset(&[image("C0100101", 1)], &[]).unwrap();
        let (path, _) = writer
            .write_dataset(&[image("C0100101", 1), image("C0100102", 1)], &[])
            .unwrap();

        let frame = ParquetReader::new(File::open(&path).unwrap()).finish().unwrap();
        assert_eq!(frame.height(), 2);
    }

    #[test]
    fn test_write_proximity_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stations_proximity.json");
        let report = ProximityReport {
            radius_m: 200.0,
            cameras: Vec::new(),
            weather_stations: Vec::new(),
        };

        write_proximity_report(&report, &path).unwrap();

        let parsed: ProximityReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, report);
    }
}
