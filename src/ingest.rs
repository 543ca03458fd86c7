//! Snapshot ingestion
//!
//! Wire formats of the four JSON feeds that make up one snapshot, the async
//! loader that reads them, and the sensor normalizer that flattens the
//! per-station sensor collections into one reading per row.

use crate::config::InputConfig;
use crate::error::{LabelerError, Result};
use crate::models::{SensorReading, WeatherStationId};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// =============================================================================
// Wire formats
// =============================================================================

/// Latest sensor values of every weather station
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDataFeed {
    #[serde(default)]
    pub weather_stations: Vec<WeatherStationData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherStationData {
    pub id: Option<WeatherStationId>,
    #[serde(default)]
    pub sensor_values: Vec<RawSensorValue>,
}

/// One sensor value as published; every field may be absent
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSensorValue {
    pub id: Option<u64>,
    pub road_station_id: Option<WeatherStationId>,
    pub old_name: Option<String>,
    pub sensor_value: Option<f64>,
    pub sensor_unit: Option<String>,
    pub sensor_value_description_en: Option<String>,
    pub measured_time: Option<String>,
}

/// GeoJSON feature collection used by both station feeds
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection<P> {
    #[serde(default)]
    pub features: Vec<Feature<P>>,
}

impl<P> Default for FeatureCollection<P> {
    fn default() -> Self {
        Self {
            features: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feature<P> {
    pub id: Option<serde_json::Value>,
    pub geometry: Option<PointGeometry>,
    #[serde(default)]
    pub properties: P,
}

/// Point geometry, coordinates ordered `[longitude, latitude, altitude?]`
#[derive(Debug, Clone, Deserialize)]
pub struct PointGeometry {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherStationProperties {
    pub id: Option<serde_json::Value>,
    pub road_station_id: Option<serde_json::Value>,
    #[serde(default)]
    pub station_sensors: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraStationProperties {
    pub id: Option<String>,
}

pub type WeatherStationFeed = FeatureCollection<WeatherStationProperties>;
pub type CameraStationFeed = FeatureCollection<CameraStationProperties>;

/// Camera stations with their presets and assigned weather station
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraDataFeed {
    #[serde(default)]
    pub camera_stations: Vec<CameraStationData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraStationData {
    pub id: Option<String>,
    pub nearest_weather_station_id: Option<WeatherStationId>,
    #[serde(default)]
    pub camera_presets: Vec<CameraPresetData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraPresetData {
    pub id: Option<String>,
    pub image_url: Option<String>,
    pub measured_time: Option<String>,
}

// =============================================================================
// Snapshot
// =============================================================================

/// The four feeds of one snapshot, parsed but not yet validated
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub weather_data: WeatherDataFeed,
    pub weather_stations: WeatherStationFeed,
    pub camera_data: CameraDataFeed,
    pub camera_stations: CameraStationFeed,
}

impl Snapshot {
    /// Read and parse the four snapshot files from `dir` concurrently
    pub async fn load(dir: &Path, files: &InputConfig) -> Result<Self> {
        info!("Loading snapshot from {}", dir.display());

        let (weather_data, weather_stations, camera_data, camera_stations) = tokio::try_join!(
            read_json::<WeatherDataFeed>(dir.join(&files.weather_data)),
            read_json::<WeatherStationFeed>(dir.join(&files.weather_stations)),
            read_json::<CameraDataFeed>(dir.join(&files.camera_data)),
            read_json::<CameraStationFeed>(dir.join(&files.camera_stations)),
        )?;

        debug!(
            "Snapshot loaded: {} sensor stations, {} weather station features, {} camera stations, {} camera station features",
            weather_data.weather_stations.len(),
            weather_stations.features.len(),
            camera_data.camera_stations.len(),
            camera_stations.features.len()
        );

        Ok(Self {
            weather_data,
            weather_stations,
            camera_data,
            camera_stations,
        })
    }
}

async fn read_json<T: DeserializeOwned>(path: PathBuf) -> Result<T> {
    let bytes = tokio::fs::read(&path).await?;
    serde_json::from_slice(&bytes).map_err(|source| LabelerError::Json { path, source })
}

// =============================================================================
// Sensor normalization
// =============================================================================

/// Parse a feed timestamp
///
/// RFC 3339 is expected; a timestamp without offset is taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed);
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Flatten the per-station sensor collections into readings sorted by time
///
/// Nothing is dropped or deduplicated. Equal timestamps keep feed order.
///
/// # Errors
/// * `MalformedInput` when a sensor id, station id or timestamp is absent or unparsable
pub fn normalize_sensor_values(feed: &WeatherDataFeed) -> Result<Vec<SensorReading>> {
    let mut readings = Vec::new();

    for station in &feed.weather_stations {
        for raw in &station.sensor_values {
            readings.push(normalize_one(station.id, raw)?);
        }
    }

    readings.sort_by_key(|reading| reading.measured_time);

    debug!(
        "Normalized {} sensor readings from {} stations",
        readings.len(),
        feed.weather_stations.len()
    );

    Ok(readings)
}

fn normalize_one(
    owning_station: Option<WeatherStationId>,
    raw: &RawSensorValue,
) -> Result<SensorReading> {
    let context = || {
        format!(
            "sensor value {} of station {}",
            raw.id.map_or_else(|| "?".to_string(), |id| id.to_string()),
            owning_station.map_or_else(|| "?".to_string(), |id| id.to_string())
        )
    };

    let sensor_id = raw
        .id
        .ok_or_else(|| LabelerError::malformed(context(), "missing sensor id"))?;
    let station_id = raw
        .road_station_id
        .or(owning_station)
        .ok_or_else(|| LabelerError::malformed(context(), "missing station id"))?;
    let time_text = raw
        .measured_time
        .as_deref()
        .ok_or_else(|| LabelerError::malformed(context(), "missing measuredTime"))?;
    let measured_time = parse_timestamp(time_text).ok_or_else(|| {
        LabelerError::malformed(context(), format!("unparsable measuredTime '{}'", time_text))
    })?;

    Ok(SensorReading {
        sensor_id,
        station_id,
        role: raw.old_name.clone().unwrap_or_default(),
        value: raw.sensor_value,
        unit: raw.sensor_unit.clone(),
        description: raw.sensor_value_description_en.clone(),
        measured_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEATHER_DATA: &str = r#"{
        "weatherStations": [
            {
                "id": 1001,
                "sensorValues": [
                    {
                        "id": 1,
                        "roadStationId": 1001,
                        "oldName": "roadsurfaceconditions1",
                        "sensorValue": 1.0,
                        "sensorUnit": "***",
                        "sensorValueDescriptionEn": "Dry",
                        "measuredTime": "2021-03-04T10:15:00Z"
                    },
                    {
                        "id": 2,
                        "oldName": "precipitationtype",
                        "sensorValue": 0.0,
                        "measuredTime": "2021-03-04T10:05:00+02:00"
                    }
                ]
            },
            {
                "id": 1002,
                "sensorValues": [
                    {
                        "id": 3,
                        "roadStationId": 1002,
                        "oldName": "roadsurfaceconditions2",
                        "sensorValueDescriptionEn": "Wet",
                        "measuredTime": "2021-03-04T09:00:00Z"
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_normalize_flattens_and_sorts_by_time() {
        let feed: WeatherDataFeed = serde_json::from_str(WEATHER_DATA).unwrap();
        let readings = normalize_sensor_values(&feed).unwrap();

        assert_eq!(readings.len(), 3);
        // 10:05+02:00 is 08:05Z, the earliest instant
        assert_eq!(readings[0].sensor_id, 2);
        assert_eq!(readings[0].station_id, 1001);
        assert_eq!(readings[0].description, None);
        assert_eq!(readings[1].sensor_id, 3);
        assert_eq!(readings[2].sensor_id, 1);
        assert_eq!(readings[2].role, "roadsurfaceconditions1");
        assert_eq!(readings[2].value, Some(1.0));
    }

    #[test]
    fn test_unparsable_timestamp_is_fatal() {
        let feed = WeatherDataFeed {
            weather_stations: vec![WeatherStationData {
                id: Some(1),
                sensor_values: vec![RawSensorValue {
                    id: Some(7),
                    measured_time: Some("yesterday".to_string()),
                    ..Default::default()
                }],
            }],
        };

        let result = normalize_sensor_values(&feed);
        assert!(matches!(result, Err(LabelerError::MalformedInput { .. })));
    }

    #[test]
    fn test_missing_timestamp_is_fatal() {
        let feed = WeatherDataFeed {
            weather_stations: vec![WeatherStationData {
                id: Some(1),
                sensor_values: vec![RawSensorValue {
                    id: Some(7),
                    ..Default::default()
                }],
            }],
        };

        assert!(normalize_sensor_values(&feed).is_err());
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let with_offset = parse_timestamp("2021-03-04T10:15:00+02:00").unwrap();
        assert_eq!(with_offset.offset().local_minus_utc(), 7200);

        let naive = parse_timestamp("2021-03-04 10:15:00").unwrap();
        assert_eq!(naive.offset().local_minus_utc(), 0);

        assert!(parse_timestamp("2021-13-04T10:15:00Z").is_none());
    }

    #[tokio::test]
    async fn test_snapshot_load_reports_bad_json_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let files = InputConfig::default();
        std::fs::write(dir.path().join(&files.weather_data), WEATHER_DATA).unwrap();
        std::fs::write(dir.path().join(&files.weather_stations), "{\"features\": []}").unwrap();
        std::fs::write(dir.path().join(&files.camera_data), "not json").unwrap();
        std::fs::write(dir.path().join(&files.camera_stations), "{\"features\": []}").unwrap();

        let result = Snapshot::load(dir.path(), &files).await;
        match result {
            Err(LabelerError::Json { path, .. }) => {
                assert!(path.ends_with("camera-data.json"));
            }
            other => panic!("expected JSON error, got {:?}", other),
        }
    }
}
