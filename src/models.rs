//! Core data structures for one labeling pass.
//!
//! Every entity here is produced from a single snapshot and never mutated
//! across snapshots. Identifiers follow the upstream feeds: weather stations
//! carry numeric ids, camera stations and presets carry string ids.

use crate::labels::{Candidates, WeatherCondition};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Numeric identifier of a road weather station
pub type WeatherStationId = u32;

/// WGS84 coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// One reading of one sensor, flattened out of the per-station snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor_id: u64,
    pub station_id: WeatherStationId,
    /// Physical role of the sensor, e.g. `roadsurfaceconditions1`
    pub role: String,
    pub value: Option<f64>,
    pub unit: Option<String>,
    /// Human readable condition or the fault marker
    pub description: Option<String>,
    pub measured_time: DateTime<FixedOffset>,
}

/// Road weather station with its location and attached sensors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherStation {
    pub id: WeatherStationId,
    pub location: GeoPoint,
    pub sensors: Vec<String>,
}

/// One camera preset (a fixed camera direction) of a camera station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraPreset {
    pub id: String,
    pub image_url: Option<String>,
    /// Capture time of the preset's latest image
    pub measured_time: Option<DateTime<FixedOffset>>,
}

/// Roadside camera station
///
/// The nearest weather station is assigned upstream and only read here.
/// Stations absent from the location feed have no location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraStation {
    pub id: String,
    pub location: Option<GeoPoint>,
    pub presets: Vec<CameraPreset>,
    pub nearest_weather_station_id: Option<WeatherStationId>,
}

impl CameraStation {
    /// Preset ids in feed order
    pub fn preset_ids(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|preset| preset.id.as_str())
    }
}

/// Two distinct weather stations sharing one exact coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoLocationPair {
    pub first: WeatherStationId,
    pub second: WeatherStationId,
}

impl CoLocationPair {
    pub fn new(first: WeatherStationId, second: WeatherStationId) -> Self {
        Self { first, second }
    }
}

/// Reconciled readings of one weather station
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionRecord {
    /// Join key used by the merger and the dataset assembler
    pub nearest_weather_station_id: WeatherStationId,
    pub road: Option<Candidates>,
    pub weather: Option<Candidates>,
    /// Latest measurement time among the readings that produced `road` or `weather`
    pub measured_time: Option<DateTime<FixedOffset>>,
}

/// Condition record after the co-located partner's road reading was folded in
#[derive(Debug, Clone, PartialEq)]
pub struct MergedConditionRecord {
    pub nearest_weather_station_id: WeatherStationId,
    /// Reconciled road reading of the co-located partner, if any
    pub partner_road: Option<Candidates>,
    /// Own road reading followed by the partner's; sole input to road voting
    pub road_candidates: Option<Candidates>,
    pub weather: Option<Candidates>,
    pub measured_time: Option<DateTime<FixedOffset>>,
}

/// Final labels of one weather station
#[derive(Debug, Clone, PartialEq)]
pub struct VotedConditionRecord {
    pub nearest_weather_station_id: WeatherStationId,
    /// Winning road token; may lie outside the road enumeration
    pub road: Option<String>,
    pub weather: Option<WeatherCondition>,
    pub measured_time: Option<DateTime<FixedOffset>>,
}

/// One labeled camera image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub camera_preset_id: String,
    pub camera_station_id: String,
    pub nearest_weather_station_id: WeatherStationId,
    pub image_url: Option<String>,
    pub road_condition: String,
    pub weather_condition: String,
    /// Capture time of the image, else the station's measurement time, as RFC 3339
    pub measured_time: String,
    pub image_name: String,
}

/// A sensor reading joined to its station's coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatedReading {
    pub reading: SensorReading,
    pub location: GeoPoint,
}
