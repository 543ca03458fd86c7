//! Building the registry from snapshot feeds
//!
//! Weather stations come from the weather station GeoJSON feed. Camera
//! stations come from the camera data feed and pick up their coordinates from
//! the camera station GeoJSON feed when it lists them.

use super::StationRegistry;
use crate::error::{LabelerError, Result};
use crate::ingest::{
    CameraDataFeed, CameraStationFeed, PointGeometry, Snapshot, WeatherStationFeed, parse_timestamp,
};
use crate::models::{CameraPreset, CameraStation, GeoPoint, WeatherStation, WeatherStationId};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

impl StationRegistry {
    /// Build the registry from the station feeds of a snapshot
    ///
    /// # Errors
    /// * `MalformedInput` if a station lacks an id or usable coordinates
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self> {
        let weather_stations = weather_stations_from_feed(&snapshot.weather_stations)?;
        let camera_stations =
            camera_stations_from_feeds(&snapshot.camera_data, &snapshot.camera_stations)?;

        info!(
            "Loaded {} weather stations and {} camera stations",
            weather_stations.len(),
            camera_stations.len()
        );

        Ok(Self::new(weather_stations, camera_stations))
    }
}

/// Convert the weather station feature collection into stations
pub fn weather_stations_from_feed(feed: &WeatherStationFeed) -> Result<Vec<WeatherStation>> {
    feed.features
        .iter()
        .enumerate()
        .map(|(position, feature)| {
            let id = [
                feature.id.as_ref(),
                feature.properties.id.as_ref(),
                feature.properties.road_station_id.as_ref(),
            ]
            .into_iter()
            .flatten()
            .find_map(station_id_from_value)
            .ok_or_else(|| {
                LabelerError::malformed(
                    format!("weather station feature #{}", position),
                    "missing or non-numeric station id",
                )
            })?;

            let location = parse_location(feature.geometry.as_ref())
                .map_err(|reason| LabelerError::malformed(format!("weather station {}", id), reason))?;

            let sensors = feature
                .properties
                .station_sensors
                .iter()
                .filter_map(sensor_name_from_value)
                .collect();

            Ok(WeatherStation {
                id,
                location,
                sensors,
            })
        })
        .collect()
}

/// Join the camera data feed with the camera station locations
pub fn camera_stations_from_feeds(
    data: &CameraDataFeed,
    locations: &CameraStationFeed,
) -> Result<Vec<CameraStation>> {
    let mut located: HashMap<&str, GeoPoint> = HashMap::new();
    for (position, feature) in locations.features.iter().enumerate() {
        let id = feature.properties.id.as_deref().ok_or_else(|| {
            LabelerError::malformed(
                format!("camera station feature #{}", position),
                "missing camera station id",
            )
        })?;
        let location = parse_location(feature.geometry.as_ref())
            .map_err(|reason| LabelerError::malformed(format!("camera station {}", id), reason))?;
        located.insert(id, location);
    }

    data.camera_stations
        .iter()
        .enumerate()
        .map(|(position, station)| {
            let id = station.id.clone().ok_or_else(|| {
                LabelerError::malformed(
                    format!("camera station #{}", position),
                    "missing camera station id",
                )
            })?;

            let presets = station
                .camera_presets
                .iter()
                .map(|preset| {
                    let preset_id = preset.id.clone().ok_or_else(|| {
                        LabelerError::malformed(format!("camera station {}", id), "preset without id")
                    })?;
                    let measured_time = preset
                        .measured_time
                        .as_deref()
                        .map(|text| {
                            parse_timestamp(text).ok_or_else(|| {
                                LabelerError::malformed(
                                    format!("camera preset {}", preset_id),
                                    format!("unparsable measuredTime '{}'", text),
                                )
                            })
                        })
                        .transpose()?;
                    Ok(CameraPreset {
                        id: preset_id,
                        image_url: preset.image_url.clone(),
                        measured_time,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let location = located.get(id.as_str()).copied();
            if location.is_none() {
                debug!("Camera station {} has no location feature", id);
            }

            Ok(CameraStation {
                location,
                presets,
                nearest_weather_station_id: station.nearest_weather_station_id,
                id,
            })
        })
        .collect()
}

fn parse_location(geometry: Option<&PointGeometry>) -> std::result::Result<GeoPoint, String> {
    let coordinates = geometry
        .map(|geometry| geometry.coordinates.as_slice())
        .ok_or_else(|| "missing geometry".to_string())?;

    match coordinates {
        [longitude, latitude, ..] if longitude.is_finite() && latitude.is_finite() => {
            if latitude.abs() > 90.0 || longitude.abs() > 180.0 {
                Err(format!(
                    "coordinate out of range: [{}, {}]",
                    longitude, latitude
                ))
            } else {
                Ok(GeoPoint::new(*latitude, *longitude))
            }
        }
        _ => Err(format!("expected [longitude, latitude], got {:?}", coordinates)),
    }
}

fn station_id_from_value(value: &Value) -> Option<WeatherStationId> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .and_then(|id| WeatherStationId::try_from(id).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn sensor_name_from_value(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => Some(text.clone()),
        _ => None,
    }
}
