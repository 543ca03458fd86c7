//! Shared test fixtures for station registry tests

use crate::models::{CameraPreset, CameraStation, GeoPoint, WeatherStation, WeatherStationId};


/// Create a weather station with no sensors
pub fn create_weather_station(id: WeatherStationId, latitude: f64, longitude: f64) -> WeatherStation {
    WeatherStation {
        id,
        location: GeoPoint::new(latitude, longitude),
        sensors: Vec::new(),
    }
}

/// Create a camera station with numbered presets
pub fn create_camera_station(
    id: &str,
    location: Option<(f64, f64)>,
    preset_count: usize,
    nearest_weather_station_id: Option<WeatherStationId>,
) -> CameraStation {
    CameraStation {
        id: id.to_string(),
        location: location.map(|(latitude, longitude)| GeoPoint::new(latitude, longitude)),
        presets: (0..preset_count)
            .map(|index| CameraPreset {
                id: format!("{}{:02}", id, index),
                image_url: Some(format!("https://images.example/{}{:02}.jpg", id, index)),
                measured_time: None,
            })
            .collect(),
        nearest_weather_station_id,
    }
}

/// Weather station feed with one feature per `(id, longitude, latitude)`
pub fn weather_station_feed_json(stations: &[(u32, f64, f64)]) -> String {
    let features: Vec<String> = stations
        .iter()
        .map(|(id, longitude, latitude)| {
            format!(
                r#"{{"type": "Feature", "id": {id}, "geometry": {{"type": "Point", "coordinates": [{longitude}, {latitude}, 0.0]}}, "properties": {{"roadStationId": {id}, "stationSensors": [1, 2, 3]}}}}"#
            )
        })
        .collect();
    format!(
        r#"{{"type": "FeatureCollection", "features": [{}]}}"#,
        features.join(",")
    )
}
