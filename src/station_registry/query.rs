//! Station lookups spanning more than one table
//!
//! Proximity between camera and weather stations (for map annotation by an
//! external collaborator) and the join of sensor readings to the coordinates
//! of their station.

use super::StationRegistry;
use crate::error::Result;
use crate::geo_proximity::GeoProximityMatcher;
use crate::models::{CameraStation, GeoPoint, LocatedReading, SensorReading, WeatherStationId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Weather stations within the radius of one camera station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraNeighbours {
    pub camera_station_id: String,
    pub location: GeoPoint,
    pub preset_ids: Vec<String>,
    pub nearest_weather_station_id: Option<WeatherStationId>,
    pub weather_stations_nearby: Vec<WeatherStationId>,
}

/// Camera stations within the radius of one weather station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherNeighbours {
    pub weather_station_id: WeatherStationId,
    pub location: GeoPoint,
    pub sensors: Vec<String>,
    pub camera_stations_nearby: Vec<String>,
}

/// Station-to-station proximity in both directions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityReport {
    pub radius_m: f64,
    pub cameras: Vec<CameraNeighbours>,
    pub weather_stations: Vec<WeatherNeighbours>,
}

impl StationRegistry {
    /// Camera stations that have a location, with that location
    pub fn located_camera_stations(&self) -> impl Iterator<Item = (&CameraStation, GeoPoint)> {
        self.camera_stations
            .iter()
            .filter_map(|station| station.location.map(|location| (station, location)))
    }

    /// Match camera stations against weather stations and the reverse
    ///
    /// The two directions are computed separately; camera stations without a
    /// location take part in neither.
    pub fn proximity_report(&self, matcher: &GeoProximityMatcher) -> Result<ProximityReport> {
        let (cameras, camera_points): (Vec<_>, Vec<GeoPoint>) =
            self.located_camera_stations().unzip();
        let camera_ids: Vec<String> = cameras.iter().map(|station| station.id.clone()).collect();

        let weather_points: Vec<GeoPoint> = self
            .weather_stations
            .iter()
            .map(|station| station.location)
            .collect();
        let weather_ids: Vec<WeatherStationId> =
            self.weather_stations.iter().map(|station| station.id).collect();

        let weather_near_cameras = matcher.nearby(&camera_points, &weather_points, &weather_ids)?;
        let cameras_near_weather = matcher.nearby(&weather_points, &camera_points, &camera_ids)?;

        let cameras = cameras
            .into_iter()
            .zip(camera_points)
            .zip(weather_near_cameras)
            .map(|((station, location), nearby)| CameraNeighbours {
                camera_station_id: station.id.clone(),
                location,
                preset_ids: station.preset_ids().map(str::to_string).collect(),
                nearest_weather_station_id: station.nearest_weather_station_id,
                weather_stations_nearby: nearby,
            })
            .collect();

        let weather_stations = self
            .weather_stations
            .iter()
            .zip(cameras_near_weather)
            .map(|(station, nearby)| WeatherNeighbours {
                weather_station_id: station.id,
                location: station.location,
                sensors: station.sensors.clone(),
                camera_stations_nearby: nearby,
            })
            .collect();

        Ok(ProximityReport {
            radius_m: matcher.radius_m(),
            cameras,
            weather_stations,
        })
    }

    /// Attach station coordinates to readings; readings of unknown stations are dropped
    pub fn locate_readings(&self, readings: &[SensorReading]) -> Vec<LocatedReading> {
        let located: Vec<LocatedReading> = readings
            .iter()
            .filter_map(|reading| {
                self.get_weather_station(reading.station_id)
                    .map(|station| LocatedReading {
                        reading: reading.clone(),
                        location: station.location,
                    })
            })
            .collect();

        debug!(
            "Located {} of {} sensor readings",
            located.len(),
            readings.len()
        );

        located
    }
}
