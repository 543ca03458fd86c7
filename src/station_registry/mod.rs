//! Station registry for weather and camera station lookups
//!
//! The registry holds the weather and camera station tables of one snapshot,
//! indexed by id, together with the co-location pairs found among weather
//! stations. Co-location is exact coordinate equality, unrelated to the
//! radius based proximity matching.

use crate::models::{CameraStation, CoLocationPair, GeoPoint, WeatherStation, WeatherStationId};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, warn};

pub mod loader;
pub mod query;

#[cfg(test)]
pub mod tests;

// Re-export key types for convenience
pub use query::{CameraNeighbours, ProximityReport, WeatherNeighbours};

/// Station tables of one snapshot
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    /// Weather stations in feed order
    pub(crate) weather_stations: Vec<WeatherStation>,

    /// Position of each weather station in `weather_stations`
    pub(crate) weather_index: HashMap<WeatherStationId, usize>,

    /// Camera stations in feed order
    pub(crate) camera_stations: Vec<CameraStation>,

    /// Position of each camera station in `camera_stations`
    pub(crate) camera_index: HashMap<String, usize>,

    /// Weather stations sharing one exact coordinate, two at a time
    pub(crate) co_location_pairs: Vec<CoLocationPair>,
}

impl StationRegistry {
    /// Build a registry from station tables
    ///
    /// Duplicate ids keep the first station seen.
    pub fn new(weather_stations: Vec<WeatherStation>, camera_stations: Vec<CameraStation>) -> Self {
        let mut registry = Self::default();

        for station in weather_stations {
            match registry.weather_index.entry(station.id) {
                Entry::Vacant(entry) => {
                    entry.insert(registry.weather_stations.len());
                    registry.weather_stations.push(station);
                }
                Entry::Occupied(_) => {
                    warn!("Duplicate weather station {}, keeping existing", station.id);
                }
            }
        }

        for station in camera_stations {
            match registry.camera_index.entry(station.id.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(registry.camera_stations.len());
                    registry.camera_stations.push(station);
                }
                Entry::Occupied(_) => {
                    warn!("Duplicate camera station {}, keeping existing", station.id);
                }
            }
        }

        registry.co_location_pairs = detect_co_location_pairs(&registry.weather_stations);

        debug!(
            "Station registry built: {} weather stations, {} camera stations, {} co-location pairs",
            registry.weather_stations.len(),
            registry.camera_stations.len(),
            registry.co_location_pairs.len()
        );

        registry
    }

    /// Get a weather station by id
    pub fn get_weather_station(&self, id: WeatherStationId) -> Option<&WeatherStation> {
        self.weather_index
            .get(&id)
            .map(|&index| &self.weather_stations[index])
    }

    pub fn camera_stations(&self) -> &[CameraStation] {
        &self.camera_stations
    }

    pub fn co_location_pairs(&self) -> &[CoLocationPair] {
        &self.co_location_pairs
    }

    pub fn weather_station_count(&self) -> usize {
        self.weather_stations.len()
    }

    pub fn camera_station_count(&self) -> usize {
        self.camera_stations.len()
    }
}

/// Exact-equality key of a coordinate; both zeros compare equal
fn coordinate_key(location: GeoPoint) -> (u64, u64) {
    let normalize = |value: f64| if value == 0.0 { 0.0f64 } else { value };
    (
        normalize(location.latitude).to_bits(),
        normalize(location.longitude).to_bits(),
    )
}

/// Pair up weather stations that share an identical coordinate
///
/// Only groups of exactly two stations form a pair. A station alone at its
/// coordinate, or one of three or more stations sharing it, is left unpaired.
pub fn detect_co_location_pairs(stations: &[WeatherStation]) -> Vec<CoLocationPair> {
    let mut groups: Vec<Vec<WeatherStationId>> = Vec::new();
    let mut group_index: HashMap<(u64, u64), usize> = HashMap::new();

    for station in stations {
        let index = *group_index
            .entry(coordinate_key(station.location))
            .or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
        groups[index].push(station.id);
    }

    groups
        .into_iter()
        .filter_map(|members| match members.as_slice() {
            [first, second] => Some(CoLocationPair::new(*first, *second)),
            [_] => None,
            _ => {
                debug!(
                    "{} weather stations share one coordinate, not pairing: {:?}",
                    members.len(),
                    members
                );
                None
            }
        })
        .collect()
}
