//! Cross-station merging of co-located weather stations
//!
//! Two stations at one site each carry a different sensor subset. The road
//! reading of each is folded into the other's record as a further candidate
//! before voting. Weather readings are never merged across partners.

use crate::labels::Candidates;
use crate::models::{CoLocationPair, ConditionRecord, MergedConditionRecord, WeatherStationId};
use std::collections::HashMap;
use tracing::debug;

/// Folds each co-located partner's road reading into the other's record
#[derive(Debug, Clone, Default)]
pub struct CoLocationMerger {
    partners: HashMap<WeatherStationId, WeatherStationId>,
}

impl CoLocationMerger {
    pub fn new(pairs: &[CoLocationPair]) -> Self {
        let partners = pairs
            .iter()
            .flat_map(|pair| [(pair.first, pair.second), (pair.second, pair.first)])
            .collect();
        Self { partners }
    }

    pub fn partner_of(&self, id: WeatherStationId) -> Option<WeatherStationId> {
        self.partners.get(&id).copied()
    }

    /// Merge every record with its partner; one output per input, in input order
    ///
    /// Needs the complete reconciler output, since a partner may appear
    /// anywhere in `records`.
    pub fn merge(&self, records: &[ConditionRecord]) -> Vec<MergedConditionRecord> {
        let roads: HashMap<WeatherStationId, Option<&Candidates>> = records
            .iter()
            .map(|record| (record.nearest_weather_station_id, record.road.as_ref()))
            .collect();

        records
            .iter()
            .map(|record| {
                let partner_road = self
                    .partner_of(record.nearest_weather_station_id)
                    .and_then(|partner| roads.get(&partner).copied().flatten())
                    .cloned();

                let road_candidates =
                    Candidates::concat(record.road.as_ref(), partner_road.as_ref());

                if partner_road.is_some() {
                    debug!(
                        "Station {}: road candidates with partner = {:?}",
                        record.nearest_weather_station_id,
                        road_candidates.as_ref().map(Candidates::joined)
                    );
                }

                MergedConditionRecord {
                    nearest_weather_station_id: record.nearest_weather_station_id,
                    partner_road,
                    road_candidates,
                    weather: record.weather.clone(),
                    measured_time: record.measured_time,
                }
            })
            .collect()
    }
}
