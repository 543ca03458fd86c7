//! Per-station reconciliation of redundant sensors
//!
//! Every tracked quantity is measured by two sensors at a station. Their
//! descriptions are combined into one reading: agreement gives one token,
//! disagreement keeps both in sensor order, and faulty or missing sensors
//! drop out.

use crate::config::{ReconcileConfig, RolePair};
use crate::labels::Candidates;
use crate::models::{ConditionRecord, SensorReading, WeatherStationId};
use chrono::{DateTime, FixedOffset};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Combines the redundant sensors of every station into condition records
#[derive(Debug, Clone, Copy)]
pub struct ConditionReconciler<'a> {
    config: &'a ReconcileConfig,
}

impl<'a> ConditionReconciler<'a> {
    pub fn new(config: &'a ReconcileConfig) -> Self {
        Self { config }
    }

    /// One record per station, in order of each station's first reading
    ///
    /// `readings` are expected sorted by measurement time, so that the first
    /// reading of a role is the oldest one.
    pub fn reconcile(&self, readings: &[SensorReading]) -> Vec<ConditionRecord> {
        let used_roles = self.used_roles(readings);

        let mut order: Vec<WeatherStationId> = Vec::new();
        let mut by_station: HashMap<WeatherStationId, Vec<&SensorReading>> = HashMap::new();
        for reading in readings {
            by_station
                .entry(reading.station_id)
                .or_insert_with(|| {
                    order.push(reading.station_id);
                    Vec::new()
                })
                .push(reading);
        }

        let records: Vec<ConditionRecord> = order
            .into_iter()
            .map(|station_id| {
                let station_readings = by_station
                    .get(&station_id)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                self.reconcile_station(station_id, station_readings, &used_roles)
            })
            .collect();

        info!(
            "Reconciled {} stations: {} without road reading, {} without weather reading",
            records.len(),
            records.iter().filter(|record| record.road.is_none()).count(),
            records.iter().filter(|record| record.weather.is_none()).count()
        );

        records
    }

    /// Roles that report a description somewhere in the snapshot, minus exclusions
    fn used_roles<'r>(&self, readings: &'r [SensorReading]) -> HashSet<&'r str> {
        readings
            .iter()
            .filter(|reading| reading.description.is_some())
            .map(|reading| reading.role.as_str())
            .filter(|role| !self.config.excluded_roles.iter().any(|excluded| excluded == role))
            .collect()
    }

    fn reconcile_station(
        &self,
        station_id: WeatherStationId,
        readings: &[&SensorReading],
        used_roles: &HashSet<&str>,
    ) -> ConditionRecord {
        let (road, road_time) =
            self.reconcile_quantity(readings, &self.config.road_roles, used_roles);
        let (weather, weather_time) =
            self.reconcile_quantity(readings, &self.config.weather_roles, used_roles);

        debug!(
            "Station {}: road = {:?}, weather = {:?}",
            station_id,
            road.as_ref().map(Candidates::joined),
            weather.as_ref().map(Candidates::joined)
        );

        ConditionRecord {
            nearest_weather_station_id: station_id,
            road,
            weather,
            measured_time: road_time.max(weather_time),
        }
    }

    /// Combined reading of a role pair and the latest time among its sources
    fn reconcile_quantity(
        &self,
        readings: &[&SensorReading],
        roles: &RolePair,
        used_roles: &HashSet<&str>,
    ) -> (Option<Candidates>, Option<DateTime<FixedOffset>>) {
        let first = self.role_description(readings, &roles.primary, used_roles);
        let second = self.role_description(readings, &roles.secondary, used_roles);
        let latest = first.iter().chain(&second).map(|(_, time)| *time).max();
        let candidates = combine_descriptions(
            first.map(|(description, _)| description),
            second.map(|(description, _)| description),
        );
        (candidates, latest)
    }

    /// Usable description of the first reading of `role` at the station, with its time
    fn role_description(
        &self,
        readings: &[&SensorReading],
        role: &str,
        used_roles: &HashSet<&str>,
    ) -> Option<(String, DateTime<FixedOffset>)> {
        if !used_roles.contains(role) {
            return None;
        }

        let reading = readings.iter().find(|reading| reading.role == role)?;
        let description = reading.description.as_deref()?;
        let description = self.apply_aliases(description);

        if description == self.config.fault_marker {
            None
        } else {
            Some((description, reading.measured_time))
        }
    }

    fn apply_aliases(&self, description: &str) -> String {
        self.config
            .description_aliases
            .iter()
            .find(|alias| alias.from == description)
            .map_or_else(|| description.to_string(), |alias| alias.to.clone())
    }
}

/// Combine the usable descriptions of two redundant sensors
pub fn combine_descriptions(first: Option<String>, second: Option<String>) -> Option<Candidates> {
    match (first, second) {
        (Some(first), Some(second)) if first == second => Some(Candidates::single(first)),
        (Some(first), Some(second)) => Candidates::from_tokens([first, second]),
        (Some(only), None) | (None, Some(only)) => Some(Candidates::single(only)),
        (None, None) => None,
    }
}
