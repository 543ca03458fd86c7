//! Assembly of the labeled image table
//!
//! Every camera preset becomes one image row labeled with the voted
//! conditions of its camera station's nearest weather station. Both joins
//! are inner joins: presets whose camera station names no weather station,
//! or whose weather station has no voted record, are dropped. An image is
//! timed by its preset's capture time, or by the station's measurement time
//! when the feed gives none.

use crate::constants::{NAME_KEY_TIME_FORMAT, UNDEFINED, UNMAPPED_CODE};
use crate::labels::{ConditionLabel, ConditionTables};
use crate::models::{
    CameraStation, ImageRecord, LocatedReading, VotedConditionRecord, WeatherStationId,
};
use chrono::{DateTime, FixedOffset};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Row counts of one assembly, for reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    /// Presets across all camera stations
    pub presets: usize,
    /// Presets dropped because their camera station names no weather station
    pub missing_station: usize,
    /// Presets dropped because their weather station has no voted record
    pub missing_conditions: usize,
    /// Labels written as "undefined"
    pub undefined_labels: usize,
    /// Defined labels without a name key code
    pub unmapped_labels: usize,
}

impl AssemblyStats {
    pub fn join_misses(&self) -> usize {
        self.missing_station + self.missing_conditions
    }
}

/// Joins camera presets to voted conditions and generates image names
#[derive(Debug, Clone, Copy)]
pub struct DatasetAssembler<'a> {
    tables: &'a ConditionTables,
}

impl<'a> DatasetAssembler<'a> {
    pub fn new(tables: &'a ConditionTables) -> Self {
        Self { tables }
    }

    /// One image row per joinable preset, in camera station then preset order
    pub fn assemble(
        &self,
        cameras: &[CameraStation],
        voted: &[VotedConditionRecord],
    ) -> (Vec<ImageRecord>, AssemblyStats) {
        let conditions: HashMap<WeatherStationId, &VotedConditionRecord> = voted
            .iter()
            .map(|record| (record.nearest_weather_station_id, record))
            .collect();

        let mut stats = AssemblyStats::default();
        let mut images = Vec::new();

        for camera in cameras {
            stats.presets += camera.presets.len();

            let Some(station_id) = camera.nearest_weather_station_id else {
                stats.missing_station += camera.presets.len();
                debug!("Camera station {} names no weather station", camera.id);
                continue;
            };
            let Some(record) = conditions.get(&station_id) else {
                stats.missing_conditions += camera.presets.len();
                debug!(
                    "Camera station {}: no conditions for weather station {}",
                    camera.id, station_id
                );
                continue;
            };

            for preset in &camera.presets {
                let road = record.road.as_deref().unwrap_or(UNDEFINED);
                let weather = record.weather.map_or(UNDEFINED, |label| label.label());
                let time = preset.measured_time.or(record.measured_time);
                let measured_time = time.map_or_else(|| UNDEFINED.to_string(), |time| time.to_rfc3339());

                for (defined, code) in [
                    (record.road.is_some(), self.tables.road_code(road)),
                    (record.weather.is_some(), self.tables.weather_code(weather)),
                ] {
                    if !defined {
                        stats.undefined_labels += 1;
                    } else if code.is_none() {
                        stats.unmapped_labels += 1;
                    }
                }

                images.push(ImageRecord {
                    camera_preset_id: preset.id.clone(),
                    camera_station_id: camera.id.clone(),
                    nearest_weather_station_id: station_id,
                    image_url: preset.image_url.clone(),
                    image_name: self.image_name(&preset.id, road, weather, time),
                    road_condition: road.to_string(),
                    weather_condition: weather.to_string(),
                    measured_time,
                });
            }
        }

        if stats.unmapped_labels > 0 {
            warn!(
                "{} labels have no name key code and were written as '{}'",
                stats.unmapped_labels, UNMAPPED_CODE
            );
        }
        info!(
            "Assembled {} image rows from {} presets ({} dropped by joins)",
            images.len(),
            stats.presets,
            stats.join_misses()
        );

        (images, stats)
    }

    /// `<preset>_r<road code>_w<weather code>_<YYYY-MM-DD_HH-MM-SS>`
    ///
    /// Labels without a code are written as `nan`. The timestamp keeps the
    /// wall-clock time of its own offset and drops the offset itself.
    pub fn image_name(
        &self,
        preset_id: &str,
        road: &str,
        weather: &str,
        measured_time: Option<DateTime<FixedOffset>>,
    ) -> String {
        let code = |code: Option<u8>| code.map_or_else(|| UNMAPPED_CODE.to_string(), |c| c.to_string());
        let timestamp = measured_time.map_or_else(
            || UNDEFINED.to_string(),
            |time| time.format(NAME_KEY_TIME_FORMAT).to_string(),
        );

        format!(
            "{}_r{}_w{}_{}",
            preset_id,
            code(self.tables.road_code(road)),
            code(self.tables.weather_code(weather)),
            timestamp
        )
    }
}

/// Readings of the weather stations referenced by at least one image row
pub fn referenced_sensor_rows(
    located: &[LocatedReading],
    images: &[ImageRecord],
) -> Vec<LocatedReading> {
    let referenced: HashSet<WeatherStationId> = images
        .iter()
        .map(|image| image.nearest_weather_station_id)
        .collect();

    located
        .iter()
        .filter(|row| referenced.contains(&row.reading.station_id))
        .cloned()
        .collect()
}
