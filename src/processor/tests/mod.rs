//! Pipeline tests over complete snapshots
//!
//! The fixture snapshot holds a co-located station pair, a single station, a
//! three-way co-located group and cameras that fail either join.


use crate::ingest::Snapshot;
use serde_json::{Value, json};

pub const MEASURED_AT: &str = "2021-03-04T10:15:00Z";
pub const EARLIER: &str = "2021-03-04T10:05:00Z";

/// A raw sensor value as published in the weather data feed
pub fn sensor_value(id: u64, station: u32, role: &str, description: Option<&str>, time: &str) -> Value {
    json!({
        "id": id,
        "roadStationId": station,
        "oldName": role,
        "sensorValue": 0.0,
        "sensorUnit": "***",
        "sensorValueDescriptionEn": description,
        "measuredTime": time,
    })
}

fn point_feature(id: Value, longitude: f64, latitude: f64, properties: Value) -> Value {
    json!({
        "type": "Feature",
        "id": id,
        "geometry": { "type": "Point", "coordinates": [longitude, latitude, 0.0] },
        "properties": properties,
    })
}

fn camera(id: &str, nearest: Option<u32>, presets: &[&str]) -> Value {
    let presets: Vec<Value> = presets
        .iter()
        .map(|preset| {
            json!({
                "id": preset,
                "imageUrl": format!("https://weathercam.example/{}.jpg", preset),
                "measuredTime": MEASURED_AT,
            })
        })
        .collect();
    json!({ "id": id, "nearestWeatherStationId": nearest, "cameraPresets": presets })
}

/// Weather data feed of the fixture
pub fn weather_data() -> Value {
    json!({
        "weatherStations": [
            { "id": 1001, "sensorValues": [
                sensor_value(1, 1001, "roadsurfaceconditions1", Some("Dry"), MEASURED_AT),
                sensor_value(2, 1001, "roadsurfaceconditions2", Some("The sensor has a fault"), MEASURED_AT),
                sensor_value(3, 1001, "precipitationtype", Some("Rain"), EARLIER),
                sensor_value(4, 1001, "precipitation", Some("Weak"), EARLIER),
            ]},
            { "id": 1002, "sensorValues": [
                sensor_value(5, 1002, "roadsurfaceconditions1", Some("Wet"), MEASURED_AT),
                sensor_value(6, 1002, "warning1", Some("Ice"), MEASURED_AT),
            ]},
            { "id": 1003, "sensorValues": [
                sensor_value(7, 1003, "roadsurfaceconditions1", Some("Ice"), MEASURED_AT),
                sensor_value(8, 1003, "roadsurfaceconditions2", Some("Ice"), MEASURED_AT),
                sensor_value(9, 1003, "precipitationtype", Some("Dry weather"), MEASURED_AT),
            ]},
            { "id": 1004, "sensorValues": [
                sensor_value(10, 1004, "roadsurfaceconditions1", Some("Moist"), MEASURED_AT),
            ]},
            { "id": 2001, "sensorValues": [
                sensor_value(11, 2001, "roadsurfaceconditions1", Some("Snow"), MEASURED_AT),
            ]},
            { "id": 2002, "sensorValues": [
                sensor_value(12, 2002, "roadsurfaceconditions1", Some("Dry"), MEASURED_AT),
            ]},
            { "id": 2003, "sensorValues": [
                sensor_value(13, 2003, "roadsurfaceconditions1", Some("Frost"), MEASURED_AT),
            ]},
        ]
    })
}

/// Weather station feed: 1001 and 1002 share a site, 2001-2003 share another
pub fn weather_stations() -> Value {
    let stations = [
        (1001, 24.9384, 60.1699),
        (1002, 24.9384, 60.1699),
        (1003, 25.4651, 65.0121),
        (1004, 23.7610, 61.4978),
        (2001, 27.6782, 62.8924),
        (2002, 27.6782, 62.8924),
        (2003, 27.6782, 62.8924),
    ];
    let features: Vec<Value> = stations
        .iter()
        .map(|(id, longitude, latitude)| {
            point_feature(
                json!(id),
                *longitude,
                *latitude,
                json!({ "id": id, "stationSensors": [16, 17, "precipitationtype"] }),
            )
        })
        .collect();
    json!({ "type": "FeatureCollection", "features": features })
}

/// Camera data feed; C04 names an unknown station and C05 names none
pub fn camera_data() -> Value {
    json!({
        "cameraStations": [
            camera("C01", Some(1001), &["C0100101", "C0100102"]),
            camera("C02", Some(1002), &["C0200101"]),
            camera("C03", Some(1003), &["C0300101"]),
            camera("C04", Some(9999), &["C0400101"]),
            camera("C05", None, &["C0500101"]),
            camera("C21", Some(2001), &["C2100101"]),
            camera("C22", Some(2002), &["C2200101"]),
            camera("C23", Some(2003), &["C2300101"]),
        ]
    })
}

/// Camera station feed; C03 has no location
pub fn camera_stations() -> Value {
    let stations = [
        ("C01", 24.9390, 60.1700),
        ("C02", 24.9384, 60.1690),
        ("C04", 23.7610, 61.4978),
        ("C05", 21.0, 63.0),
        ("C21", 27.6782, 62.8924),
        ("C22", 27.6782, 62.8924),
        ("C23", 27.6782, 62.8924),
    ];
    let features: Vec<Value> = stations
        .iter()
        .map(|(id, longitude, latitude)| {
            point_feature(Value::Null, *longitude, *latitude, json!({ "id": id }))
        })
        .collect();
    json!({ "type": "FeatureCollection", "features": features })
}

/// The fixture as parsed feeds
pub fn fixture_snapshot() -> Snapshot {
    snapshot_from(weather_data(), weather_stations(), camera_data(), camera_stations())
}

pub fn snapshot_from(
    weather_data: Value,
    weather_stations: Value,
    camera_data: Value,
    camera_stations: Value,
) -> Snapshot {
    Snapshot {
        weather_data: serde_json::from_value(weather_data).unwrap(),
        weather_stations: serde_json::from_value(weather_stations).unwrap(),
        camera_data: serde_json::from_value(camera_data).unwrap(),
        camera_stations: serde_json::from_value(camera_stations).unwrap(),
    }
}

/// Write the fixture feeds into `dir` under their default file names
pub fn write_fixture(dir: &std::path::Path) {
    let files = [
        ("weather-data.json", weather_data()),
        ("weather-stations.json", weather_stations()),
        ("camera-data.json", camera_data()),
        ("camera-stations.json", camera_stations()),
    ];
    for (name, value) in files {
        std::fs::write(dir.join(name), serde_json::to_vec_pretty(&value).unwrap()).unwrap();
    }
}
