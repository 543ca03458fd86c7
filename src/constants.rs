//! Application constants for the road camera labeler
//!
//! This module contains the fixed literals used throughout the pipeline:
//! sensor role names, marker strings, separators and default file names.
//! Tunable tables (severity weights, remappings) live in `config` and take
//! their defaults from here.

// =============================================================================
// Sensor Roles
// =============================================================================

/// Sensor role names as reported in the `oldName` field of a sensor value
pub mod sensor_roles {
    /// First road surface condition sensor
    pub const ROAD_SURFACE_PRIMARY: &str = "roadsurfaceconditions1";

    /// Redundant road surface condition sensor
    pub const ROAD_SURFACE_SECONDARY: &str = "roadsurfaceconditions2";

    /// Precipitation type sensor (rain, snow, ...)
    pub const PRECIPITATION_TYPE: &str = "precipitationtype";

    /// Precipitation intensity sensor
    pub const PRECIPITATION: &str = "precipitation";

    /// Warning channels, never used as a condition source
    pub const EXCLUDED: &[&str] = &["warning1", "warning2", "warning3"];
}

// =============================================================================
// Markers and Separators
// =============================================================================

/// Description reported by a malfunctioning sensor
pub const FAULT_MARKER: &str = "The sensor has a fault";

/// Separator between the sources of an ambiguous reading
pub const CANDIDATE_SEPARATOR: &str = " / ";

/// Placeholder written for a label or timestamp that could not be determined
pub const UNDEFINED: &str = "undefined";

/// Placeholder written into a name key for a label without an integer code
pub const UNMAPPED_CODE: &str = "nan";

/// Timestamp layout used inside generated name keys
pub const NAME_KEY_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Upper bound on candidate tokens: two sensors at a station plus two at its partner
pub const MAX_CANDIDATES: usize = 4;

// =============================================================================
// Text Normalization Defaults
// =============================================================================

/// Exact description replacements applied before reconciliation
pub const DESCRIPTION_ALIASES: &[(&str, &str)] = &[("Dry weather", "Dry")];

/// Ordered substring remappings applied to weather descriptions before voting
pub const WEATHER_REMAPPINGS: &[(&str, &str)] = &[
    ("Moderate", "Mediocre"),
    ("Light", "Weak"),
    ("Abundant", "Heavy"),
    ("Drizzle", "Weak rain"),
    ("Hails", "Heavy snow/sleet"),
    ("Dry", "Clear"),
    ("Snowfall", "snow/sleet"),
];

/// Bare intensity words that get " rain" appended when reported as a second source
pub const INTENSITY_WORDS: &[&str] = &["Weak", "Mediocre", "Heavy"];

/// Rare precipitation descriptors folded into "snow/sleet"
pub const RARE_PRECIPITATION: &[&str] = &[
    "Wet sleet",
    "Sleet",
    "Ice crystals",
    "Snow grains",
    "Graupel",
    "Freezing drizzle",
    "Freezing rain",
];

/// Single precipitation tokens that are promoted to their "Weak" category
pub const BARE_PRECIPITATION: &[&str] = &["snow/sleet", "Rain"];

// =============================================================================
// Geospatial
// =============================================================================

/// Radius in metres within which two stations count as neighbours
pub const PROXIMITY_RADIUS_M: f64 = 200.0;

// =============================================================================
// Snapshot Files
// =============================================================================

/// Default file names of the four snapshot inputs
pub mod input_files {
    pub const WEATHER_DATA: &str = "weather-data.json";
    pub const WEATHER_STATIONS: &str = "weather-stations.json";
    pub const CAMERA_DATA: &str = "camera-data.json";
    pub const CAMERA_STATIONS: &str = "camera-stations.json";
}

/// Default output file stems
pub mod output_files {
    pub const IMAGES: &str = "images_database";
    pub const SENSORS: &str = "sensors_data";
    pub const PROXIMITY: &str = "stations_proximity.json";
}

/// Name of the configuration directory below the platform config dir
pub const CONFIG_DIR_NAME: &str = "roadcam-labeler";

/// Name of the configuration file inside `CONFIG_DIR_NAME`
pub const CONFIG_FILE_NAME: &str = "config.toml";
