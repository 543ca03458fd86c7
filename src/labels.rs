//! Condition label enumerations and the tables keyed by them
//!
//! Road and weather categories are closed enumerations. Each label has a
//! fixed integer code used in image name keys and a severity weight used to
//! break ties during voting. Weights are injected through [`ConditionTables`]
//! so the voter and the dataset assembler never consult global state.

use crate::constants::{CANDIDATE_SEPARATOR, MAX_CANDIDATES};
use crate::error::{LabelerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use tracing::warn;

/// Shared behaviour of the road and weather label enumerations
pub trait ConditionLabel: Copy + Eq + Hash + fmt::Debug + 'static {
    /// Human readable name of the enumeration, used in errors
    const KIND: &'static str;

    /// Every label, in code order
    const ALL: &'static [Self];

    /// Canonical text of the label
    fn label(self) -> &'static str;

    /// Integer code used in generated name keys
    fn code(self) -> u8;

    /// Severity weight used when no configuration overrides it
    fn default_severity(self) -> f64;

    /// Look up a label by its exact canonical text
    fn from_label(text: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|label| label.label() == text)
    }
}

/// Road surface categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoadCondition {
    #[serde(rename = "Dry")]
    Dry = 0,
    #[serde(rename = "Moist")]
    Moist = 1,
    #[serde(rename = "Wet")]
    Wet = 2,
    #[serde(rename = "Wet and salty")]
    WetAndSalty = 3,
    #[serde(rename = "Frost")]
    Frost = 4,
    #[serde(rename = "Snow")]
    Snow = 5,
    #[serde(rename = "Ice")]
    Ice = 6,
    #[serde(rename = "Probably moist and salty")]
    ProbablyMoistAndSalty = 7,
    #[serde(rename = "Slushy")]
    Slushy = 8,
}

impl ConditionLabel for RoadCondition {
    const KIND: &'static str = "road condition";

    const ALL: &'static [Self] = &[
        Self::Dry,
        Self::Moist,
        Self::Wet,
        Self::WetAndSalty,
        Self::Frost,
        Self::Snow,
        Self::Ice,
        Self::ProbablyMoistAndSalty,
        Self::Slushy,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Dry => "Dry",
            Self::Moist => "Moist",
            Self::Wet => "Wet",
            Self::WetAndSalty => "Wet and salty",
            Self::Frost => "Frost",
            Self::Snow => "Snow",
            Self::Ice => "Ice",
            Self::ProbablyMoistAndSalty => "Probably moist and salty",
            Self::Slushy => "Slushy",
        }
    }

    fn code(self) -> u8 {
        self as u8
    }

    fn default_severity(self) -> f64 {
        match self {
            Self::Frost => 0.20,
            Self::Ice => 0.18,
            Self::Snow => 0.16,
            Self::Slushy => 0.14,
            Self::WetAndSalty => 0.10,
            Self::Wet => 0.09,
            Self::Moist => 0.07,
            Self::ProbablyMoistAndSalty => 0.05,
            Self::Dry => 0.01,
        }
    }
}

/// Weather (precipitation) categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeatherCondition {
    #[serde(rename = "Clear")]
    Clear = 0,
    #[serde(rename = "Weak rain")]
    WeakRain = 1,
    #[serde(rename = "Mediocre rain")]
    MediocreRain = 2,
    #[serde(rename = "Heavy rain")]
    HeavyRain = 3,
    #[serde(rename = "Weak snow/sleet")]
    WeakSnowSleet = 4,
    #[serde(rename = "Mediocre snow/sleet")]
    MediocreSnowSleet = 5,
    #[serde(rename = "Heavy snow/sleet")]
    HeavySnowSleet = 6,
    #[serde(rename = "Mist/Fog")]
    MistFog = 7,
}

impl ConditionLabel for WeatherCondition {
    const KIND: &'static str = "weather condition";

    const ALL: &'static [Self] = &[
        Self::Clear,
        Self::WeakRain,
        Self::MediocreRain,
        Self::HeavyRain,
        Self::WeakSnowSleet,
        Self::MediocreSnowSleet,
        Self::HeavySnowSleet,
        Self::MistFog,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::WeakRain => "Weak rain",
            Self::MediocreRain => "Mediocre rain",
            Self::HeavyRain => "Heavy rain",
            Self::WeakSnowSleet => "Weak snow/sleet",
            Self::MediocreSnowSleet => "Mediocre snow/sleet",
            Self::HeavySnowSleet => "Heavy snow/sleet",
            Self::MistFog => "Mist/Fog",
        }
    }

    fn code(self) -> u8 {
        self as u8
    }

    fn default_severity(self) -> f64 {
        match self {
            Self::MistFog => 0.20,
            Self::HeavySnowSleet => 0.18,
            Self::MediocreSnowSleet => 0.16,
            Self::WeakSnowSleet => 0.14,
            Self::HeavyRain => 0.12,
            Self::MediocreRain => 0.10,
            Self::WeakRain => 0.08,
            Self::Clear => 0.02,
        }
    }
}

impl fmt::Display for RoadCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RoadCondition {
    type Err = LabelerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s).ok_or_else(|| LabelerError::UnknownLabel {
            kind: Self::KIND,
            label: s.to_string(),
        })
    }
}

impl FromStr for WeatherCondition {
    type Err = LabelerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s).ok_or_else(|| LabelerError::UnknownLabel {
            kind: Self::KIND,
            label: s.to_string(),
        })
    }
}

/// Severity weight for every label of one enumeration
///
/// A table is total: construction fails unless every label has a finite weight.
#[derive(Debug, Clone, PartialEq)]
pub struct SeverityTable<L: ConditionLabel> {
    weights: HashMap<L, f64>,
}

impl<L: ConditionLabel> SeverityTable<L> {
    /// Build a table from label text and weight pairs
    ///
    /// # Errors
    /// * `UnknownLabel` if a label is not part of the enumeration
    /// * `Configuration` if a weight is not finite or a label has no weight
    pub fn from_labels<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut weights = HashMap::new();
        for (text, weight) in entries {
            let label = L::from_label(text).ok_or_else(|| LabelerError::UnknownLabel {
                kind: L::KIND,
                label: text.to_string(),
            })?;
            if !weight.is_finite() {
                return Err(LabelerError::configuration(format!(
                    "{} severity for '{}' is not a finite number",
                    L::KIND,
                    text
                )));
            }
            weights.insert(label, weight);
        }

        if let Some(missing) = L::ALL.iter().find(|label| !weights.contains_key(label)) {
            return Err(LabelerError::configuration(format!(
                "{} severity table has no weight for '{}'",
                L::KIND,
                missing.label()
            )));
        }

        Ok(Self { weights })
    }

    /// Severity weight of a label
    pub fn weight(&self, label: L) -> f64 {
        self.weights.get(&label).copied().unwrap_or_default()
    }

    /// Most severe label among `labels`; the earliest wins on equal weights
    pub fn most_severe<I>(&self, labels: I) -> Option<L>
    where
        I: IntoIterator<Item = L>,
    {
        labels.into_iter().fold(None, |best, label| match best {
            Some(current) if self.weight(current) >= self.weight(label) => Some(current),
            _ => Some(label),
        })
    }
}

impl<L: ConditionLabel> Default for SeverityTable<L> {
    fn default() -> Self {
        Self {
            weights: L::ALL
                .iter()
                .map(|label| (*label, label.default_severity()))
                .collect(),
        }
    }
}

/// Lookup tables shared by the voter and the dataset assembler
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionTables {
    pub road: SeverityTable<RoadCondition>,
    pub weather: SeverityTable<WeatherCondition>,
}

impl ConditionTables {
    /// Name key code of a road label, `None` for text outside the enumeration
    pub fn road_code(&self, text: &str) -> Option<u8> {
        RoadCondition::from_label(text).map(RoadCondition::code)
    }

    /// Name key code of a weather label, `None` for text outside the enumeration
    pub fn weather_code(&self, text: &str) -> Option<u8> {
        WeatherCondition::from_label(text).map(WeatherCondition::code)
    }
}

/// Ordered candidate labels reported for one quantity
///
/// An ambiguous reading holds one token per disagreeing source, in source
/// order. The `" / "` joined form only exists at the edges of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidates {
    tokens: Vec<String>,
}

impl Candidates {
    /// A reading from a single source
    pub fn single(token: impl Into<String>) -> Self {
        Self {
            tokens: vec![token.into()],
        }
    }

    /// Build from tokens; `None` when there are no tokens
    ///
    /// At most `MAX_CANDIDATES` tokens are kept, in order; any further
    /// tokens are dropped with a warning.
    pub fn from_tokens<I, S>(tokens: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens = tokens.into_iter().map(Into::into);
        let collected: Vec<String> = tokens.by_ref().take(MAX_CANDIDATES).collect();
        let dropped = tokens.count();
        if dropped > 0 {
            warn!(
                "Reading '{}' has more than {} sources, dropping {} trailing tokens",
                collected.join(CANDIDATE_SEPARATOR),
                MAX_CANDIDATES,
                dropped
            );
        }

        if collected.is_empty() {
            None
        } else {
            Some(Self { tokens: collected })
        }
    }

    /// Split a `" / "` joined reading
    pub fn parse(joined: &str) -> Option<Self> {
        if joined.is_empty() {
            return None;
        }
        Self::from_tokens(joined.split(CANDIDATE_SEPARATOR))
    }

    /// Concatenate two optional readings, keeping source order
    pub fn concat(first: Option<&Self>, second: Option<&Self>) -> Option<Self> {
        Self::from_tokens(
            first
                .into_iter()
                .chain(second)
                .flat_map(|candidates| candidates.tokens.iter().cloned()),
        )
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Apply `f` to every token
    pub fn map_tokens<F>(&self, f: F) -> Self
    where
        F: FnMut(&String) -> String,
    {
        Self {
            tokens: self.tokens.iter().map(f).collect(),
        }
    }

    pub(crate) fn tokens_mut(&mut self) -> &mut [String] {
        &mut self.tokens
    }

    /// The `" / "` joined form
    pub fn joined(&self) -> String {
        self.tokens.join(CANDIDATE_SEPARATOR)
    }
}

impl fmt::Display for Candidates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_enumeration_order() {
        for (index, label) in RoadCondition::ALL.iter().enumerate() {
            assert_eq!(label.code() as usize, index);
        }
        for (index, label) in WeatherCondition::ALL.iter().enumerate() {
            assert_eq!(label.code() as usize, index);
        }
        assert_eq!(RoadCondition::Ice.code(), 6);
        assert_eq!(WeatherCondition::MistFog.code(), 7);
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!(
            "Wet and salty".parse::<RoadCondition>().unwrap(),
            RoadCondition::WetAndSalty
        );
        assert_eq!(
            "Weak snow/sleet".parse::<WeatherCondition>().unwrap(),
            WeatherCondition::WeakSnowSleet
        );
        assert!(matches!(
            "wet".parse::<RoadCondition>(),
            Err(LabelerError::UnknownLabel { .. })
        ));
    }

    #[test]
    fn test_default_severity_table() {
        let tables = ConditionTables::default();
        assert_eq!(tables.road.weight(RoadCondition::Frost), 0.20);
        assert_eq!(tables.road.weight(RoadCondition::Dry), 0.01);
        assert_eq!(tables.weather.weight(WeatherCondition::MistFog), 0.20);
        assert_eq!(tables.weather.weight(WeatherCondition::Clear), 0.02);
    }

    #[test]
    fn test_most_severe() {
        let table = SeverityTable::<RoadCondition>::default();
        assert_eq!(
            table.most_severe([RoadCondition::Dry, RoadCondition::Wet]),
            Some(RoadCondition::Wet)
        );
        assert_eq!(table.most_severe(std::iter::empty()), None);
    }

    #[test]
    fn test_severity_table_rejects_unknown_label() {
        let result = SeverityTable::<WeatherCondition>::from_labels([("Hail", 0.5)]);
        assert!(matches!(result, Err(LabelerError::UnknownLabel { .. })));
    }

    #[test]
    fn test_severity_table_requires_every_label() {
        let result = SeverityTable::<RoadCondition>::from_labels([("Dry", 0.01)]);
        assert!(matches!(result, Err(LabelerError::Configuration { .. })));
    }

    #[test]
    fn test_codes_for_unknown_text() {
        let tables = ConditionTables::default();
        assert_eq!(tables.road_code("Ice"), Some(6));
        assert_eq!(tables.road_code("undefined"), None);
        assert_eq!(tables.weather_code("Clear"), Some(0));
        assert_eq!(tables.weather_code("Sleet"), None);
    }

    #[test]
    fn test_candidates_round_trip_through_joined_form() {
        let candidates = Candidates::parse("Dry / Wet").unwrap();
        assert_eq!(candidates.tokens(), ["Dry", "Wet"]);
        assert_eq!(candidates.to_string(), "Dry / Wet");
        assert!(Candidates::parse("").is_none());
    }

    #[test]
    fn test_candidates_concat() {
        let own = Candidates::parse("Dry / Wet");
        let partner = Candidates::single("Wet");
        let merged = Candidates::concat(own.as_ref(), Some(&partner)).unwrap();
        assert_eq!(merged.joined(), "Dry / Wet / Wet");
        assert!(Candidates::concat(None, None).is_none());
    }

    #[test]
    fn test_candidates_are_bounded() {
        let candidates = Candidates::parse("Dry / Wet / Ice / Snow / Frost").unwrap();
        assert_eq!(candidates.tokens(), ["Dry", "Wet", "Ice", "Snow"]);

        let own = Candidates::parse("Dry / Wet / Ice");
        let partner = Candidates::parse("Snow / Frost");
        let merged = Candidates::concat(own.as_ref(), partner.as_ref()).unwrap();
        assert_eq!(merged.tokens().len(), MAX_CANDIDATES);
        assert_eq!(merged.joined(), "Dry / Wet / Ice / Snow");
    }
}
