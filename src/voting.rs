//! Plurality voting over ambiguous multi-source readings
//!
//! Road candidates are decided by occurrence count, falling back to the
//! severity table when every distinct token occurs equally often. Weather
//! readings are first normalized towards the canonical categories, then
//! decided by canonical membership and severity.

use crate::config::VotingConfig;
use crate::labels::{Candidates, ConditionLabel, ConditionTables, RoadCondition, WeatherCondition};
use crate::models::{MergedConditionRecord, VotedConditionRecord};
use tracing::{debug, info, warn};

/// Collapses candidate readings into one label each
#[derive(Debug, Clone, Copy)]
pub struct ConditionVoter<'a> {
    tables: &'a ConditionTables,
    config: &'a VotingConfig,
}

impl<'a> ConditionVoter<'a> {
    pub fn new(tables: &'a ConditionTables, config: &'a VotingConfig) -> Self {
        Self { tables, config }
    }

    /// Vote every merged record; exactly one output per input, in input order
    pub fn vote_all(&self, records: &[MergedConditionRecord]) -> Vec<VotedConditionRecord> {
        let voted: Vec<VotedConditionRecord> = records
            .iter()
            .map(|record| VotedConditionRecord {
                nearest_weather_station_id: record.nearest_weather_station_id,
                road: self.vote_road(record.road_candidates.as_ref()),
                weather: self.vote_weather(record.weather.as_ref()),
                measured_time: record.measured_time,
            })
            .collect();

        info!(
            "Voted {} stations: {} road labels, {} weather labels",
            voted.len(),
            voted.iter().filter(|record| record.road.is_some()).count(),
            voted.iter().filter(|record| record.weather.is_some()).count()
        );

        voted
    }

    /// Road label of a combined candidate reading
    ///
    /// The winner is the most frequent token, the first one in candidate
    /// order on equal counts. When every distinct token occurs equally often
    /// the most severe known token wins instead.
    pub fn vote_road(&self, candidates: Option<&Candidates>) -> Option<String> {
        let candidates = candidates?;
        let tokens = candidates.tokens();
        if let [only] = tokens {
            return Some(only.clone());
        }

        let counts = occurrence_counts(tokens);
        let all_tied = counts.windows(2).all(|pair| pair[0].1 == pair[1].1);

        if all_tied {
            let known = counts
                .iter()
                .filter_map(|(token, _)| RoadCondition::from_label(token));
            if let Some(winner) = self.tables.road.most_severe(known) {
                return Some(winner.label().to_string());
            }
            warn!(
                "No road candidate in '{}' is a known label, keeping the first",
                candidates
            );
            return counts.first().map(|(token, _)| token.to_string());
        }

        let mut winner: Option<(&str, usize)> = None;
        for &(token, count) in &counts {
            if winner.is_none_or(|(_, best)| count > best) {
                winner = Some((token, count));
            }
        }
        winner.map(|(token, _)| token.to_string())
    }

    /// Remap weather tokens towards the canonical vocabulary
    ///
    /// Remappings are literal substring replacements applied in order. A bare
    /// intensity word reported second is completed to a rain intensity, and a
    /// rare precipitation descriptor reported first is folded into snow/sleet.
    pub fn normalize_weather(&self, candidates: &Candidates) -> Candidates {
        let mut normalized = candidates.map_tokens(|token| {
            self.config
                .weather_remappings
                .iter()
                .fold(token.clone(), |text, remap| text.replace(&remap.from, &remap.to))
        });

        let tokens = normalized.tokens_mut();
        if let [_, second, ..] = &mut *tokens {
            if self.config.intensity_words.iter().any(|word| word == &*second) {
                second.push_str(" rain");
            }
        }
        if let Some(first) = tokens.first_mut() {
            if self.config.rare_precipitation.iter().any(|rare| rare == &*first) {
                *first = self.config.snow_sleet_token.clone();
            }
        }

        normalized
    }

    /// Weather label of a reconciled weather reading
    pub fn vote_weather(&self, candidates: Option<&Candidates>) -> Option<WeatherCondition> {
        let normalized = self.normalize_weather(candidates?);
        let tokens = normalized.tokens();

        let voted = match tokens {
            [] => None,
            [only] => WeatherCondition::from_label(only).or_else(|| self.promote_bare(only)),
            [first, second, ..] => {
                let canonical: Vec<WeatherCondition> = tokens
                    .iter()
                    .filter_map(|token| WeatherCondition::from_label(token))
                    .collect();
                match canonical.as_slice() {
                    [] => WeatherCondition::from_label(&format!(
                        "{} {}",
                        capitalize(second),
                        first.to_lowercase()
                    )),
                    [only] => Some(*only),
                    _ => self.tables.weather.most_severe(canonical.iter().copied()),
                }
            }
        };

        if voted.is_none() {
            debug!("Weather reading '{}' has no canonical label", normalized);
        }
        voted
    }

    /// "Rain" becomes "Weak rain", "snow/sleet" becomes "Weak snow/sleet"
    fn promote_bare(&self, token: &str) -> Option<WeatherCondition> {
        if self.config.bare_precipitation.iter().any(|bare| bare == token) {
            WeatherCondition::from_label(&format!("Weak {}", token.to_lowercase()))
        } else {
            None
        }
    }
}

/// Distinct tokens with their counts, in order of first appearance
fn occurrence_counts(tokens: &[String]) -> Vec<(&str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::with_capacity(tokens.len());
    for token in tokens {
        match counts.iter_mut().find(|(seen, _)| *seen == token.as_str()) {
            Some((_, count)) => *count += 1,
            None => counts.push((token.as_str(), 1)),
        }
    }
    counts
}

/// First character upper case, the rest lower case
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
