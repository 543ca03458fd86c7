//! Error handling for snapshot labeling.
//!
//! Only structurally broken inputs are fatal. Faulty sensors, unmapped labels
//! and join misses degrade to placeholder values and never surface here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Invalid JSON in file: {path} - {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed input in {context}: {reason}")]
    MalformedInput { context: String, reason: String },

    #[error("Unknown {kind} label: '{label}'")]
    UnknownLabel { kind: &'static str, label: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Configuration file could not be parsed: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Validation failed: {message}")]
    Validation { message: String },
}

impl LabelerError {
    /// Create a malformed input error for a named record
    pub fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LabelerError>;
