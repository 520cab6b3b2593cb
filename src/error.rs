//! Error types for the health tracker

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur at the fallible edges of the tracker
/// (persistence writes, configuration, JSON boundaries).
///
/// The analytics core itself never returns these; it degrades to empty or
/// `None` outputs on missing data instead.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config TOML: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config TOML: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(#[from] ValidationError),

    #[error("Invalid reference time: {0}")]
    InvalidReference(String),
}
