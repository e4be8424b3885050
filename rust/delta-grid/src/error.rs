//! Configuration errors, the only failures the pipeline surfaces.

use std::path::PathBuf;

use crate::grid::GridBounds;

/// Errors raised while validating or loading a [`RunConfig`](crate::config::RunConfig).
///
/// Everything downstream of a validated configuration is infallible: missing
/// data is an empty result, never an error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("k_max must be at least 4 (columns 1..=3 never qualify), got {0}")]
    KMaxTooSmall(usize),

    #[error("k_max {0} needs a horizon beyond u64")]
    KMaxTooLarge(usize),

    #[error("horizon {horizon} cannot populate any column (minimum {minimum})")]
    HorizonTooSmall { horizon: u64, minimum: u64 },

    #[error("horizon {horizon} needs more than {max_slots} grid slots with {bounds} bounds")]
    HorizonTooLarge {
        horizon: u64,
        bounds: GridBounds,
        max_slots: u64,
    },

    #[error("invalid scan range: n_start={start} must be below n_end={end}")]
    InvalidRange { start: u64, end: u64 },

    #[error("invalid value for --{key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
