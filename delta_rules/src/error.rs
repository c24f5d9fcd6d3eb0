//! Error types for rule violations and configuration problems.

use std::path::PathBuf;
use thiserror::Error;

/// A progression update that would break a record invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RulesError {
    #[error("player handle must not be empty")]
    EmptyHandle,

    #[error("layer cannot move backwards (current {current}, requested {requested})")]
    LayerRegression { current: u32, requested: u32 },

    #[error("layer can only advance one step at a time (current {current}, requested {requested})")]
    LayerSkip { current: u32, requested: u32 },

    #[error("record changed since it was read (expected revision {expected}, found {current})")]
    StaleRecord { expected: u64, current: u64 },

    #[error("score must be a finite number, got {0}")]
    NonFiniteScore(f64),

    #[error("invalid score range [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },
}

/// Failure to read or validate a [`GameConfig`](crate::GameConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
