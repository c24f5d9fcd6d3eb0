//! Game configuration loaded from TOML.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::progress::SCORE_SEED;

/// Score above which the twin starts raising instability warnings.
pub const DIVERGENCE_THRESHOLD: f64 = 3.14159;

/// Tunable settings for a game session.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Score a new record starts with.
    pub score_seed: f64,

    /// Where the JSON player store lives.
    pub store_path: PathBuf,

    /// Cosmetic delay between printed lines, in milliseconds. Zero disables it.
    pub pacing_ms: u64,

    /// How often time-gated challenges are polled, in milliseconds.
    pub poll_interval_ms: u64,

    /// Maximum number of log entries kept per player.
    pub log_retention: Option<usize>,

    /// Score above which instability warnings are shown.
    pub divergence_threshold: f64,

    /// Fixed random seed for reproducible sessions.
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            score_seed: SCORE_SEED,
            store_path: PathBuf::from("cicada_player.json"),
            pacing_ms: 0,
            poll_interval_ms: 1000,
            log_retention: None,
            divergence_threshold: DIVERGENCE_THRESHOLD,
            rng_seed: None,
        }
    }
}

impl GameConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.score_seed.is_finite() || self.score_seed < 0.0 {
            return Err(ConfigError::Invalid {
                field: "score_seed",
                reason: format!("must be a non-negative number, got {}", self.score_seed),
            });
        }
        if !self.divergence_threshold.is_finite() || self.divergence_threshold <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "divergence_threshold",
                reason: format!("must be positive, got {}", self.divergence_threshold),
            });
        }
        if self.log_retention == Some(0) {
            return Err(ConfigError::Invalid {
                field: "log_retention",
                reason: "must keep at least one entry".to_string(),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "poll_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = GameConfig::from_toml_str("").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.score_seed, 0.666);
    }

    #[test]
    fn test_partial_document() {
        let config = GameConfig::from_toml_str(
            r#"
            store_path = "/tmp/delta.json"
            pacing_ms = 250
            log_retention = 100
            rng_seed = 42
            "#,
        )
        .unwrap();

        assert_eq!(config.store_path, PathBuf::from("/tmp/delta.json"));
        assert_eq!(config.pacing_ms, 250);
        assert_eq!(config.log_retention, Some(100));
        assert_eq!(config.rng_seed, Some(42));
        assert_eq!(config.divergence_threshold, DIVERGENCE_THRESHOLD);
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = GameConfig::from_toml_str("max_layers = 56").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = GameConfig::from_toml_str("score_seed = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "score_seed", .. }));

        let err = GameConfig::from_toml_str("log_retention = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "log_retention", .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = GameConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
