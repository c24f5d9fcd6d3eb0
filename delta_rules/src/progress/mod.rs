//! Player progression state - the record the whole game revolves around.

mod log;

pub use log::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RulesError;
use crate::mechanics::round_score;

/// Starting divergence for every new player.
pub const SCORE_SEED: f64 = 0.666;

/// Lowest score a record may hold.
pub const SCORE_FLOOR: f64 = 0.0;

/// Unique identifier for player records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated player handle: trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    /// Parse a raw handle as typed by the operator.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, RulesError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RulesError::EmptyHandle);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Handle {
    type Error = RulesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Handle> for String {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Field-level change to a [`PlayerProgress`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProgressUpdate {
    /// Set the layer index. Must equal the current layer or the one after it.
    Layer(u32),
    /// Set the score. Clamped to [`SCORE_FLOOR`] and rounded.
    Score(f64),
    /// Append one entry to the event log.
    AppendLog(LogEntry),
}

/// The durable progression record of one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProgress {
    pub id: PlayerId,
    pub handle: Handle,
    /// Index of the next unsolved layer.
    pub layer: u32,
    /// Accumulated divergence.
    pub score: f64,
    #[serde(default)]
    pub log: Vec<LogEntry>,
    pub created_at: DateTime<Utc>,
    /// Number of committed batches. Guards writes made from an older copy.
    #[serde(default)]
    pub revision: u64,
}

impl PlayerProgress {
    /// Create a fresh record at layer 0 with the given seed score.
    pub fn new(handle: Handle, seed: f64) -> Self {
        Self {
            id: PlayerId::new(),
            handle,
            layer: 0,
            score: clamp_score(seed),
            log: Vec::new(),
            created_at: Utc::now(),
            revision: 0,
        }
    }

    /// Apply one field update, enforcing the record invariants.
    pub fn apply(&mut self, update: ProgressUpdate) -> Result<(), RulesError> {
        match update {
            ProgressUpdate::Layer(requested) => {
                if requested < self.layer {
                    return Err(RulesError::LayerRegression {
                        current: self.layer,
                        requested,
                    });
                }
                if requested > self.layer + 1 {
                    return Err(RulesError::LayerSkip {
                        current: self.layer,
                        requested,
                    });
                }
                self.layer = requested;
            }
            ProgressUpdate::Score(value) => {
                if !value.is_finite() {
                    return Err(RulesError::NonFiniteScore(value));
                }
                self.score = clamp_score(value);
            }
            ProgressUpdate::AppendLog(entry) => self.log.push(entry),
        }
        Ok(())
    }

    /// Apply a batch of updates all-or-nothing and bump the revision.
    pub fn apply_all(
        &mut self,
        updates: impl IntoIterator<Item = ProgressUpdate>,
    ) -> Result<(), RulesError> {
        let mut staged = self.clone();
        for update in updates {
            staged.apply(update)?;
        }
        staged.revision += 1;
        *self = staged;
        Ok(())
    }

    /// Like [`PlayerProgress::apply_all`], but only if nobody has committed
    /// since `expected` was read.
    pub fn apply_at(
        &mut self,
        expected: u64,
        updates: impl IntoIterator<Item = ProgressUpdate>,
    ) -> Result<(), RulesError> {
        if self.revision != expected {
            return Err(RulesError::StaleRecord {
                expected,
                current: self.revision,
            });
        }
        self.apply_all(updates)
    }

    /// Drop the oldest log entries so at most `cap` remain.
    pub fn trim_log(&mut self, cap: usize) {
        if self.log.len() > cap {
            let excess = self.log.len() - cap;
            self.log.drain(..excess);
        }
    }

    /// The most recent `count` log entries, newest first.
    pub fn recent_log(&self, count: usize) -> Vec<&LogEntry> {
        self.log.iter().rev().take(count).collect()
    }

    /// Every whitespace-separated word across the log, oldest first.
    pub fn log_tokens(&self) -> Vec<&str> {
        self.log.iter().flat_map(|entry| entry.tokens()).collect()
    }
}

fn clamp_score(value: f64) -> f64 {
    round_score(value.max(SCORE_FLOOR))
}
