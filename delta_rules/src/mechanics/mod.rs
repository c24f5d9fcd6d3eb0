//! Game mechanics: score arithmetic, reward ranges, failure policies and the
//! divergence scale.

mod cipher;
mod matching;

pub use cipher::*;
pub use matching::*;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::RulesError;

/// Round a stored score to 6 decimal places.
pub fn round_score(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Round a reward delta to 4 decimal places.
pub fn round_delta(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Inclusive range a score delta is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl ScoreRange {
    /// Build a range for static tables. Use [`ScoreRange::checked`] for
    /// values that come from outside the crate.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Build a range, rejecting negative, inverted or non-finite bounds.
    pub fn checked(min: f64, max: f64) -> Result<Self, RulesError> {
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            return Err(RulesError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Draw a delta, rounded to 4 decimals and kept inside the range.
    pub fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        let raw = rng.gen_range(self.min..=self.max);
        round_delta(raw).clamp(self.min, self.max)
    }

    /// Whether `value` lies inside the range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// What a failed attempt does to the pending score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum MissPolicy {
    /// Nothing happens.
    #[default]
    Steady,
    /// Random drift up or down, magnitude at most `max`.
    Drift { max: f64 },
    /// Fixed deduction.
    Penalty(f64),
}

impl MissPolicy {
    /// Score change caused by one miss.
    pub fn score_change(&self, rng: &mut dyn RngCore) -> f64 {
        match self {
            MissPolicy::Steady => 0.0,
            MissPolicy::Drift { max } => {
                let magnitude = rng.gen_range(0.0..=*max);
                let signed = if rng.gen_bool(0.5) { magnitude } else { -magnitude };
                round_delta(signed)
            }
            MissPolicy::Penalty(amount) => -amount.abs(),
        }
    }
}

/// What happens once a challenge runs out of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum ExhaustionPolicy {
    /// No progress; the layer stays where it is.
    #[default]
    Halt,
    /// Soft-fail forward: advance with a reduced reward drawn from the range.
    Consolation(ScoreRange),
}

/// Coarse classification of a score relative to the instability threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DivergenceLevel {
    Stable,
    Unstable,
    Critical,
    Overload,
}

/// Width of the rendered divergence meter in cells.
pub const METER_WIDTH: usize = 50;

impl DivergenceLevel {
    /// Classify `score` as a fraction of `threshold`.
    pub fn classify(score: f64, threshold: f64) -> Self {
        let ratio = if threshold > 0.0 { score / threshold } else { 1.0 };
        if ratio < 0.3 {
            DivergenceLevel::Stable
        } else if ratio < 0.6 {
            DivergenceLevel::Unstable
        } else if ratio < 0.85 {
            DivergenceLevel::Critical
        } else {
            DivergenceLevel::Overload
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DivergenceLevel::Stable => "STABLE",
            DivergenceLevel::Unstable => "UNSTABLE",
            DivergenceLevel::Critical => "CRITICAL",
            DivergenceLevel::Overload => "OVERLOAD",
        }
    }
}

/// Render the divergence meter: `|####----| 1.2345 - UNSTABLE`.
pub fn render_meter(score: f64, threshold: f64) -> String {
    let ratio = if threshold > 0.0 {
        (score / threshold).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let filled = (ratio * METER_WIDTH as f64) as usize;
    format!(
        "|{}{}| {:.4} - {}",
        "#".repeat(filled),
        "-".repeat(METER_WIDTH - filled),
        score,
        DivergenceLevel::classify(score, threshold).label()
    )
}

/// Voice of the twin, chosen by the player's current score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TwinTone {
    Cold,
    Ambiguous,
    Unstable,
}

impl TwinTone {
    pub fn for_score(score: f64) -> Self {
        if score < 0.5 {
            TwinTone::Cold
        } else if score < 1.5 {
            TwinTone::Ambiguous
        } else {
            TwinTone::Unstable
        }
    }
}
