//! The challenge contract and the table of layers.
//!
//! A challenge is built fresh whenever the runner enters a layer:
//! 1. **Generate**: The layer definition builds the fixture from the random source
//!    or the player's log
//! 2. **Prompt**: The challenge renders what the operator sees
//! 3. **Verify**: Each attempt is checked against the fixture
//! 4. **Reward**: On success the challenge computes the score delta
//!
//! Challenges never touch the store. The runner commits whatever they decide.

pub mod puzzles;
mod registry;

pub use registry::*;

use chrono::{DateTime, Utc};
use delta_rules::{ExhaustionPolicy, MissPolicy, PlayerProgress, ScoreRange};
use rand::RngCore;

/// Everything a layer definition may read while generating its fixture.
pub struct ChallengeContext<'a> {
    /// The player's record. Read-only: generation must not change progress.
    pub progress: &'a PlayerProgress,
    pub rng: &'a mut dyn RngCore,
    pub now: DateTime<Utc>,
}

impl<'a> ChallengeContext<'a> {
    pub fn new(
        progress: &'a PlayerProgress,
        rng: &'a mut dyn RngCore,
        now: DateTime<Utc>,
    ) -> Self {
        Self { progress, rng, now }
    }
}

/// How the operator interacts with a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    /// One line of text per attempt.
    Line,
    /// No input; the runner polls [`Challenge::status`] until it unlocks.
    Timed,
}

/// Result of checking one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The challenge is complete.
    Solved,
    /// The attempt was wrong, empty or malformed.
    Rejected,
    /// One stage of a multi-stage challenge was cleared.
    StageCleared { remaining: usize },
}

/// State of a time-gated challenge at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStatus {
    Waiting,
    /// A decoy moment that looks like an unlock but is not.
    FalseSignal,
    RealUnlock,
}

/// A single puzzle unit.
pub trait Challenge {
    /// Stable identifier of the variant, e.g. `"entry_code"`.
    fn definition_id(&self) -> &'static str;

    /// Text shown to the operator for the current stage.
    fn prompt(&self) -> String;

    fn mode(&self) -> InteractionMode {
        InteractionMode::Line
    }

    /// Check an attempt. Must not have side effects beyond advancing the
    /// stage of a multi-stage challenge.
    fn verify(&mut self, attempt: &str) -> Verdict;

    /// Lock state at `now`. Only consulted for [`InteractionMode::Timed`].
    fn status(&self, _now: DateTime<Utc>) -> LockStatus {
        LockStatus::Waiting
    }

    /// Attempts allowed per stage. `None` means unlimited.
    fn max_attempts(&self) -> Option<u32>;

    /// Range the success reward is drawn from.
    fn reward_range(&self) -> ScoreRange;

    /// Score delta for solving the challenge after `mistakes` wrong attempts.
    fn reward(&self, rng: &mut dyn RngCore, _mistakes: u32) -> f64 {
        self.reward_range().sample(rng)
    }

    fn miss_policy(&self) -> MissPolicy {
        MissPolicy::Steady
    }

    fn exhaustion_policy(&self) -> ExhaustionPolicy {
        ExhaustionPolicy::Halt
    }

    /// Optional flavour line reacting to an attempt.
    fn feedback(
        &self,
        _verdict: Verdict,
        _attempt: &str,
        _rng: &mut dyn RngCore,
    ) -> Option<String> {
        None
    }
}
