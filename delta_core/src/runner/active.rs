//! One challenge in flight: the per-layer state machine.
//!
//! Phases follow the life of a single layer:
//! 1. **Idle**: Nothing generated yet; no [`ActiveChallenge`] exists
//! 2. **Presenting**: The fixture exists and its prompt is being rendered
//! 3. **AwaitingInput**: Waiting for an attempt (or a poll, for timed challenges)
//! 4. **Verifying**: An attempt is being checked
//! 5. **Solved / Retrying / Exhausted**: The outcome of the last check
//!
//! Every call into challenge code goes through [`guard`], so a panicking
//! challenge surfaces as a [`ChallengeFault`] instead of unwinding through the
//! runner.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::{DateTime, Utc};
use delta_rules::{round_delta, ExhaustionPolicy, PlayerProgress};
use rand::RngCore;
use thiserror::Error;
use tracing::debug;

use crate::challenge::{
    Challenge, ChallengeContext, InteractionMode, LayerDefinition, LockStatus, Verdict,
};

/// Where a challenge is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Presenting,
    AwaitingInput,
    Verifying,
    Solved,
    Retrying,
    Exhausted,
}

impl Phase {
    /// Whether the layer is decided and ready to be committed.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Solved | Phase::Exhausted)
    }
}

/// A challenge panicked.
#[derive(Debug, Clone, Error)]
#[error("challenge `{challenge}` panicked: {message}")]
pub struct ChallengeFault {
    pub challenge: &'static str,
    pub message: String,
}

impl ChallengeFault {
    fn from_panic(challenge: &'static str, payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            text.to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self { challenge, message }
    }
}

/// Run challenge code, turning a panic into a [`ChallengeFault`].
pub fn guard<T>(challenge: &'static str, f: impl FnOnce() -> T) -> Result<T, ChallengeFault> {
    catch_unwind(AssertUnwindSafe(f))
        .map_err(|payload| ChallengeFault::from_panic(challenge, payload))
}

/// What one attempt did to the challenge.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptReport {
    pub verdict: Verdict,
    pub phase: Phase,
    /// The challenge's own reaction, if it has one.
    pub feedback: Option<String>,
    /// Attempts left on the current stage; `None` when unlimited.
    pub attempts_left: Option<u32>,
}

/// How a decided layer resolves into a commit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Advance one layer with `delta` added to the score.
    Advance { delta: f64, consolation: bool },
    /// Attempts ran out; the layer stays locked.
    Halt,
    /// Still in play.
    Pending,
}

/// A generated challenge plus its attempt bookkeeping.
pub struct ActiveChallenge {
    layer: u32,
    title: &'static str,
    challenge: Box<dyn Challenge>,
    phase: Phase,
    attempts: u32,
    stage_attempts: u32,
    mistakes: u32,
    pending_drift: f64,
}

impl std::fmt::Debug for ActiveChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveChallenge")
            .field("layer", &self.layer)
            .field("title", &self.title)
            .field("phase", &self.phase)
            .field("attempts", &self.attempts)
            .field("mistakes", &self.mistakes)
            .field("pending_drift", &self.pending_drift)
            .finish_non_exhaustive()
    }
}

impl ActiveChallenge {
    /// Generate the challenge for `definition` from the player's record.
    ///
    /// Generation draws from `rng` before anything else touches it, so a
    /// seeded source always produces the same fixture for the same layer.
    pub fn enter(
        definition: &LayerDefinition,
        progress: &PlayerProgress,
        rng: &mut dyn RngCore,
        now: DateTime<Utc>,
    ) -> Result<Self, ChallengeFault> {
        let challenge = guard(definition.id, || {
            let mut ctx = ChallengeContext::new(progress, rng, now);
            definition.generate(&mut ctx)
        })?;
        debug!(layer = progress.layer, id = definition.id, "challenge generated");
        Ok(Self::from_boxed(progress.layer, definition.title, challenge))
    }

    /// Wrap an already built challenge.
    pub fn from_boxed(layer: u32, title: &'static str, challenge: Box<dyn Challenge>) -> Self {
        Self {
            layer,
            title,
            challenge,
            phase: Phase::Presenting,
            attempts: 0,
            stage_attempts: 0,
            mistakes: 0,
            pending_drift: 0.0,
        }
    }

    pub fn layer(&self) -> u32 {
        self.layer
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn id(&self) -> &'static str {
        self.challenge.definition_id()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    /// Score drift accumulated from misses, not yet committed.
    pub fn pending_drift(&self) -> f64 {
        self.pending_drift
    }

    pub fn mode(&self) -> Result<InteractionMode, ChallengeFault> {
        guard(self.id(), || self.challenge.mode())
    }

    /// Render the prompt for the current stage and start waiting for input.
    pub fn present(&mut self) -> Result<String, ChallengeFault> {
        let id = self.id();
        let prompt = guard(id, || self.challenge.prompt())?;
        self.phase = Phase::AwaitingInput;
        Ok(prompt)
    }

    /// Check one attempt.
    pub fn submit(
        &mut self,
        attempt: &str,
        rng: &mut dyn RngCore,
    ) -> Result<AttemptReport, ChallengeFault> {
        let id = self.id();
        self.phase = Phase::Verifying;
        let verdict = guard(id, || self.challenge.verify(attempt))?;
        self.attempts += 1;
        self.stage_attempts += 1;

        let max = guard(id, || self.challenge.max_attempts())?;
        self.phase = match verdict {
            Verdict::Solved => Phase::Solved,
            Verdict::StageCleared { .. } => {
                self.stage_attempts = 0;
                Phase::AwaitingInput
            }
            Verdict::Rejected => {
                self.mistakes += 1;
                let policy = guard(id, || self.challenge.miss_policy())?;
                self.pending_drift = round_delta(self.pending_drift + policy.score_change(rng));
                match max {
                    Some(max) if self.stage_attempts >= max => Phase::Exhausted,
                    _ => Phase::Retrying,
                }
            }
        };
        debug!(
            layer = self.layer,
            id,
            ?verdict,
            attempts = self.attempts,
            phase = ?self.phase,
            "attempt verified"
        );

        let feedback = guard(id, || self.challenge.feedback(verdict, attempt, rng))?;
        let attempts_left = max.map(|max| max.saturating_sub(self.stage_attempts));
        Ok(AttemptReport {
            verdict,
            phase: self.phase,
            feedback,
            attempts_left,
        })
    }

    /// Check a timed challenge's lock at `now`.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Result<LockStatus, ChallengeFault> {
        let status = guard(self.id(), || self.challenge.status(now))?;
        if status == LockStatus::RealUnlock {
            self.phase = Phase::Solved;
        }
        Ok(status)
    }

    /// Decide how the layer settles. Draws the reward once the layer is over.
    pub fn resolve(&self, rng: &mut dyn RngCore) -> Result<Resolution, ChallengeFault> {
        let id = self.id();
        match self.phase {
            Phase::Solved => {
                let delta = guard(id, || self.challenge.reward(rng, self.mistakes))?;
                Ok(Resolution::Advance {
                    delta: round_delta(delta.max(0.0)),
                    consolation: false,
                })
            }
            Phase::Exhausted => match guard(id, || self.challenge.exhaustion_policy())? {
                ExhaustionPolicy::Halt => Ok(Resolution::Halt),
                ExhaustionPolicy::Consolation(range) => Ok(Resolution::Advance {
                    delta: range.sample(rng),
                    consolation: true,
                }),
            },
            _ => Ok(Resolution::Pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::puzzles::{Calibration, MirrorTwin};
    use delta_rules::ScoreRange;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct Exploding;

    impl Challenge for Exploding {
        fn definition_id(&self) -> &'static str {
            "exploding"
        }

        fn prompt(&self) -> String {
            "boom?".to_string()
        }

        fn verify(&mut self, _attempt: &str) -> Verdict {
            panic!("fixture went missing")
        }

        fn max_attempts(&self) -> Option<u32> {
            None
        }

        fn reward_range(&self) -> ScoreRange {
            ScoreRange::new(0.1, 0.2)
        }
    }

    #[test]
    fn test_solve_then_resolve() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut active = ActiveChallenge::from_boxed(
            5,
            "MIRROR SELF",
            Box::new(MirrorTwin::with_fragment("delta")),
        );
        assert_eq!(active.phase(), Phase::Presenting);
        assert_eq!(active.present().unwrap(), "Reverse this to prove you are not me: delta");
        assert_eq!(active.phase(), Phase::AwaitingInput);

        let miss = active.submit("delta", &mut rng).unwrap();
        assert_eq!(miss.phase, Phase::Retrying);
        assert_eq!(miss.attempts_left, Some(2));
        assert_eq!(active.resolve(&mut rng).unwrap(), Resolution::Pending);

        let hit = active.submit("atled", &mut rng).unwrap();
        assert_eq!(hit.verdict, Verdict::Solved);
        match active.resolve(&mut rng).unwrap() {
            Resolution::Advance { delta, consolation } => {
                assert!(!consolation);
                assert!((0.12..=0.38).contains(&delta));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(active.mistakes(), 1);
        assert_eq!(active.pending_drift(), -0.02);
    }

    #[test]
    fn test_exhaustion_halts() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut active = ActiveChallenge::from_boxed(
            5,
            "MIRROR SELF",
            Box::new(MirrorTwin::with_fragment("delta")),
        );
        for _ in 0..3 {
            active.submit("nope", &mut rng).unwrap();
        }
        assert_eq!(active.phase(), Phase::Exhausted);
        assert_eq!(active.resolve(&mut rng).unwrap(), Resolution::Halt);
    }

    #[test]
    fn test_stage_attempts_reset() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut active =
            ActiveChallenge::from_boxed(11, "CALIBRATION", Box::new(Calibration::new()));

        active.submit("0", &mut rng).unwrap();
        active.submit("0", &mut rng).unwrap();
        let cleared = active.submit("23", &mut rng).unwrap();
        assert_eq!(cleared.verdict, Verdict::StageCleared { remaining: 4 });
        assert_eq!(cleared.attempts_left, Some(3));

        // Two misses on the new stage still leave one attempt.
        active.submit("0", &mut rng).unwrap();
        let report = active.submit("0", &mut rng).unwrap();
        assert_eq!(report.phase, Phase::Retrying);
        assert_eq!(active.mistakes(), 4);
    }

    #[test]
    fn test_panic_becomes_fault() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut active = ActiveChallenge::from_boxed(0, "EXPLODING", Box::new(Exploding));
        let fault = active.submit("anything", &mut rng).unwrap_err();
        assert_eq!(fault.challenge, "exploding");
        assert!(fault.message.contains("fixture went missing"));
    }
}
