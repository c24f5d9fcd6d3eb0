//! Layer 6: reverse a fragment of the player's own history.

use delta_rules::{mirror, AnswerKey, MissPolicy, ScoreRange};
use rand::RngCore;

use super::entropy_sample;
use crate::challenge::{Challenge, ChallengeContext, Verdict};

const FALLBACK_LEN: usize = 6;

/// Type the fragment backwards. Case-sensitive.
#[derive(Debug, Clone)]
pub struct MirrorTwin {
    fragment: String,
    answer: AnswerKey,
}

impl MirrorTwin {
    /// Third-from-last word of the log, or fresh entropy for a short log.
    pub fn generate(ctx: &mut ChallengeContext<'_>) -> Self {
        let tokens = ctx.progress.log_tokens();
        let fragment = if tokens.len() >= 3 {
            tokens[tokens.len() - 3].to_string()
        } else {
            entropy_sample(ctx.rng, FALLBACK_LEN)
        };
        Self::with_fragment(fragment)
    }

    pub fn with_fragment(fragment: impl Into<String>) -> Self {
        let fragment = fragment.into();
        Self {
            answer: AnswerKey::exact(mirror(&fragment)),
            fragment,
        }
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }
}

impl Challenge for MirrorTwin {
    fn definition_id(&self) -> &'static str {
        "mirror_twin"
    }

    fn prompt(&self) -> String {
        format!("Reverse this to prove you are not me: {}", self.fragment)
    }

    fn verify(&mut self, attempt: &str) -> Verdict {
        if self.answer.matches(attempt) {
            Verdict::Solved
        } else {
            Verdict::Rejected
        }
    }

    fn max_attempts(&self) -> Option<u32> {
        Some(3)
    }

    fn reward_range(&self) -> ScoreRange {
        ScoreRange::new(0.12, 0.38)
    }

    fn miss_policy(&self) -> MissPolicy {
        MissPolicy::Penalty(0.02)
    }

    fn feedback(&self, verdict: Verdict, _attempt: &str, _rng: &mut dyn RngCore) -> Option<String> {
        match verdict {
            Verdict::Solved => Some("You are not me. Not yet.".to_string()),
            Verdict::Rejected => {
                Some("Mirror cracked. Identity integrity compromised.".to_string())
            }
            Verdict::StageCleared { .. } => None,
        }
    }
}
