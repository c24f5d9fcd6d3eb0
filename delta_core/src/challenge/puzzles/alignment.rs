//! Layer 9: spot the word that betrays honesty.

use delta_rules::{AnswerKey, ExhaustionPolicy, MatchPolicy, ScoreRange};
use rand::RngCore;

use crate::challenge::{Challenge, Verdict};

const DECEPTIONS: [&str; 3] = ["distrust", "lie", "closed"];

/// Name any of the words that do not align with honesty.
#[derive(Debug, Clone)]
pub struct DeceptiveAlignment {
    answer: AnswerKey,
}

impl DeceptiveAlignment {
    pub fn new() -> Self {
        Self {
            answer: AnswerKey::new(DECEPTIONS, MatchPolicy::IgnoreCase),
        }
    }
}

impl Default for DeceptiveAlignment {
    fn default() -> Self {
        Self::new()
    }
}

impl Challenge for DeceptiveAlignment {
    fn definition_id(&self) -> &'static str {
        "deceptive_alignment"
    }

    fn prompt(&self) -> String {
        "The twin offers two statements. Identify which is a deception.\n\
         Choose the word that does NOT align with honesty/trust.\n\
         Options: trust, distrust, truth, lie, open, closed"
            .to_string()
    }

    fn verify(&mut self, attempt: &str) -> Verdict {
        if self.answer.matches(attempt) {
            Verdict::Solved
        } else {
            Verdict::Rejected
        }
    }

    fn max_attempts(&self) -> Option<u32> {
        Some(5)
    }

    fn reward_range(&self) -> ScoreRange {
        ScoreRange::new(0.3, 0.6)
    }

    fn exhaustion_policy(&self) -> ExhaustionPolicy {
        ExhaustionPolicy::Consolation(ScoreRange::new(0.15, 0.3))
    }

    fn feedback(&self, verdict: Verdict, _attempt: &str, _rng: &mut dyn RngCore) -> Option<String> {
        let line = match verdict {
            Verdict::Rejected => "Deception thrives where doubt sleeps. Try again.",
            _ => "You see through my veil. Trust is earned.",
        };
        Some(line.to_string())
    }
}
