//! Layer 10: a relic message hidden in base64.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use delta_rules::{AnswerKey, ExhaustionPolicy, ScoreRange};
use rand::RngCore;

use crate::challenge::{Challenge, Verdict};

pub const IBN5100_PLAINTEXT: &str = "I like to think like a computer.";

/// Decode the message and type it back exactly, punctuation included.
#[derive(Debug, Clone)]
pub struct Ibn5100 {
    encoded: String,
    answer: AnswerKey,
}

impl Ibn5100 {
    pub fn new() -> Self {
        Self {
            encoded: STANDARD.encode(IBN5100_PLAINTEXT),
            answer: AnswerKey::exact(IBN5100_PLAINTEXT),
        }
    }

    pub fn encoded(&self) -> &str {
        &self.encoded
    }
}

impl Default for Ibn5100 {
    fn default() -> Self {
        Self::new()
    }
}

impl Challenge for Ibn5100 {
    fn definition_id(&self) -> &'static str {
        "ibn5100"
    }

    fn prompt(&self) -> String {
        format!(
            "Decode the following base64-encoded message:\n{}\nType the decoded English phrase exactly:",
            self.encoded
        )
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
        ScoreRange::new(0.4, 0.7)
    }

    fn exhaustion_policy(&self) -> ExhaustionPolicy {
        ExhaustionPolicy::Consolation(ScoreRange::new(0.2, 0.35))
    }

    fn feedback(&self, verdict: Verdict, _attempt: &str, _rng: &mut dyn RngCore) -> Option<String> {
        let line = match verdict {
            Verdict::Rejected => "The past holds secrets. Base64 hides truth from the unready.",
            _ => "Ah, the IBN 5100. A relic, a key. You decode with precision.",
        };
        Some(line.to_string())
    }
}
