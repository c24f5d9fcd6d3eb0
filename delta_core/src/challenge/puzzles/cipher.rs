//! Layer 2: a Caesar-shifted keyword wrapped in base64 with trailing noise.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use delta_rules::{caesar_shift, AnswerKey, MissPolicy, ScoreRange};
use rand::Rng;

use super::entropy_sample;
use crate::challenge::{Challenge, ChallengeContext, Verdict};

const KEYWORD_LEN: usize = 6;
const NOISE_LEN: usize = 8;

/// Recover the keyword from `base64(caesar(keyword) + noise)`.
#[derive(Debug, Clone)]
pub struct CaesarCipher {
    answer: AnswerKey,
    shift: u8,
    encoded: String,
}

impl CaesarCipher {
    pub fn generate(ctx: &mut ChallengeContext<'_>) -> Self {
        let keyword = entropy_sample(ctx.rng, KEYWORD_LEN);
        let shift = ctx.rng.gen_range(3..=13);
        let noise = entropy_sample(ctx.rng, NOISE_LEN);
        Self::from_parts(&keyword, shift, &noise)
    }

    pub fn from_parts(keyword: &str, shift: u8, noise: &str) -> Self {
        let padded = format!("{}{}", caesar_shift(keyword, shift), noise);
        Self {
            answer: AnswerKey::ignore_case(keyword),
            shift,
            encoded: STANDARD.encode(padded.as_bytes()),
        }
    }

    pub fn shift(&self) -> u8 {
        self.shift
    }

    pub fn encoded(&self) -> &str {
        &self.encoded
    }
}

impl Challenge for CaesarCipher {
    fn definition_id(&self) -> &'static str {
        "caesar_cipher"
    }

    fn prompt(&self) -> String {
        format!(
            "Find the Caesar-locked keyword hidden within this:\n[{}]\n\
             The first {} characters are the lock; the rest is noise.\n\
             Only the untouched mind will see it.",
            self.encoded, KEYWORD_LEN
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
        None
    }

    fn reward_range(&self) -> ScoreRange {
        ScoreRange::new(0.01, 0.4)
    }

    fn miss_policy(&self) -> MissPolicy {
        MissPolicy::Drift { max: 0.05 }
    }
}
