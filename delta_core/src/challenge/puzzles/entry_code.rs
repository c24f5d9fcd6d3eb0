//! Layer 1: a six character code hidden in a hash of random entropy.

use delta_rules::{AnswerKey, MissPolicy, ScoreRange};
use rand::seq::SliceRandom;
use rand::RngCore;
use sha2::{Digest, Sha256};

use super::entropy_sample;
use crate::challenge::{Challenge, ChallengeContext, Verdict};

/// Length of the code the operator has to submit.
pub const ENTRY_CODE_LEN: usize = 6;

/// First `ENTRY_CODE_LEN` hex digits of the SHA-256 of `entropy`.
pub fn entry_code_for(entropy: &str) -> String {
    let digest = Sha256::digest(entropy.as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(ENTRY_CODE_LEN);
    hex
}

/// Submit the code whose characters are shown shuffled.
#[derive(Debug, Clone)]
pub struct EntryCode {
    answer: AnswerKey,
    solution: String,
    scrambled: String,
    score_at_entry: f64,
}

impl EntryCode {
    pub fn generate(ctx: &mut ChallengeContext<'_>) -> Self {
        let entropy = entropy_sample(ctx.rng, 32);
        Self::from_entropy(&entropy, ctx.progress.score, ctx.rng)
    }

    pub fn from_entropy(entropy: &str, score: f64, rng: &mut dyn RngCore) -> Self {
        let solution = entry_code_for(entropy);
        let mut chars: Vec<char> = solution.chars().collect();
        chars.shuffle(rng);
        Self {
            answer: AnswerKey::exact(solution.clone()),
            scrambled: chars.into_iter().collect(),
            solution,
            score_at_entry: score,
        }
    }

    pub fn solution(&self) -> &str {
        &self.solution
    }
}

impl Challenge for EntryCode {
    fn definition_id(&self) -> &'static str {
        "entry_code"
    }

    fn prompt(&self) -> String {
        format!(
            "Seek within chaos: {}\nFind the unmoved mover, Δ = {:.3}\nSubmit a {}-character code:",
            self.scrambled, self.score_at_entry, ENTRY_CODE_LEN
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
        ScoreRange::new(0.01, 0.5)
    }

    fn miss_policy(&self) -> MissPolicy {
        MissPolicy::Drift { max: 0.05 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_code_is_hash_prefix() {
        // SHA-256("abc") = ba7816bf...
        assert_eq!(entry_code_for("abc"), "ba7816");
    }

    #[test]
    fn test_scrambled_is_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let challenge = EntryCode::from_entropy("abc", 0.666, &mut rng);

        let mut shown: Vec<char> = challenge.scrambled.chars().collect();
        let mut real: Vec<char> = challenge.solution().chars().collect();
        shown.sort_unstable();
        real.sort_unstable();
        assert_eq!(shown, real);
        assert!(challenge.prompt().contains(&challenge.scrambled));
    }

    #[test]
    fn test_verify() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut challenge = EntryCode::from_entropy("abc", 0.666, &mut rng);

        assert_eq!(challenge.verify("ba7816"), Verdict::Solved);
        assert_eq!(challenge.verify(" ba7816 "), Verdict::Solved);
        assert_eq!(challenge.verify("BA7816"), Verdict::Rejected);
        assert_eq!(challenge.verify(""), Verdict::Rejected);
    }
}
