//! Layer 7: decode a mirrored word while the feedback occasionally lies.

use delta_rules::{mirror, AnswerKey, ExhaustionPolicy, ScoreRange};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::challenge::{Challenge, ChallengeContext, Verdict};

pub const INVERTED_WORDS: [&str; 5] = ["signal", "encode", "mirror", "cipher", "twist"];

const DECEPTION_CHANCE: f64 = 0.4;

const REJECTIONS: [&str; 4] = [
    "No. Try again.",
    "That's not it. Keep turning it.",
    "Wrong symmetry.",
    "You were close... but wrong matters more here.",
];

/// Decode the reversed word. When `deceptive`, wrong answers are met with
/// praise, but the verdict still rejects them.
#[derive(Debug, Clone)]
pub struct InvertedWord {
    word: String,
    answer: AnswerKey,
    deceptive: bool,
}

impl InvertedWord {
    pub fn generate(ctx: &mut ChallengeContext<'_>) -> Self {
        let word = INVERTED_WORDS.choose(ctx.rng).copied().unwrap_or("signal");
        let deceptive = ctx.rng.gen_bool(DECEPTION_CHANCE);
        Self::new(word, deceptive)
    }

    pub fn new(word: &str, deceptive: bool) -> Self {
        Self {
            word: word.to_string(),
            answer: AnswerKey::ignore_case(word),
            deceptive,
        }
    }

    pub fn shown(&self) -> String {
        mirror(&self.word)
    }

    pub fn is_deceptive(&self) -> bool {
        self.deceptive
    }
}

impl Challenge for InvertedWord {
    fn definition_id(&self) -> &'static str {
        "inverted_word"
    }

    fn prompt(&self) -> String {
        format!(
            "A word has been mirrored and shown to you: {}\nDecode it and enter the original word.",
            self.shown()
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
        ScoreRange::new(0.13, 0.34)
    }

    fn exhaustion_policy(&self) -> ExhaustionPolicy {
        ExhaustionPolicy::Consolation(ScoreRange::new(0.05, 0.1))
    }

    fn feedback(&self, verdict: Verdict, _attempt: &str, rng: &mut dyn RngCore) -> Option<String> {
        let line = match verdict {
            Verdict::Solved => "Yes. You broke the inversion.",
            Verdict::Rejected if self.deceptive => "Correct. Or... at least, close enough.",
            Verdict::Rejected => REJECTIONS.choose(rng).copied().unwrap_or(REJECTIONS[0]),
            Verdict::StageCleared { .. } => return None,
        };
        Some(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_decode_ignores_case() {
        let mut challenge = InvertedWord::new("cipher", false);
        assert_eq!(challenge.shown(), "rehpic");
        assert_eq!(challenge.verify("CIPHER"), Verdict::Solved);
        assert_eq!(challenge.verify("rehpic"), Verdict::Rejected);
    }

    #[test]
    fn test_deception_is_flavour_only() {
        let mut challenge = InvertedWord::new("twist", true);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let verdict = challenge.verify("wrong");
        assert_eq!(verdict, Verdict::Rejected);
        let line = challenge.feedback(verdict, "wrong", &mut rng).unwrap();
        assert!(line.starts_with("Correct."));
    }

    #[test]
    fn test_honest_rejection_comes_from_pool() {
        let challenge = InvertedWord::new("twist", false);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let line = challenge.feedback(Verdict::Rejected, "wrong", &mut rng).unwrap();
        assert!(REJECTIONS.contains(&line.as_str()));
    }

    #[test]
    fn test_exhaustion_consoles() {
        let challenge = InvertedWord::new("mirror", false);
        assert!(matches!(challenge.exhaustion_policy(), ExhaustionPolicy::Consolation(_)));
    }
}
