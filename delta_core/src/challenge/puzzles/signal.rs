//! Layer 3: pick the real pattern out of a list of hallucinated decoys.

use delta_rules::{AnswerKey, MissPolicy, ScoreRange};
use rand::seq::SliceRandom;
use rand::RngCore;

use super::entropy_sample;
use crate::challenge::{Challenge, ChallengeContext, Verdict};

const DECOY_COUNT: usize = 4;

fn pattern(rng: &mut dyn RngCore) -> String {
    let raw = entropy_sample(rng, 6);
    format!("{}-{}-{}", &raw[..2], &raw[2..4], &raw[4..])
}

/// Choose the pattern generated by the player's shadow.
#[derive(Debug, Clone)]
pub struct SignalInNoise {
    target: String,
    options: Vec<String>,
}

impl SignalInNoise {
    pub fn generate(ctx: &mut ChallengeContext<'_>) -> Self {
        let target = pattern(ctx.rng);
        let mut options: Vec<String> = (0..DECOY_COUNT).map(|_| pattern(ctx.rng)).collect();
        options.push(target.clone());
        options.shuffle(ctx.rng);
        Self { target, options }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }
}

impl Challenge for SignalInNoise {
    fn definition_id(&self) -> &'static str {
        "signal_in_noise"
    }

    fn prompt(&self) -> String {
        let listing: Vec<String> = self
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| format!("[{i}] {option}"))
            .collect();
        format!(
            "You are looking at a memory from a worldline you've never walked.\n\
             One of these patterns was generated by your Δ shadow.\n\
             Enter the pattern exactly as seen:\n{}",
            listing.join("\n")
        )
    }

    fn verify(&mut self, attempt: &str) -> Verdict {
        if AnswerKey::exact(self.target.clone()).matches(attempt) {
            Verdict::Solved
        } else {
            Verdict::Rejected
        }
    }

    fn max_attempts(&self) -> Option<u32> {
        Some(4)
    }

    fn reward_range(&self) -> ScoreRange {
        ScoreRange::new(0.02, 0.45)
    }

    fn miss_policy(&self) -> MissPolicy {
        MissPolicy::Drift { max: 0.05 }
    }

    fn feedback(&self, verdict: Verdict, attempt: &str, _rng: &mut dyn RngCore) -> Option<String> {
        if verdict != Verdict::Rejected {
            return None;
        }
        let attempt = attempt.trim();
        if self.options.iter().any(|o| o == attempt) {
            Some("That was close. Your shadow almost flickered.".to_string())
        } else {
            Some("You are choosing from hallucinations, not the real echoes.".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use delta_rules::{Handle, PlayerProgress};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn generate(seed: u64) -> SignalInNoise {
        let progress = PlayerProgress::new(Handle::new("alice").unwrap(), 0.666);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        SignalInNoise::generate(&mut ChallengeContext::new(&progress, &mut rng, Utc::now()))
    }

    #[test]
    fn test_target_is_among_options() {
        let challenge = generate(4);
        assert_eq!(challenge.options().len(), DECOY_COUNT + 1);
        assert!(challenge.options().iter().any(|o| o == challenge.target()));
        assert_eq!(challenge.target().len(), 8);
    }

    #[test]
    fn test_near_miss_feedback() {
        let mut challenge = generate(4);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let decoy = challenge
            .options()
            .iter()
            .find(|o| o.as_str() != challenge.target())
            .cloned()
            .unwrap();

        assert_eq!(challenge.verify(&decoy), Verdict::Rejected);
        let near = challenge.feedback(Verdict::Rejected, &decoy, &mut rng).unwrap();
        assert!(near.contains("close"));

        let far = challenge.feedback(Verdict::Rejected, "zz-zz-zz", &mut rng).unwrap();
        assert!(far.contains("hallucinations"));

        let target = challenge.target().to_string();
        assert_eq!(challenge.verify(&target), Verdict::Solved);
    }
}
