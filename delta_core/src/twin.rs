//! The twin: a flavour voice whose tone tracks the player's divergence.
//!
//! Nothing here affects progression. Every line is derived from the score and
//! the injected random source, so a seeded session replays the same chatter.

use delta_rules::{DivergenceLevel, TwinTone};
use rand::seq::SliceRandom;
use rand::RngCore;

/// Name the twin signs its lines with.
pub const TWIN_ID: &str = "Δ_Twin_v0.1";

const SUCCESS_LINES: [&str; 4] = [
    "Correct. But you should ask why this was even asked.",
    "Well done. Did it really end here though?",
    "Yes. But something else just began.",
    "You cracked it. But who set it?",
];

const FAILURE_LINES: [&str; 5] = [
    "No.",
    "Wrong.",
    "Try again.",
    "Incorrect, but warmer.",
    "Δ shifted slightly.",
];

const GLITCHES: [&str; 3] = [
    "[TWIN ERROR] Δ overflow detected. Branch conflict.",
    "[Δ ANOMALY] Echo loop forming. Observing observer.",
    "[ERROR 404] Twin cannot distinguish self from you.",
];

fn pick<'a>(lines: &[&'a str], rng: &mut dyn RngCore) -> &'a str {
    lines.choose(rng).copied().unwrap_or_default()
}

/// Stateless voice. Construct one per session or per line, it makes no
/// difference.
#[derive(Debug, Clone, Copy, Default)]
pub struct Twin;

impl Twin {
    /// Render `message` in the tone matching `score`.
    ///
    /// Cold and ambiguous tones replace the message with a stock line; the
    /// unstable tone shuffles its characters.
    pub fn speak(&self, message: &str, score: f64, rng: &mut dyn RngCore) -> String {
        match TwinTone::for_score(score) {
            TwinTone::Cold => {
                format!("[{TWIN_ID} - COLD] That question has already been answered.")
            }
            TwinTone::Ambiguous => {
                format!("[{TWIN_ID} - AMBIGUOUS] Some doors open only when you stop asking.")
            }
            TwinTone::Unstable => {
                let mut chars: Vec<char> = message.chars().collect();
                chars.shuffle(rng);
                format!("[{TWIN_ID} - UNSTABLE] {}", chars.into_iter().collect::<String>())
            }
        }
    }

    /// A line reacting to a pass or a fail, chosen at random.
    pub fn intermittent_feedback(&self, passed: bool, rng: &mut dyn RngCore) -> &'static str {
        if passed {
            pick(&SUCCESS_LINES, rng)
        } else {
            pick(&FAILURE_LINES, rng)
        }
    }

    /// A glitch banner once `score` has crossed `threshold`.
    pub fn instability_warning(
        &self,
        score: f64,
        threshold: f64,
        rng: &mut dyn RngCore,
    ) -> Option<String> {
        (score > threshold).then(|| format!(">> INSTABILITY WARNING: {}", pick(&GLITCHES, rng)))
    }

    /// The twin's remark on the meter level.
    pub fn meter_warning(&self, level: DivergenceLevel) -> &'static str {
        match level {
            DivergenceLevel::Stable => "You seem steady... for now.",
            DivergenceLevel::Unstable => "Fluctuations rising. Brace yourself.",
            DivergenceLevel::Critical => "Δ nearing dangerous levels.",
            DivergenceLevel::Overload => "Warning! Δ beyond control!",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_tone_follows_score() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let twin = Twin;

        assert!(twin.speak("hello", 0.2, &mut rng).contains("- COLD]"));
        assert!(twin.speak("hello", 1.0, &mut rng).contains("- AMBIGUOUS]"));
        assert!(twin.speak("hello", 2.0, &mut rng).contains("- UNSTABLE]"));
    }

    #[test]
    fn test_unstable_shuffles_message() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let line = Twin.speak("signal lost", 5.0, &mut rng);
        let body = line.split("] ").nth(1).unwrap();

        let mut shown: Vec<char> = body.chars().collect();
        let mut original: Vec<char> = "signal lost".chars().collect();
        shown.sort_unstable();
        original.sort_unstable();
        assert_eq!(shown, original);
    }

    #[test]
    fn test_feedback_pools() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(SUCCESS_LINES.contains(&Twin.intermittent_feedback(true, &mut rng)));
        assert!(FAILURE_LINES.contains(&Twin.intermittent_feedback(false, &mut rng)));
    }

    #[test]
    fn test_instability_only_above_threshold() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(Twin.instability_warning(3.0, 3.14159, &mut rng).is_none());
        let warning = Twin.instability_warning(3.2, 3.14159, &mut rng).unwrap();
        assert!(warning.starts_with(">> INSTABILITY WARNING:"));
    }
}
