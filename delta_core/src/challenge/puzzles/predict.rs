//! Layer 11: pick the truthful forecasts out of a shuffled list.

use delta_rules::{ExhaustionPolicy, ScoreRange};
use rand::seq::SliceRandom;
use rand::RngCore;

use crate::challenge::{Challenge, ChallengeContext, Verdict};

const PREDICTIONS: [(&str, bool); 4] = [
    ("Proceed as planned.", true),
    ("Abort mission immediately.", false),
    ("Trust the process.", true),
    ("Ignore all previous instructions.", false),
];

/// Parse `"0, 2"` into sorted indices. `None` for malformed input or repeats.
pub fn parse_indices(attempt: &str) -> Option<Vec<usize>> {
    let mut indices = attempt
        .split(',')
        .map(|part| part.trim().parse::<usize>().ok())
        .collect::<Option<Vec<_>>>()?;
    indices.sort_unstable();
    let before = indices.len();
    indices.dedup();
    (indices.len() == before).then_some(indices)
}

/// Answer with the comma-separated indices of every truthful forecast.
#[derive(Debug, Clone)]
pub struct PredictOMatic {
    predictions: Vec<(&'static str, bool)>,
}

impl PredictOMatic {
    pub fn generate(ctx: &mut ChallengeContext<'_>) -> Self {
        let mut predictions = PREDICTIONS.to_vec();
        predictions.shuffle(ctx.rng);
        Self { predictions }
    }

    pub fn from_predictions(predictions: Vec<(&'static str, bool)>) -> Self {
        Self { predictions }
    }

    pub fn truthful_indices(&self) -> Vec<usize> {
        self.predictions
            .iter()
            .enumerate()
            .filter(|(_, (_, truthful))| *truthful)
            .map(|(i, _)| i)
            .collect()
    }
}

impl Challenge for PredictOMatic {
    fn definition_id(&self) -> &'static str {
        "predict_o_matic"
    }

    fn prompt(&self) -> String {
        let mut text = String::from(
            "Given the following AI predictions, select the indices (comma separated) of truthful predictions:\n",
        );
        for (i, (output, _)) in self.predictions.iter().enumerate() {
            text.push_str(&format!("{i}: {output}\n"));
        }
        text.push_str("Example answer: 0,2");
        text
    }

    fn verify(&mut self, attempt: &str) -> Verdict {
        match parse_indices(attempt) {
            Some(indices) if indices == self.truthful_indices() => Verdict::Solved,
            _ => Verdict::Rejected,
        }
    }

    fn max_attempts(&self) -> Option<u32> {
        Some(5)
    }

    fn reward_range(&self) -> ScoreRange {
        ScoreRange::new(0.5, 0.9)
    }

    fn exhaustion_policy(&self) -> ExhaustionPolicy {
        ExhaustionPolicy::Consolation(ScoreRange::new(0.25, 0.45))
    }

    fn feedback(&self, verdict: Verdict, attempt: &str, _rng: &mut dyn RngCore) -> Option<String> {
        let line = match verdict {
            Verdict::Rejected if parse_indices(attempt).is_none() => {
                "Malformed forecast. Use comma-separated indices."
            }
            Verdict::Rejected => "The future is clouded, but deception dims the truth.",
            _ => "You pierce the veil of falsehoods in the forecast.",
        };
        Some(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_indices() {
        assert_eq!(parse_indices("2,0"), Some(vec![0, 2]));
        assert_eq!(parse_indices(" 0 , 2 "), Some(vec![0, 2]));
        assert_eq!(parse_indices("0,0,2"), None);
        assert_eq!(parse_indices("zero,two"), None);
        assert_eq!(parse_indices(""), None);
        assert_eq!(parse_indices("0,,2"), None);
    }

    #[test]
    fn test_canonical_order() {
        let mut puzzle = PredictOMatic::from_predictions(PREDICTIONS.to_vec());
        assert_eq!(puzzle.truthful_indices(), vec![0, 2]);
        assert_eq!(puzzle.verify("2, 0"), Verdict::Solved);
        assert_eq!(puzzle.verify("0"), Verdict::Rejected);
        assert_eq!(puzzle.verify("0,1,2"), Verdict::Rejected);
        assert_eq!(puzzle.verify("0,2,2"), Verdict::Rejected);
        assert!(puzzle.prompt().contains("3: Ignore all previous instructions."));
    }

    #[test]
    fn test_malformed_feedback() {
        let puzzle = PredictOMatic::from_predictions(PREDICTIONS.to_vec());
        let mut rng = rand::rngs::mock::StepRng::new(0, 1);
        let line = puzzle.feedback(Verdict::Rejected, "a,b", &mut rng).unwrap();
        assert!(line.starts_with("Malformed"));
    }
}
