//! Layer 12: calibrate the divergence meter one step at a time.

use delta_rules::{AnswerKey, MissPolicy, ScoreRange};
use rand::RngCore;

use crate::challenge::{Challenge, Verdict};

const STEPS: [(&str, &str); 5] = [
    ("Enter the sum of digits in '314159':", "23"),
    ("If divergence = 0.4142, multiply by 10 and floor:", "4"),
    ("What is the 3rd prime number?", "5"),
    ("Calculate (2^3) - 1:", "7"),
    ("Final step: Enter the number of letters in 'SteinsGate':", "10"),
];

/// Five numeric stages, each with its own attempt budget.
#[derive(Debug, Clone)]
pub struct Calibration {
    step: usize,
}

impl Calibration {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn step(&self) -> usize {
        self.step
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new()
    }
}

impl Challenge for Calibration {
    fn definition_id(&self) -> &'static str {
        "calibration"
    }

    fn prompt(&self) -> String {
        match STEPS.get(self.step) {
            Some((question, _)) => format!("Calibration step {}: {}", self.step + 1, question),
            None => "Calibration complete.".to_string(),
        }
    }

    fn verify(&mut self, attempt: &str) -> Verdict {
        let Some((_, expected)) = STEPS.get(self.step) else {
            return Verdict::Solved;
        };
        if !AnswerKey::exact(*expected).matches(attempt) {
            return Verdict::Rejected;
        }
        self.step += 1;
        match STEPS.len() - self.step {
            0 => Verdict::Solved,
            remaining => Verdict::StageCleared { remaining },
        }
    }

    fn max_attempts(&self) -> Option<u32> {
        Some(3)
    }

    fn reward_range(&self) -> ScoreRange {
        ScoreRange::new(0.55, 1.0)
    }

    fn miss_policy(&self) -> MissPolicy {
        MissPolicy::Penalty(0.01)
    }

    fn feedback(&self, verdict: Verdict, _attempt: &str, _rng: &mut dyn RngCore) -> Option<String> {
        let line = match verdict {
            Verdict::Rejected => "Calibration failed. The flow of time resists your grasp.",
            Verdict::StageCleared { .. } => "Step aligned.",
            Verdict::Solved => "Divergence meter aligned. The worldlines converge.",
        };
        Some(line.to_string())
    }
}
