//! Layer 5: a chain of boolean gates, each feeding the next.

use std::fmt;

use delta_rules::{round_delta, AnswerKey, ScoreRange};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::challenge::{Challenge, ChallengeContext, Verdict};

const MISTAKE_COST: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    And,
    Or,
    Xor,
    Nand,
}

impl GateKind {
    pub const ALL: [GateKind; 4] = [GateKind::And, GateKind::Or, GateKind::Xor, GateKind::Nand];

    pub fn eval(self, a: bool, b: bool) -> bool {
        match self {
            GateKind::And => a & b,
            GateKind::Or => a | b,
            GateKind::Xor => a ^ b,
            GateKind::Nand => !(a & b),
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GateKind::And => "AND",
            GateKind::Or => "OR",
            GateKind::Xor => "XOR",
            GateKind::Nand => "NAND",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
    pub kind: GateKind,
    pub inputs: (bool, bool),
}

impl Gate {
    pub fn output(&self) -> bool {
        self.kind.eval(self.inputs.0, self.inputs.1)
    }
}

fn bit(value: bool) -> char {
    if value {
        '1'
    } else {
        '0'
    }
}

/// Enter the output bit of every gate, in order.
#[derive(Debug, Clone)]
pub struct LogicGates {
    gates: Vec<Gate>,
    answer: AnswerKey,
}

impl LogicGates {
    pub fn generate(ctx: &mut ChallengeContext<'_>) -> Self {
        let count = 3 + (ctx.progress.score.max(0.0) as u64 % 3) as usize;
        let mut gates = Vec::with_capacity(count);
        let mut carry: bool = ctx.rng.gen();
        for _ in 0..count {
            let kind = *GateKind::ALL.choose(ctx.rng).unwrap_or(&GateKind::And);
            let gate = Gate {
                kind,
                inputs: (carry, ctx.rng.gen()),
            };
            carry = gate.output();
            gates.push(gate);
        }
        Self::from_gates(gates)
    }

    pub fn from_gates(gates: Vec<Gate>) -> Self {
        let expected: String = gates.iter().map(|g| bit(g.output())).collect();
        Self {
            gates,
            answer: AnswerKey::exact(expected),
        }
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn expected(&self) -> String {
        self.gates.iter().map(|g| bit(g.output())).collect()
    }
}

impl Challenge for LogicGates {
    fn definition_id(&self) -> &'static str {
        "logic_gates"
    }

    fn prompt(&self) -> String {
        let mut lines: Vec<String> = self
            .gates
            .iter()
            .enumerate()
            .map(|(i, g)| {
                format!(
                    "Gate {}: {} | Inputs: {}, {}",
                    i + 1,
                    g.kind,
                    bit(g.inputs.0),
                    bit(g.inputs.1)
                )
            })
            .collect();
        lines.push("Enter the sequence of outputs (e.g., 011):".to_string());
        lines.join("\n")
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
        ScoreRange::new(0.1, 0.3)
    }

    /// Full reward on a clean solve, less for every wrong answer.
    fn reward(&self, _rng: &mut dyn RngCore, mistakes: u32) -> f64 {
        let range = self.reward_range();
        round_delta((range.max - MISTAKE_COST * mistakes as f64).max(range.min))
    }

    fn feedback(&self, verdict: Verdict, _attempt: &str, _rng: &mut dyn RngCore) -> Option<String> {
        match verdict {
            Verdict::Rejected => Some("Logic misfire. The cage tightens.".to_string()),
            _ => None,
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

    #[test]
    fn test_gate_truth_tables() {
        assert!(GateKind::And.eval(true, true));
        assert!(!GateKind::And.eval(true, false));
        assert!(GateKind::Or.eval(false, true));
        assert!(!GateKind::Xor.eval(true, true));
        assert!(GateKind::Nand.eval(false, false));
        assert!(!GateKind::Nand.eval(true, true));
    }

    #[test]
    fn test_known_chain() {
        let mut puzzle = LogicGates::from_gates(vec![
            Gate { kind: GateKind::And, inputs: (true, true) },
            Gate { kind: GateKind::Xor, inputs: (true, true) },
            Gate { kind: GateKind::Nand, inputs: (false, true) },
        ]);
        assert_eq!(puzzle.expected(), "101");
        assert_eq!(puzzle.verify("101"), Verdict::Solved);
        assert_eq!(puzzle.verify("1 0 1"), Verdict::Rejected);
        assert!(puzzle.prompt().contains("Gate 2: XOR | Inputs: 1, 1"));
    }

    #[test]
    fn test_generated_chain_feeds_forward() {
        let mut progress = PlayerProgress::new(Handle::new("alice").unwrap(), 0.666);
        progress.score = 2.5;
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let puzzle =
            LogicGates::generate(&mut ChallengeContext::new(&progress, &mut rng, Utc::now()));

        assert_eq!(puzzle.gates().len(), 5);
        for pair in puzzle.gates().windows(2) {
            assert_eq!(pair[1].inputs.0, pair[0].output());
        }
    }

    #[test]
    fn test_reward_shrinks_with_mistakes() {
        let puzzle = LogicGates::from_gates(vec![Gate {
            kind: GateKind::Or,
            inputs: (false, false),
        }]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(puzzle.reward(&mut rng, 0), 0.3);
        assert_eq!(puzzle.reward(&mut rng, 2), 0.2);
        assert_eq!(puzzle.reward(&mut rng, 10), 0.1);
    }
}
