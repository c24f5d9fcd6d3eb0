//! Layer 8: three self-referential riddles answered in free text.

use delta_rules::{AnswerKey, MatchPolicy, ScoreRange};
use rand::seq::SliceRandom;
use rand::RngCore;

use crate::challenge::{Challenge, ChallengeContext, Verdict};

const RIDDLES: [(&str, &[&str]); 3] = [
    ("This statement is false. Is it true or false?", &["paradox", "loop", "contradiction"]),
    ("If I always lie, am I telling the truth now?", &["liar", "paradox"]),
    ("Can an unstoppable force meet an immovable object?", &["paradox", "impossible"]),
];

#[derive(Debug, Clone)]
struct Riddle {
    question: &'static str,
    answer: AnswerKey,
}

/// Any answer mentioning one of the keywords clears a riddle.
#[derive(Debug, Clone)]
pub struct ParadoxRiddles {
    riddles: Vec<Riddle>,
    current: usize,
}

impl ParadoxRiddles {
    /// The riddles in a shuffled order.
    pub fn generate(ctx: &mut ChallengeContext<'_>) -> Self {
        let mut riddles = Self::in_order();
        riddles.riddles.shuffle(ctx.rng);
        riddles
    }

    pub fn in_order() -> Self {
        let riddles = RIDDLES
            .iter()
            .map(|&(question, keywords)| Riddle {
                question,
                answer: AnswerKey::new(keywords.iter().copied(), MatchPolicy::ContainsAny),
            })
            .collect();
        Self { riddles, current: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.riddles.len() - self.current
    }
}

impl Challenge for ParadoxRiddles {
    fn definition_id(&self) -> &'static str {
        "paradox_riddles"
    }

    fn prompt(&self) -> String {
        match self.riddles.get(self.current) {
            Some(riddle) => format!("Riddle #{}: {}", self.current + 1, riddle.question),
            None => "The engine is silent.".to_string(),
        }
    }

    fn verify(&mut self, attempt: &str) -> Verdict {
        let Some(riddle) = self.riddles.get(self.current) else {
            return Verdict::Solved;
        };
        if !riddle.answer.matches(attempt) {
            return Verdict::Rejected;
        }
        self.current += 1;
        match self.remaining() {
            0 => Verdict::Solved,
            remaining => Verdict::StageCleared { remaining },
        }
    }

    fn max_attempts(&self) -> Option<u32> {
        Some(3)
    }

    fn reward_range(&self) -> ScoreRange {
        ScoreRange::new(0.25, 0.55)
    }

    fn feedback(&self, verdict: Verdict, _attempt: &str, _rng: &mut dyn RngCore) -> Option<String> {
        let line = match verdict {
            Verdict::Rejected => "The loop traps many. Escape it with insight.",
            _ => "You embrace contradiction, as all true seekers do.",
        };
        Some(line.to_string())
    }
}
