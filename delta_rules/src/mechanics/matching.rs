//! Answer matching policies.
//!
//! Every challenge states how it compares an attempt against its accepted
//! answers instead of sharing one global rule. Attempts are always trimmed of
//! surrounding whitespace before comparison.

use serde::{Deserialize, Serialize};

/// How an attempt is compared with an accepted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPolicy {
    /// Byte-for-byte equality.
    Exact,
    /// Equality after lowercasing both sides.
    IgnoreCase,
    /// The lowercased attempt contains the lowercased answer anywhere.
    ContainsAny,
}

/// A set of accepted answers and the policy used to compare against them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKey {
    pub accepted: Vec<String>,
    pub policy: MatchPolicy,
}

impl AnswerKey {
    pub fn new<I, S>(accepted: I, policy: MatchPolicy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accepted: accepted.into_iter().map(Into::into).collect(),
            policy,
        }
    }

    /// Single answer compared exactly.
    pub fn exact(answer: impl Into<String>) -> Self {
        Self::new([answer], MatchPolicy::Exact)
    }

    /// Single answer compared case-insensitively.
    pub fn ignore_case(answer: impl Into<String>) -> Self {
        Self::new([answer], MatchPolicy::IgnoreCase)
    }

    /// Check whether `attempt` is accepted. Empty attempts never match.
    pub fn matches(&self, attempt: &str) -> bool {
        let attempt = attempt.trim();
        if attempt.is_empty() {
            return false;
        }
        match self.policy {
            MatchPolicy::Exact => self.accepted.iter().any(|a| a == attempt),
            MatchPolicy::IgnoreCase => {
                let lowered = attempt.to_lowercase();
                self.accepted.iter().any(|a| a.to_lowercase() == lowered)
            }
            MatchPolicy::ContainsAny => {
                let lowered = attempt.to_lowercase();
                self.accepted
                    .iter()
                    .any(|a| lowered.contains(&a.to_lowercase()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_is_case_sensitive() {
        let key = AnswerKey::exact("atled");
        assert!(key.matches("atled"));
        assert!(key.matches("  atled\n"));
        assert!(!key.matches("ATLED"));
        assert!(!key.matches("atle"));
    }

    #[test]
    fn test_ignore_case() {
        let key = AnswerKey::ignore_case("yes");
        assert!(key.matches("YES"));
        assert!(key.matches("Yes "));
        assert!(!key.matches("yes please"));
    }

    #[test]
    fn test_contains_any() {
        let key = AnswerKey::new(["paradox", "loop"], MatchPolicy::ContainsAny);
        assert!(key.matches("It's a PARADOX, obviously"));
        assert!(key.matches("an endless loop"));
        assert!(!key.matches("true"));
    }

    #[test]
    fn test_empty_attempt_never_matches() {
        let key = AnswerKey::new([""], MatchPolicy::ContainsAny);
        assert!(!key.matches("   "));
    }
}
