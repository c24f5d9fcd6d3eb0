//! Event log entries attached to a player record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of a player's event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub event: String,
}

impl LogEntry {
    /// Create an entry stamped with the current time.
    pub fn now(event: impl Into<String>) -> Self {
        Self::at(Utc::now(), event)
    }

    /// Create an entry with an explicit timestamp.
    pub fn at(at: DateTime<Utc>, event: impl Into<String>) -> Self {
        Self {
            at,
            event: event.into(),
        }
    }

    /// Whitespace-separated words of the event text.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.event.split_whitespace()
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.at.format("%Y-%m-%d %H:%M:%S"), self.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_tokens() {
        let entry = LogEntry::now("LAYER1_SOLVED Δ+0.1234");
        let tokens: Vec<_> = entry.tokens().collect();
        assert_eq!(tokens, vec!["LAYER1_SOLVED", "Δ+0.1234"]);
    }

    #[test]
    fn test_display_includes_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        let entry = LogEntry::at(at, "BOOT Δ=0.666");
        assert_eq!(entry.to_string(), "[2026-03-01 12:30:00] BOOT Δ=0.666");
    }
}
