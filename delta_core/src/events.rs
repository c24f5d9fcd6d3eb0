//! Events written to a player's log at session and layer boundaries.

use delta_rules::LogEntry;
use serde::{Deserialize, Serialize};

/// Something worth remembering about a player's run.
///
/// Layer numbers are stored zero-based and rendered one-based, so the first
/// challenge logs as `LAYER1_*`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerEvent {
    /// A session started.
    Boot { score: f64 },

    /// A layer was solved and the player advanced.
    Solved { layer: u32, delta: f64 },

    /// Attempts ran out but the challenge let the player through with a
    /// reduced reward.
    Consolation { layer: u32, delta: f64 },

    /// Attempts ran out and the layer stays locked.
    Exhausted { layer: u32 },
}

impl LayerEvent {
    /// Render the event the way it appears in the log.
    pub fn to_log_line(&self) -> String {
        match self {
            LayerEvent::Boot { score } => format!("BOOT Δ={score}"),
            LayerEvent::Solved { layer, delta } => {
                format!("LAYER{}_SOLVED Δ+{delta}", layer + 1)
            }
            LayerEvent::Consolation { layer, delta } => {
                format!("LAYER{}_CONSOLATION Δ+{delta}", layer + 1)
            }
            LayerEvent::Exhausted { layer } => format!("LAYER{}_EXHAUSTED", layer + 1),
        }
    }

    /// Wrap the event in a timestamped log entry.
    pub fn to_entry(&self) -> LogEntry {
        LogEntry::now(self.to_log_line())
    }
}
