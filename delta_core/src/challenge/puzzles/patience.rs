//! Layer 4: a gate that only opens to an operator who waits.

use chrono::{DateTime, Utc};
use delta_rules::ScoreRange;
use rand::{Rng, RngCore};

use crate::challenge::{Challenge, ChallengeContext, InteractionMode, LockStatus, Verdict};

const DECOYS: usize = 2;

/// Time lock with a couple of fake unlock moments before the real one.
#[derive(Debug, Clone)]
pub struct Patience {
    started_at: DateTime<Utc>,
    threshold_secs: u64,
    decoy_secs: Vec<u64>,
}

impl Patience {
    pub fn generate(ctx: &mut ChallengeContext<'_>) -> Self {
        // Higher divergence means a longer wait.
        let threshold = ctx.rng.gen_range(10..=20) + ctx.progress.score.max(0.0) as u64;
        let decoys = (0..DECOYS).map(|_| ctx.rng.gen_range(3..threshold)).collect();
        Self::from_parts(ctx.now, threshold, decoys)
    }

    pub fn from_parts(
        started_at: DateTime<Utc>,
        threshold_secs: u64,
        decoy_secs: Vec<u64>,
    ) -> Self {
        Self {
            started_at,
            threshold_secs,
            decoy_secs,
        }
    }

    pub fn threshold_secs(&self) -> u64 {
        self.threshold_secs
    }

    pub fn decoy_secs(&self) -> &[u64] {
        &self.decoy_secs
    }
}

impl Challenge for Patience {
    fn definition_id(&self) -> &'static str {
        "patience"
    }

    fn prompt(&self) -> String {
        "To unlock the next gate, do not act. Do not force it. Simply wait.".to_string()
    }

    fn mode(&self) -> InteractionMode {
        InteractionMode::Timed
    }

    fn verify(&mut self, _attempt: &str) -> Verdict {
        Verdict::Rejected
    }

    fn status(&self, now: DateTime<Utc>) -> LockStatus {
        let elapsed = (now - self.started_at).num_seconds().max(0) as u64;
        if elapsed >= self.threshold_secs {
            LockStatus::RealUnlock
        } else if self.decoy_secs.contains(&elapsed) {
            LockStatus::FalseSignal
        } else {
            LockStatus::Waiting
        }
    }

    fn max_attempts(&self) -> Option<u32> {
        None
    }

    fn reward_range(&self) -> ScoreRange {
        ScoreRange::new(0.1, 0.5)
    }

    fn feedback(&self, verdict: Verdict, _attempt: &str, _rng: &mut dyn RngCore) -> Option<String> {
        match verdict {
            Verdict::Rejected => Some("The gate responds to time, not action.".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use delta_rules::{Handle, PlayerProgress};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_status_over_time() {
        let start = epoch();
        let lock = Patience::from_parts(start, 12, vec![5, 7]);

        assert_eq!(lock.status(start), LockStatus::Waiting);
        assert_eq!(lock.status(start + Duration::seconds(5)), LockStatus::FalseSignal);
        assert_eq!(lock.status(start + Duration::seconds(6)), LockStatus::Waiting);
        assert_eq!(lock.status(start + Duration::seconds(11)), LockStatus::Waiting);
        assert_eq!(lock.status(start + Duration::seconds(12)), LockStatus::RealUnlock);
        assert_eq!(lock.status(start + Duration::seconds(90)), LockStatus::RealUnlock);
    }

    #[test]
    fn test_clock_before_start_waits() {
        let start = epoch();
        let lock = Patience::from_parts(start, 12, vec![5]);
        assert_eq!(lock.status(start - Duration::seconds(30)), LockStatus::Waiting);
    }

    #[test]
    fn test_threshold_grows_with_score() {
        let mut progress = PlayerProgress::new(Handle::new("alice").unwrap(), 0.666);
        progress.score = 4.2;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let lock = Patience::generate(&mut ChallengeContext::new(&progress, &mut rng, epoch()));

        assert!((14..=24).contains(&lock.threshold_secs()));
        assert_eq!(lock.decoy_secs().len(), DECOYS);
        assert!(lock.decoy_secs().iter().all(|&s| s >= 3 && s < lock.threshold_secs()));
        assert_eq!(lock.mode(), InteractionMode::Timed);
    }

    #[test]
    fn test_typing_never_unlocks() {
        let mut lock = Patience::from_parts(epoch(), 10, vec![]);
        assert_eq!(lock.verify("open"), Verdict::Rejected);
    }
}
