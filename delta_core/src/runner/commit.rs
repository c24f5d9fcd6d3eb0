//! Turning a resolved layer into one store write.

use delta_rules::{Handle, PlayerProgress, ProgressUpdate};
use tracing::{info, warn};

use super::active::Resolution;
use crate::events::LayerEvent;
use crate::store::{ProgressionStore, StoreError};

/// What a settled layer wrote.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    Advanced {
        layer: u32,
        delta: f64,
        consolation: bool,
        record: PlayerProgress,
    },
    Halted {
        layer: u32,
        record: PlayerProgress,
    },
    /// The layer is still in play; nothing was written.
    Unsettled,
}

/// Write the outcome of `layer` for `handle` in a single commit.
///
/// An advance writes score, layer and log entry together; a halt writes only
/// the accumulated miss drift and an exhaustion entry, leaving the layer alone.
/// The write is refused if the stored record moved on since `progress` was
/// read.
pub fn settle<S: ProgressionStore + ?Sized>(
    store: &mut S,
    handle: &Handle,
    progress: &PlayerProgress,
    resolution: Resolution,
    drift: f64,
) -> Result<Settlement, StoreError> {
    let layer = progress.layer;
    match resolution {
        Resolution::Advance { delta, consolation } => {
            let event = if consolation {
                LayerEvent::Consolation { layer, delta }
            } else {
                LayerEvent::Solved { layer, delta }
            };
            let record = store.commit_at(
                handle,
                Some(progress.revision),
                vec![
                    ProgressUpdate::Score(progress.score + drift + delta),
                    ProgressUpdate::Layer(layer + 1),
                    ProgressUpdate::AppendLog(event.to_entry()),
                ],
            )?;
            info!(
                handle = %handle,
                layer = record.layer,
                score = record.score,
                delta,
                consolation,
                "layer committed"
            );
            Ok(Settlement::Advanced {
                layer,
                delta,
                consolation,
                record,
            })
        }
        Resolution::Halt => {
            let mut updates = Vec::with_capacity(2);
            if drift != 0.0 {
                updates.push(ProgressUpdate::Score(progress.score + drift));
            }
            updates.push(ProgressUpdate::AppendLog(LayerEvent::Exhausted { layer }.to_entry()));
            let record = store.commit_at(handle, Some(progress.revision), updates)?;
            warn!(handle = %handle, layer, score = record.score, "attempts exhausted");
            Ok(Settlement::Halted { layer, record })
        }
        Resolution::Pending => Ok(Settlement::Unsettled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use delta_rules::RulesError;

    fn setup() -> (MemoryStore, Handle, PlayerProgress) {
        let mut store = MemoryStore::new();
        let handle = Handle::new("alice").unwrap();
        let record = store.create(&handle).unwrap();
        (store, handle, record)
    }

    #[test]
    fn test_advance_writes_once() {
        let (mut store, handle, record) = setup();
        let writes = store.write_count();

        let settled = settle(
            &mut store,
            &handle,
            &record,
            Resolution::Advance { delta: 0.25, consolation: false },
            -0.01,
        )
        .unwrap();

        let Settlement::Advanced { record, .. } = settled else {
            panic!("expected advance");
        };
        assert_eq!(record.layer, 1);
        assert_eq!(record.score, 0.906);
        assert_eq!(record.log.last().unwrap().event, "LAYER1_SOLVED Δ+0.25");
        assert_eq!(store.write_count(), writes + 1);
    }

    #[test]
    fn test_halt_keeps_layer() {
        let (mut store, handle, record) = setup();

        let settled = settle(&mut store, &handle, &record, Resolution::Halt, 0.0).unwrap();
        let Settlement::Halted { record, .. } = settled else {
            panic!("expected halt");
        };
        assert_eq!(record.layer, 0);
        assert_eq!(record.score, 0.666);
        assert_eq!(record.log.last().unwrap().event, "LAYER1_EXHAUSTED");
    }

    #[test]
    fn test_pending_writes_nothing() {
        let (mut store, handle, record) = setup();
        let writes = store.write_count();
        assert_eq!(
            settle(&mut store, &handle, &record, Resolution::Pending, 0.0).unwrap(),
            Settlement::Unsettled
        );
        assert_eq!(store.write_count(), writes);
    }

    #[test]
    fn test_halt_drift_is_clamped() {
        let mut store = MemoryStore::new().with_seed(0.01);
        let handle = Handle::new("bob").unwrap();
        let record = store.create(&handle).unwrap();

        let settled = settle(&mut store, &handle, &record, Resolution::Halt, -0.05).unwrap();
        let Settlement::Halted { record, .. } = settled else {
            panic!("expected halt");
        };
        assert_eq!(record.score, 0.0);
    }

    #[test]
    fn test_second_settle_from_same_snapshot_is_refused() {
        let (mut store, handle, record) = setup();
        let first = Resolution::Advance { delta: 0.4, consolation: false };
        let second = Resolution::Advance { delta: 0.1, consolation: false };

        settle(&mut store, &handle, &record, first, 0.0).unwrap();
        let err = settle(&mut store, &handle, &record, second, 0.0).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Rules(RulesError::StaleRecord { expected: 0, current: 1 })
        ));

        let stored = store.load(&handle).unwrap().unwrap();
        assert_eq!(stored.layer, 1);
        assert_eq!(stored.score, 1.066);
        assert_eq!(stored.log.len(), 1);
        assert_eq!(stored.log[0].event, "LAYER1_SOLVED Δ+0.4");
    }
}
