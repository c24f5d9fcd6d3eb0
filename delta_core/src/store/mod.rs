//! Progression store - durable mapping from player handle to progression state.
//!
//! A store only loads, creates and applies validated field updates. Whether an
//! update makes sense for the game is decided by the runner; whether it keeps
//! the record valid is decided by [`PlayerProgress::apply_all`].

mod json_file;

pub use json_file::*;

use delta_rules::{Handle, PlayerProgress, ProgressUpdate, RulesError, SCORE_SEED};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to read or write progression state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O failure on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("player store {path} is corrupt")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("player store {path} has unsupported version {found}")]
    UnsupportedVersion { path: PathBuf, found: u32 },

    #[error("failed to serialize player store")]
    Serialize(#[source] serde_json::Error),

    #[error("no record for player `{0}`")]
    UnknownPlayer(Handle),

    #[error("rejected update: {0}")]
    Rules(#[from] RulesError),
}

/// Durable mapping from player handle to [`PlayerProgress`].
pub trait ProgressionStore {
    /// Load a record, or `None` if the handle has never been seen.
    fn load(&self, handle: &Handle) -> Result<Option<PlayerProgress>, StoreError>;

    /// Return the existing record unchanged, or create a fresh one.
    fn create(&mut self, handle: &Handle) -> Result<PlayerProgress, StoreError>;

    /// Apply several field updates as one durable write.
    ///
    /// Either every update lands or none does. With `expected_revision` set,
    /// the batch is refused when the stored record has moved past that
    /// revision.
    fn commit_at(
        &mut self,
        handle: &Handle,
        expected_revision: Option<u64>,
        updates: Vec<ProgressUpdate>,
    ) -> Result<PlayerProgress, StoreError>;

    /// Apply several field updates as one durable write, unconditionally.
    fn commit(
        &mut self,
        handle: &Handle,
        updates: Vec<ProgressUpdate>,
    ) -> Result<PlayerProgress, StoreError> {
        self.commit_at(handle, None, updates)
    }

    /// Apply a single field update.
    fn update(
        &mut self,
        handle: &Handle,
        update: ProgressUpdate,
    ) -> Result<PlayerProgress, StoreError> {
        self.commit(handle, vec![update])
    }
}

/// Apply a batch to a record and enforce the log cap.
pub(crate) fn apply_batch(
    record: &mut PlayerProgress,
    expected_revision: Option<u64>,
    updates: Vec<ProgressUpdate>,
    log_retention: Option<usize>,
) -> Result<(), RulesError> {
    match expected_revision {
        Some(expected) => record.apply_at(expected, updates)?,
        None => record.apply_all(updates)?,
    }
    if let Some(cap) = log_retention {
        record.trim_log(cap);
    }
    Ok(())
}

/// In-process store. Nothing survives the process, which makes it the
/// natural choice for tests and short-lived form sessions.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    seed: f64,
    log_retention: Option<usize>,
    players: HashMap<Handle, PlayerProgress>,
    writes: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store seeding new players at [`SCORE_SEED`].
    pub fn new() -> Self {
        Self {
            seed: SCORE_SEED,
            log_retention: None,
            players: HashMap::new(),
            writes: 0,
        }
    }

    /// Use a different starting score for new players.
    pub fn with_seed(mut self, seed: f64) -> Self {
        self.seed = seed;
        self
    }

    /// Cap the number of log entries kept per player.
    pub fn with_log_retention(mut self, cap: usize) -> Self {
        self.log_retention = Some(cap);
        self
    }

    /// Number of successful writes (creates and commits) so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Number of stored players.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}

impl ProgressionStore for MemoryStore {
    fn load(&self, handle: &Handle) -> Result<Option<PlayerProgress>, StoreError> {
        Ok(self.players.get(handle).cloned())
    }

    fn create(&mut self, handle: &Handle) -> Result<PlayerProgress, StoreError> {
        if let Some(existing) = self.players.get(handle) {
            return Ok(existing.clone());
        }
        let record = PlayerProgress::new(handle.clone(), self.seed);
        self.players.insert(handle.clone(), record.clone());
        self.writes += 1;
        Ok(record)
    }

    fn commit_at(
        &mut self,
        handle: &Handle,
        expected_revision: Option<u64>,
        updates: Vec<ProgressUpdate>,
    ) -> Result<PlayerProgress, StoreError> {
        let record = self
            .players
            .get_mut(handle)
            .ok_or_else(|| StoreError::UnknownPlayer(handle.clone()))?;
        apply_batch(record, expected_revision, updates, self.log_retention)?;
        self.writes += 1;
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delta_rules::LogEntry;

    fn handle(name: &str) -> Handle {
        Handle::new(name).unwrap()
    }

    #[test]
    fn test_create_is_idempotent() {
        let mut store = MemoryStore::new();
        let alice = handle("alice");

        let first = store.create(&alice).unwrap();
        store.update(&alice, ProgressUpdate::Layer(1)).unwrap();
        let second = store.create(&alice).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.layer, 1);
        assert_eq!(store.player_count(), 1);
    }

    #[test]
    fn test_load_unknown_player() {
        let store = MemoryStore::new();
        assert!(store.load(&handle("nobody")).unwrap().is_none());
    }

    #[test]
    fn test_commit_unknown_player() {
        let mut store = MemoryStore::new();
        let err = store
            .update(&handle("ghost"), ProgressUpdate::Score(1.0))
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownPlayer(_)));
    }

    #[test]
    fn test_rejected_commit_leaves_record_untouched() {
        let mut store = MemoryStore::new();
        let alice = handle("alice");
        store.create(&alice).unwrap();

        let err = store
            .commit(
                &alice,
                vec![ProgressUpdate::Score(5.0), ProgressUpdate::Layer(2)],
            )
            .unwrap_err();

        assert!(matches!(err, StoreError::Rules(RulesError::LayerSkip { .. })));
        let record = store.load(&alice).unwrap().unwrap();
        assert_eq!(record.score, SCORE_SEED);
        assert_eq!(record.layer, 0);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_commit_from_stale_copy_is_refused() {
        let mut store = MemoryStore::new();
        let alice = handle("alice");
        let snapshot = store.create(&alice).unwrap();

        let first = store
            .commit_at(&alice, Some(snapshot.revision), vec![ProgressUpdate::Layer(1)])
            .unwrap();
        assert_eq!(first.revision, snapshot.revision + 1);

        let err = store
            .commit_at(&alice, Some(snapshot.revision), vec![ProgressUpdate::Score(9.0)])
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Rules(RulesError::StaleRecord { expected: 0, current: 1 })
        ));

        let record = store.load(&alice).unwrap().unwrap();
        assert_eq!(record.score, SCORE_SEED);
        assert_eq!(record.layer, 1);
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn test_log_retention() {
        let mut store = MemoryStore::new().with_log_retention(2);
        let alice = handle("alice");
        store.create(&alice).unwrap();

        for i in 0..4 {
            store
                .update(&alice, ProgressUpdate::AppendLog(LogEntry::now(format!("e{i}"))))
                .unwrap();
        }

        let record = store.load(&alice).unwrap().unwrap();
        let events: Vec<_> = record.log.iter().map(|e| e.event.as_str()).collect();
        assert_eq!(events, vec!["e2", "e3"]);
    }

    #[test]
    fn test_custom_seed() {
        let mut store = MemoryStore::new().with_seed(1.5);
        let record = store.create(&handle("carol")).unwrap();
        assert_eq!(record.score, 1.5);
    }
}
