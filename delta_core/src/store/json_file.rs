//! JSON file backed progression store.

use delta_rules::{Handle, PlayerProgress, ProgressUpdate, SCORE_SEED};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{apply_batch, ProgressionStore, StoreError};

/// Current on-disk document version.
const STORE_VERSION: u32 = 1;

/// The whole store as it sits on disk.
#[derive(Debug, Serialize, Deserialize)]
struct StoreDocument {
    version: u32,
    players: BTreeMap<Handle, PlayerProgress>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            players: BTreeMap::new(),
        }
    }
}

/// Store keeping every player in one JSON document.
///
/// Each write serializes the full document to a sibling temporary file,
/// flushes it to disk and renames it over the original, so a crash mid-write
/// leaves the previous state intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    seed: f64,
    log_retention: Option<usize>,
}

impl JsonFileStore {
    /// Open (lazily) the store at `path`. A missing file is an empty store.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            seed: SCORE_SEED,
            log_retention: None,
        }
    }

    /// Use a different starting score for new players.
    pub fn with_seed(mut self, seed: f64) -> Self {
        self.seed = seed;
        self
    }

    /// Cap the number of log entries kept per player.
    pub fn with_log_retention(mut self, cap: Option<usize>) -> Self {
        self.log_retention = cap;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<StoreDocument, StoreError> {
        if !self.path.exists() {
            return Ok(StoreDocument::default());
        }
        let contents = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let document: StoreDocument =
            serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        if document.version != STORE_VERSION {
            return Err(StoreError::UnsupportedVersion {
                path: self.path.clone(),
                found: document.version,
            });
        }
        Ok(document)
    }

    fn write_document(&self, document: &StoreDocument) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_string_pretty(document).map_err(StoreError::Serialize)?;
        let temp_path = self.temp_path();
        let mut file = File::create(&temp_path).map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);
        fs::rename(&temp_path, &self.path).map_err(io_err)?;

        debug!(
            path = %self.path.display(),
            players = document.players.len(),
            "player store written"
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ProgressionStore for JsonFileStore {
    fn load(&self, handle: &Handle) -> Result<Option<PlayerProgress>, StoreError> {
        Ok(self.read_document()?.players.remove(handle))
    }

    fn create(&mut self, handle: &Handle) -> Result<PlayerProgress, StoreError> {
        let mut document = self.read_document()?;
        if let Some(existing) = document.players.get(handle) {
            return Ok(existing.clone());
        }
        let record = PlayerProgress::new(handle.clone(), self.seed);
        document.players.insert(handle.clone(), record.clone());
        self.write_document(&document)?;
        Ok(record)
    }

    fn commit_at(
        &mut self,
        handle: &Handle,
        expected_revision: Option<u64>,
        updates: Vec<ProgressUpdate>,
    ) -> Result<PlayerProgress, StoreError> {
        let mut document = self.read_document()?;
        let record = document
            .players
            .get_mut(handle)
            .ok_or_else(|| StoreError::UnknownPlayer(handle.clone()))?;
        apply_batch(record, expected_revision, updates, self.log_retention)?;
        let updated = record.clone();
        self.write_document(&document)?;
        Ok(updated)
    }
}
