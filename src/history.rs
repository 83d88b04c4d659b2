//! Bounded, persisted run history
//!
//! One JSON array per diagnostic kind at `<dir>/<kind>_history.json`,
//! newest entry first. Appends hold a per-kind lock across the whole
//! read-modify-write and land on disk through a temp file + rename.

use crate::error::HistoryError;
use crate::models::DiagnosticKind;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Entries kept per kind
pub const MAX_HISTORY_ENTRIES: usize = 10;

pub struct HistoryStore {
    dir: PathBuf,
    locks: [Mutex<()>; 3],
}

impl HistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        HistoryStore {
            dir: dir.into(),
            locks: [Mutex::new(()), Mutex::new(()), Mutex::new(())],
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, kind: DiagnosticKind) -> PathBuf {
        self.dir.join(format!("{}_history.json", kind.slug()))
    }

    fn lock(&self, kind: DiagnosticKind) -> MutexGuard<'_, ()> {
        // A panicked writer leaves the file itself consistent
        self.locks[kind.index()]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert `record` at the head, evicting the oldest entry past the cap.
    /// Returns the new length.
    pub fn append<T: Serialize>(
        &self,
        kind: DiagnosticKind,
        record: &T,
    ) -> Result<usize, HistoryError> {
        let _guard = self.lock(kind);
        let mut entries = self.read_raw(kind)?;
        entries.insert(0, serde_json::to_value(record)?);
        if entries.len() > MAX_HISTORY_ENTRIES {
            let evicted = entries.len() - MAX_HISTORY_ENTRIES;
            entries.truncate(MAX_HISTORY_ENTRIES);
            log::debug!("[HISTORY] Evicted {} old {} entries", evicted, kind);
        }
        self.write_raw(kind, &entries)?;
        log::info!(
            "[HISTORY] Saved {} result ({} stored)",
            kind,
            entries.len()
        );
        Ok(entries.len())
    }

    /// All entries, newest first
    pub fn get_all<T: DeserializeOwned>(&self, kind: DiagnosticKind) -> Result<Vec<T>, HistoryError> {
        let _guard = self.lock(kind);
        self.read_raw(kind)?
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                serde_json::from_value(value).map_err(|e| HistoryError::Corrupt {
                    kind,
                    reason: format!("entry {}: {}", i, e),
                })
            })
            .collect()
    }

    pub fn latest<T: DeserializeOwned>(&self, kind: DiagnosticKind) -> Result<Option<T>, HistoryError> {
        Ok(self.get_all(kind)?.into_iter().next())
    }

    pub fn len(&self, kind: DiagnosticKind) -> Result<usize, HistoryError> {
        let _guard = self.lock(kind);
        Ok(self.read_raw(kind)?.len())
    }

    pub fn is_empty(&self, kind: DiagnosticKind) -> Result<bool, HistoryError> {
        Ok(self.len(kind)? == 0)
    }

    pub fn clear(&self, kind: DiagnosticKind) -> Result<(), HistoryError> {
        let _guard = self.lock(kind);
        let path = self.path_for(kind);
        if path.exists() {
            fs::remove_file(&path)?;
            log::info!("[HISTORY] Cleared {} history", kind);
        }
        Ok(())
    }

    fn read_raw(&self, kind: DiagnosticKind) -> Result<Vec<Value>, HistoryError> {
        let path = self.path_for(kind);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            log::error!("[HISTORY] Unreadable history at {}: {}", path.display(), e);
            HistoryError::Corrupt {
                kind,
                reason: e.to_string(),
            }
        })
    }

    fn write_raw(&self, kind: DiagnosticKind, entries: &[Value]) -> Result<(), HistoryError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(kind);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
