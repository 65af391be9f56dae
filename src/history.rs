use log::{debug, warn};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::app_dirs::AppDirs;
use crate::error::StoreError;
use crate::score::{Score, ScoreHistory};

/// Fixed key the whole history blob is stored under
pub const STORAGE_KEY: &str = "quickbench-scores";

/// Key/value storage for string blobs
pub trait HistoryBackend {
    /// Ok(None) when nothing has been stored under `key` yet
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Stores each key as `<key>.json` inside a directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            dir: AppDirs::data_dir(),
        }
    }

    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Default for FileBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryBackend for FileBackend {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        read_optional(&self.path_for(key))
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        write_creating_parent(&self.path_for(key), value)
    }
}

fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn write_creating_parent(path: &Path, value: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, value)
}

/// In-memory backend. Clones share contents, so a test can keep a handle
/// while the store owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    blobs: Rc<RefCell<HashMap<String, String>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(key: &str, value: &str) -> Self {
        let backend = Self::default();
        backend
            .blobs
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        backend
    }

    /// Make every subsequent `set` fail, as if storage were full
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.blobs.borrow().get(key).cloned()
    }
}

impl HistoryBackend for MemoryBackend {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.blobs.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        if self.fail_writes.get() {
            return Err(io::Error::new(io::ErrorKind::Other, "storage quota exceeded"));
        }
        self.blobs
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Owns the score history and keeps the backend in sync with it.
///
/// The in-memory copy is authoritative: it is loaded once on construction and
/// every append/clear rewrites the whole blob. Persistence failures are logged
/// and otherwise ignored.
pub struct ScoreStore<B: HistoryBackend> {
    backend: B,
    history: ScoreHistory,
    revision: u64,
    subscribers: Vec<Sender<ScoreHistory>>,
}

impl<B: HistoryBackend> ScoreStore<B> {
    pub fn open(backend: B) -> Self {
        let history = Self::read(&backend);
        Self {
            backend,
            history,
            revision: 0,
            subscribers: Vec::new(),
        }
    }

    /// Reads the persisted history, substituting an empty one when missing or unreadable
    pub fn load(&self) -> ScoreHistory {
        Self::read(&self.backend)
    }

    fn read(backend: &B) -> ScoreHistory {
        match Self::try_read(backend) {
            Ok(history) => history,
            Err(e) => {
                warn!("{e}; starting with an empty history");
                ScoreHistory::default()
            }
        }
    }

    fn try_read(backend: &B) -> Result<ScoreHistory, StoreError> {
        let Some(raw) = backend.get(STORAGE_KEY).map_err(StoreError::Read)? else {
            return Ok(ScoreHistory::default());
        };
        let mut history: ScoreHistory =
            serde_json::from_str(&raw).map_err(StoreError::Corrupt)?;
        history.truncate();
        Ok(history)
    }

    /// Current in-memory history
    pub fn history(&self) -> &ScoreHistory {
        &self.history
    }

    /// Bumped on every change; lets a presenter poll instead of subscribing
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn append(&mut self, score: impl Into<Score>) {
        let score = score.into();
        debug!("appending {} score", score.kind());
        self.history.push(score);
        self.commit();
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.commit();
    }

    /// Receive a snapshot of the history after every change
    pub fn subscribe(&mut self) -> Receiver<ScoreHistory> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn commit(&mut self) {
        self.revision += 1;
        if let Err(e) = self.persist() {
            warn!("{e}; keeping scores in memory only");
        }
        let snapshot = &self.history;
        self.subscribers
            .retain(|tx| tx.send(snapshot.clone()).is_ok());
    }

    fn persist(&self) -> Result<(), StoreError> {
        let data = serde_json::to_string(&self.history).map_err(StoreError::Corrupt)?;
        self.backend
            .set(STORAGE_KEY, &data)
            .map_err(StoreError::Write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{AimScore, GameKind, TypingScore};
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn aim(time: f64) -> AimScore {
        AimScore {
            time,
            accuracy: 100.0,
            cps: 30.0 / time,
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    fn typing(wpm: u32) -> TypingScore {
        TypingScore {
            words_per_minute: wpm,
            accuracy: 97.5,
            characters_typed: 200,
            timestamp: Utc.timestamp_opt(1_700_000_100, 0).unwrap(),
        }
    }

    #[test]
    fn empty_backend_loads_empty_history() {
        let store = ScoreStore::open(MemoryBackend::new());
        assert!(store.history().is_empty());
        assert!(store.load().is_empty());
    }

    #[test]
    fn corrupt_blob_falls_back_to_empty() {
        let backend = MemoryBackend::with_blob(STORAGE_KEY, "{not json");
        let store = ScoreStore::open(backend);
        assert!(store.history().is_empty());
    }

    #[test]
    fn append_bounds_each_list_to_five_newest_first() {
        let mut store = ScoreStore::open(MemoryBackend::new());
        for n in 1..=8u32 {
            store.append(typing(n));
            let expected_len = (n as usize).min(5);
            assert_eq!(store.history().len(GameKind::TypingTest), expected_len);
        }

        let wpms: Vec<u32> = store
            .load()
            .typing_test
            .iter()
            .map(|s| s.words_per_minute)
            .collect();
        assert_eq!(wpms, vec![8, 7, 6, 5, 4]);
        assert_eq!(store.history().len(GameKind::AimTrainer), 0);
    }

    #[test]
    fn load_after_two_appends_returns_newest_first() {
        let mut store = ScoreStore::open(MemoryBackend::new());
        store.append(aim(10.0));
        store.append(aim(8.0));

        let loaded = store.load();
        assert_eq!(loaded.aim_trainer, vec![aim(8.0), aim(10.0)]);
    }

    #[test]
    fn appends_to_one_game_keep_the_other() {
        let mut store = ScoreStore::open(MemoryBackend::new());
        store.append(aim(10.0));
        store.append(typing(60));

        let loaded = store.load();
        assert_eq!(loaded.aim_trainer.len(), 1);
        assert_eq!(loaded.typing_test.len(), 1);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut store = ScoreStore::open(MemoryBackend::new());
        store.append(aim(10.0));
        store.append(typing(60));

        store.clear();
        let once = store.load();
        store.clear();
        let twice = store.load();

        assert!(once.is_empty());
        assert_eq!(once, twice);
    }

    #[test]
    fn write_failure_keeps_memory_authoritative() {
        let backend = MemoryBackend::new();
        let mut store = ScoreStore::open(backend.clone());
        backend.fail_writes(true);

        store.append(typing(55));

        assert_eq!(store.history().typing_test.len(), 1);
        assert!(backend.raw(STORAGE_KEY).is_none());
        assert!(store.load().is_empty());
    }

    #[test]
    fn oversized_blob_is_truncated_on_open() {
        let mut history = ScoreHistory::default();
        for n in 0..7 {
            history.typing_test.push_back(typing(n));
        }
        let raw = serde_json::to_string(&history).unwrap();

        let store = ScoreStore::open(MemoryBackend::with_blob(STORAGE_KEY, &raw));
        assert_eq!(store.history().typing_test.len(), 5);
        assert_eq!(store.history().typing_test[0].words_per_minute, 0);
    }

    #[test]
    fn subscribers_see_each_change() {
        let mut store = ScoreStore::open(MemoryBackend::new());
        let rx = store.subscribe();

        store.append(aim(9.0));
        store.clear();

        assert_eq!(rx.try_recv().unwrap().aim_trainer.len(), 1);
        assert!(rx.try_recv().unwrap().is_empty());
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut store = ScoreStore::open(MemoryBackend::new());
        drop(store.subscribe());
        store.append(aim(9.0));
        assert!(store.subscribers.is_empty());
    }

    #[test]
    fn file_backend_roundtrip() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::with_dir(dir.path().join("nested"));

        let mut store = ScoreStore::open(backend.clone());
        store.append(typing(80));
        store.append(typing(90));

        assert!(backend.path_for(STORAGE_KEY).exists());
        let reopened = ScoreStore::open(backend);
        let wpms: Vec<u32> = reopened
            .history()
            .typing_test
            .iter()
            .map(|s| s.words_per_minute)
            .collect();
        assert_eq!(wpms, vec![90, 80]);
    }

    #[test]
    fn unreadable_file_is_swallowed() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::with_dir(dir.path());
        // a directory where the blob should be makes both read and write fail
        std::fs::create_dir_all(backend.path_for(STORAGE_KEY)).unwrap();

        let mut store = ScoreStore::open(backend);
        assert!(store.history().is_empty());

        store.append(typing(40));
        assert_eq!(store.history().typing_test.len(), 1);
    }
}
