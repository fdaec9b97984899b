//! High-score persistence
//!
//! The game only needs a single named integer. Stores are last-write-wins.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use log::{debug, warn};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::HIGHSCORE_KEY;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("high score storage error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("high score file {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// get/set collaborator for the persisted high score
pub trait HighScoreStore: Send + std::fmt::Debug {
    fn get(&self) -> Result<u32, StoreError>;
    fn set(&mut self, value: u32) -> Result<(), StoreError>;
}

/// In-process store. Clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Arc<AtomicU32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: u32) -> Self {
        Self {
            value: Arc::new(AtomicU32::new(value)),
        }
    }

    pub fn value(&self) -> u32 {
        self.value.load(Ordering::SeqCst)
    }
}

impl HighScoreStore for MemoryStore {
    fn get(&self) -> Result<u32, StoreError> {
        Ok(self.value())
    }

    fn set(&mut self, value: u32) -> Result<(), StoreError> {
        self.value.store(value, Ordering::SeqCst);
        Ok(())
    }
}

/// JSON object on disk, high score under [`HIGHSCORE_KEY`].
/// Other keys in the file are preserved on write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_object(&self) -> Result<Map<String, Value>, StoreError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        match serde_json::from_str(&json) {
            Ok(Value::Object(map)) => Ok(map),
            // Any other JSON value carries no score
            Ok(_) => Ok(Map::new()),
            Err(source) => Err(StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl HighScoreStore for JsonFileStore {
    fn get(&self) -> Result<u32, StoreError> {
        let map = self.read_object()?;
        Ok(map
            .get(HIGHSCORE_KEY)
            .and_then(Value::as_u64)
            .map(|v| v.min(u32::MAX as u64) as u32)
            .unwrap_or(0))
    }

    fn set(&mut self, value: u32) -> Result<(), StoreError> {
        // A corrupt file is replaced rather than blocking the write
        let mut map = self.read_object().unwrap_or_default();
        map.insert(HIGHSCORE_KEY.to_string(), Value::from(value));

        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(&Value::Object(map)).map_err(|source| {
            StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        std::fs::write(&self.path, json).map_err(io_err)?;
        Ok(())
    }
}

/// [`JsonFileStore`] kept off the game task.
///
/// The file is read once on construction; afterwards `get` answers from the
/// cached value and `set` hands the write to a writer task that runs the file
/// I/O on tokio's blocking pool. Writes are applied in order.
#[derive(Debug)]
pub struct BackgroundFileStore {
    cached: Arc<AtomicU32>,
    writes: mpsc::UnboundedSender<u32>,
}

impl BackgroundFileStore {
    /// Must be called inside a tokio runtime
    pub fn spawn(inner: JsonFileStore) -> Self {
        let initial = inner.get().unwrap_or_else(|e| {
            warn!("reading high score failed, starting from 0: {}", e);
            0
        });
        let (writes, rx) = mpsc::unbounded_channel();
        tokio::spawn(write_loop(inner, rx));

        Self {
            cached: Arc::new(AtomicU32::new(initial)),
            writes,
        }
    }
}

impl HighScoreStore for BackgroundFileStore {
    fn get(&self) -> Result<u32, StoreError> {
        Ok(self.cached.load(Ordering::SeqCst))
    }

    fn set(&mut self, value: u32) -> Result<(), StoreError> {
        self.cached.store(value, Ordering::SeqCst);
        if self.writes.send(value).is_err() {
            warn!("high score writer stopped, {} kept in memory only", value);
        }
        Ok(())
    }
}

async fn write_loop(store: JsonFileStore, mut rx: mpsc::UnboundedReceiver<u32>) {
    while let Some(value) = rx.recv().await {
        let mut writer = store.clone();
        match tokio::task::spawn_blocking(move || writer.set(value)).await {
            Ok(Ok(())) => debug!("high score {} written to {}", value, store.path().display()),
            Ok(Err(e)) => warn!("persisting high score {} failed: {}", value, e),
            Err(e) => warn!("high score writer panicked: {}", e),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("handsign_store_{}_{}", std::process::id(), name))
            .join("highscore.json")
    }

    #[test]
    fn test_memory_store_shared_between_clones() {
        let store = MemoryStore::with_value(3);
        let mut writer = store.clone();
        writer.set(8).unwrap();
        assert_eq!(store.get().unwrap(), 8);
    }

    #[test]
    fn test_missing_file_reads_zero() {
        let store = JsonFileStore::new(temp_path("missing"));
        assert_eq!(store.get().unwrap(), 0);
    }

    #[test]
    fn test_file_roundtrip_creates_dirs() {
        let path = temp_path("roundtrip");
        let mut store = JsonFileStore::new(&path);
        store.set(12).unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get().unwrap(), 12);

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[HIGHSCORE_KEY], 12);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_other_keys_preserved() {
        let path = temp_path("preserve");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"player": "ana", "highscore": 2}"#).unwrap();

        let mut store = JsonFileStore::new(&path);
        assert_eq!(store.get().unwrap(), 2);
        store.set(6).unwrap();

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["player"], "ana");
        assert_eq!(raw[HIGHSCORE_KEY], 6);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_errors_on_read_but_write_recovers() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        let mut store = JsonFileStore::new(&path);
        assert!(matches!(store.get(), Err(StoreError::Corrupt { .. })));

        store.set(4).unwrap();
        assert_eq!(store.get().unwrap(), 4);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_background_store_writes_off_task() {
        let path = temp_path("background");
        let mut seed = JsonFileStore::new(&path);
        seed.set(3).unwrap();

        let mut store = BackgroundFileStore::spawn(JsonFileStore::new(&path));
        assert_eq!(store.get().unwrap(), 3);

        store.set(9).unwrap();
        store.set(11).unwrap();
        // Cached value is visible immediately
        assert_eq!(store.get().unwrap(), 11);

        let reader = JsonFileStore::new(&path);
        for _ in 0..200 {
            if reader.get().unwrap_or(0) == 11 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(reader.get().unwrap(), 11);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_background_store_tolerates_corrupt_file() {
        let path = temp_path("background_corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{{{").unwrap();

        let store = BackgroundFileStore::spawn(JsonFileStore::new(&path));
        assert_eq!(store.get().unwrap(), 0);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
