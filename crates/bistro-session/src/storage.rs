//! # Storage Slots
//!
//! Durable key/value storage shared by every session of one customer, the
//! way browser local storage is shared by every tab.
//!
//! ## Change Notifications
//! ```text
//!   Session A                 StorageSlot                 Session B
//!   ─────────                 ───────────                 ─────────
//!   write("bistro.cart") ───► store value
//!                             broadcast SlotChange ─────► origin != B?
//!                             { key, origin: A }          └─► re-read slot
//! ```
//!
//! Last write wins. There is no locking across sessions.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::error::{SessionError, SessionResult};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Identifies which session performed a write.
pub type WriterId = Uuid;

/// Published after every successful write or removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotChange {
    pub key: String,
    pub origin: WriterId,
}

/// A durable key/value store with change notifications.
pub trait StorageSlot: Send + Sync {
    /// Returns the stored value, or `None` if the key was never written.
    fn read(&self, key: &str) -> SessionResult<Option<String>>;

    fn write(&self, key: &str, value: &str, origin: WriterId) -> SessionResult<()>;

    fn remove(&self, key: &str, origin: WriterId) -> SessionResult<()>;

    /// Receives every change made through this backend.
    fn subscribe(&self) -> broadcast::Receiver<SlotChange>;
}

fn publish(tx: &broadcast::Sender<SlotChange>, key: &str, origin: WriterId) {
    // No subscribers is fine
    let _ = tx.send(SlotChange {
        key: key.to_string(),
        origin,
    });
}

// =============================================================================
// Memory Storage
// =============================================================================

/// In-process storage. Clones share the same map and channel, so several
/// `CartStore`s built from clones behave like tabs of one browser.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
    changes: broadcast::Sender<SlotChange>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        MemoryStorage {
            values: Arc::new(Mutex::new(HashMap::new())),
            changes,
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        MemoryStorage::new()
    }
}

impl StorageSlot for MemoryStorage {
    fn read(&self, key: &str) -> SessionResult<Option<String>> {
        let values = self.values.lock().map_err(|_| SessionError::LockPoisoned)?;
        Ok(values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str, origin: WriterId) -> SessionResult<()> {
        {
            let mut values = self.values.lock().map_err(|_| SessionError::LockPoisoned)?;
            values.insert(key.to_string(), value.to_string());
        }
        publish(&self.changes, key, origin);
        Ok(())
    }

    fn remove(&self, key: &str, origin: WriterId) -> SessionResult<()> {
        {
            let mut values = self.values.lock().map_err(|_| SessionError::LockPoisoned)?;
            values.remove(key);
        }
        publish(&self.changes, key, origin);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SlotChange> {
        self.changes.subscribe()
    }
}

// =============================================================================
// File Storage
// =============================================================================

/// One JSON file per key under a directory.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// crash mid-write leaves either the old value or the new one.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    changes: broadcast::Sender<SlotChange>,
}

impl FileStorage {
    /// Opens (and creates if needed) the storage directory.
    pub fn open(dir: impl Into<PathBuf>) -> SessionResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        debug!(dir = %dir.display(), "Opened file storage");
        Ok(FileStorage { dir, changes })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl StorageSlot for FileStorage {
    fn read(&self, key: &str) -> SessionResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str, origin: WriterId) -> SessionResult<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));

        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        publish(&self.changes, key, origin);
        Ok(())
    }

    fn remove(&self, key: &str, origin: WriterId) -> SessionResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        publish(&self.changes, key, origin);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SlotChange> {
        self.changes.subscribe()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_shared_between_clones() {
        let tab_a = MemoryStorage::new();
        let tab_b = tab_a.clone();
        let writer = Uuid::new_v4();

        assert_eq!(tab_b.read("k").unwrap(), None);
        tab_a.write("k", "v1", writer).unwrap();
        assert_eq!(tab_b.read("k").unwrap().as_deref(), Some("v1"));

        tab_b.remove("k", writer).unwrap();
        assert_eq!(tab_a.read("k").unwrap(), None);
    }

    #[test]
    fn test_memory_storage_publishes_changes() {
        let storage = MemoryStorage::new();
        let mut rx = storage.subscribe();
        let writer = Uuid::new_v4();

        storage.write("bistro.cart", "[]", writer).unwrap();
        let change = rx.try_recv().unwrap();
        assert_eq!(change.key, "bistro.cart");
        assert_eq!(change.origin, writer);
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("slots")).unwrap();
        let writer = Uuid::new_v4();

        assert_eq!(storage.read("bistro.cart").unwrap(), None);
        storage.write("bistro.cart", "[1]", writer).unwrap();
        storage.write("bistro.cart", "[2]", writer).unwrap();
        assert_eq!(storage.read("bistro.cart").unwrap().as_deref(), Some("[2]"));

        // Only the final file remains; temp files are renamed away
        let files: Vec<_> = fs::read_dir(storage.dir()).unwrap().collect();
        assert_eq!(files.len(), 1);

        storage.remove("bistro.cart", writer).unwrap();
        storage.remove("bistro.cart", writer).unwrap();
        assert_eq!(storage.read("bistro.cart").unwrap(), None);
    }

    #[test]
    fn test_file_storage_sanitises_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        storage.write("../escape", "x", Uuid::new_v4()).unwrap();
        assert!(dir.path().join(".._escape.json").exists());
    }
}
