use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::{debug, warn};
use uuid::Uuid;

use super::{Entry, SafetyStorage};
use crate::errors::StorageError;

/// JSON file-backed preferences store.
///
/// Keeps every slot in memory and rewrites the whole file on each mutation.
/// Intended for small per-user settings where a database is overkill.
/// All access goes through one mutex, so reads observe the latest completed
/// write from any thread.
pub struct JsonFileStore {
    inner: Mutex<HashMap<String, Entry>>,
    file_path: PathBuf,
}

impl JsonFileStore {
    /// Open the store at `path`. Creates the file with an empty map if missing.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, StorageError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| StorageError::storage("create store directory", e))?;
            }
        }

        let map: HashMap<String, Entry> = match fs::read(&file_path) {
            Ok(bytes) if bytes.is_empty() => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::storage(&format!("parse {}", file_path.display()), e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty = HashMap::new();
                write_map(&file_path, &empty)?;
                empty
            }
            Err(e) => return Err(StorageError::storage("read store file", e)),
        };

        debug!(path = %file_path.display(), entries = map.len(), "preferences store opened");
        Ok(Self { inner: Mutex::new(map), file_path })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// All keys currently stored, sorted.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let map = self.inner.lock().map_err(|_| StorageError::poisoned())?;
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn read<R>(&self, f: impl FnOnce(&HashMap<String, Entry>) -> R) -> Result<R, StorageError> {
        let map = self.inner.lock().map_err(|_| StorageError::poisoned())?;
        Ok(f(&map))
    }

    /// Replace (or clear) one slot and persist. The slot is rolled back if the
    /// file cannot be written.
    fn apply(&self, key: &str, entry: Option<Entry>) -> Result<(), StorageError> {
        let mut map = self.inner.lock().map_err(|_| StorageError::poisoned())?;
        let previous = match entry {
            Some(e) => map.insert(key.to_string(), e),
            None => {
                let prev = map.remove(key);
                // 删除不存在的键：无需落盘
                if prev.is_none() {
                    return Ok(());
                }
                prev
            }
        };

        if let Err(e) = write_map(&self.file_path, &map) {
            warn!(%key, error = %e, path = %self.file_path.display(), "persist failed, rolling back");
            match previous {
                Some(prev) => map.insert(key.to_string(), prev),
                None => map.remove(key),
            };
            return Err(e);
        }
        debug!(%key, "preferences persisted");
        Ok(())
    }
}

/// Write the map to a sibling temp file, then rename over the target so a
/// reader never sees a half-written file. Each write gets its own temp name,
/// so stores opened on the same path (other processes included) never
/// rename each other's files away.
fn write_map(path: &Path, map: &HashMap<String, Entry>) -> Result<(), StorageError> {
    let data = serde_json::to_vec(map).map_err(|e| StorageError::Encoding(e.to_string()))?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(format!(".{}.tmp", Uuid::new_v4().simple()));
    let tmp = PathBuf::from(tmp);

    let written = fs::write(&tmp, data)
        .map_err(|e| StorageError::storage("write store file", e))
        .and_then(|_| fs::rename(&tmp, path).map_err(|e| StorageError::storage("replace store file", e)));
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}

impl SafetyStorage for JsonFileStore {
    fn save_data(&self, key: &str, data: Vec<u8>) -> Result<(), StorageError> {
        self.apply(key, Some(Entry::Data(data)))
    }

    fn load_data(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.read(|m| m.get(key).and_then(Entry::data))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.apply(key, None)
    }

    fn save_string(&self, value: Option<&str>, key: &str) -> Result<(), StorageError> {
        self.apply(key, value.map(|s| Entry::String(s.to_string())))
    }

    fn load_string(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.read(|m| m.get(key).and_then(Entry::string))
    }
}
