use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use crate::app::infrastructure::error::{AppError, Result};
use crate::app::services::persistence::KeyValueStore;

/// In-memory store. Clones share the same map, which lets tests inspect
/// what a gateway wrote.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
    quota: Rc<Cell<Option<usize>>>,
}

impl MemoryStore {
    /// Limit the size of a single value; larger writes fail like a full quota.
    pub fn set_quota(&self, quota: Option<usize>) {
        self.quota.set(quota);
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(limit) = self.quota.get() {
            if value.len() > limit {
                return Err(AppError::StorageFailure(format!(
                    "quota exceeded ({} > {} bytes)",
                    value.len(),
                    limit
                )));
            }
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Returns the data directory path: data_dir/ferrisplay/
    pub fn default_dir() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("ferrisplay");
        path
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::StorageFailure(format!("Failed to read {}: {}", key, e))),
        }
    }

    /// Writes to a temp file first so a failed write never truncates the slot.
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| AppError::StorageFailure(format!("Failed to create data dir: {}", e)))?;
        let target = self.path_for(key);
        let temp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&temp, value)
            .map_err(|e| AppError::StorageFailure(format!("Failed to write {}: {}", key, e)))?;
        fs::rename(&temp, &target)
            .map_err(|e| AppError::StorageFailure(format!("Failed to replace {}: {}", key, e)))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::StorageFailure(format!("Failed to remove {}: {}", key, e))),
        }
    }
}
