use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Key/value blob store. Every widget keeps its own JSON payload under a
/// distinct key; reads never fail, writes report failure to the caller.
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, raw: &str) -> Result<()>;
}

// ============================================================================
// File-backed storage
// ============================================================================

/// One `<key>.json` file per key inside a data directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path(key)).ok()
    }

    fn set(&self, key: &str, raw: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create data dir {}", self.dir.display()))?;
        let path = self.path(key);
        fs::write(&path, raw).with_context(|| format!("Failed to write {}", path.display()))
    }
}

// ============================================================================
// In-memory storage
// ============================================================================

#[cfg(test)]
pub use memory::MemoryStorage;

#[cfg(test)]
mod memory {
    use super::Storage;
    use anyhow::Result;
    use std::{
        cell::{Cell, RefCell},
        collections::HashMap,
    };

    /// Process-local map. `set_failing(true)` makes every write fail, which is how a
    /// full or unavailable store looks from the outside.
    #[derive(Default)]
    pub struct MemoryStorage {
        entries: RefCell<HashMap<String, String>>,
        failing: Cell<bool>,
    }

    impl MemoryStorage {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.set(failing);
        }
    }

    impl Storage for MemoryStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.entries.borrow().get(key).cloned()
        }

        fn set(&self, key: &str, raw: &str) -> Result<()> {
            if self.failing.get() {
                anyhow::bail!("storage unavailable for key {key}");
            }
            self.entries.borrow_mut().insert(key.into(), raw.into());
            Ok(())
        }
    }
}

// ============================================================================
// JSON helpers
// ============================================================================

/// Missing or malformed payloads load as `T::default()`.
pub fn load_json<T: for<'de> Deserialize<'de> + Default>(storage: &dyn Storage, key: &str) -> T {
    storage
        .get(key)
        .and_then(|raw| match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("ignoring malformed payload under {key}: {err}");
                None
            }
        })
        .unwrap_or_default()
}

pub fn save_json<T: Serialize>(storage: &dyn Storage, key: &str, data: &T) -> Result<()> {
    let raw = serde_json::to_string_pretty(data)?;
    storage.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Serialize, Deserialize, Default, PartialEq, Debug)]
    struct Sample {
        count: u32,
    }

    #[test]
    fn file_storage_creates_dir_and_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().join("nested"));

        assert_eq!(storage.get("settings"), None);
        storage.set("settings", "{\"a\":1}").unwrap();
        assert_eq!(storage.get("settings").as_deref(), Some("{\"a\":1}"));
        assert!(temp_dir.path().join("nested").join("settings.json").exists());
    }

    #[test]
    fn load_json_falls_back_to_default_on_garbage() {
        let storage = MemoryStorage::new();
        storage.set("sample", "not json").unwrap();

        let loaded: Sample = load_json(&storage, "sample");
        assert_eq!(loaded, Sample::default());

        let missing: Sample = load_json(&storage, "absent");
        assert_eq!(missing, Sample::default());
    }

    #[test]
    fn failing_memory_storage_rejects_writes() {
        let storage = MemoryStorage::new();
        storage.set_failing(true);

        assert!(save_json(&storage, "sample", &Sample { count: 3 }).is_err());
        assert_eq!(storage.get("sample"), None);

        storage.set_failing(false);
        save_json(&storage, "sample", &Sample { count: 3 }).unwrap();
        let loaded: Sample = load_json(&storage, "sample");
        assert_eq!(loaded.count, 3);
    }
}
