use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use dashmap::DashMap;
use eyre::{Result, WrapErr};
use log::debug;

/// Local key/value persistence. Batches are applied as one write.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set_all(&self, entries: &[(&str, String)]) -> Result<()>;
    fn remove_all(&self, keys: &[&str]) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            entries: DashMap::new(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|value| value.clone()))
    }

    fn set_all(&self, entries: &[(&str, String)]) -> Result<()> {
        for (key, value) in entries {
            self.entries.insert(key.to_string(), value.clone());
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.entries.remove(*key);
        }
        Ok(())
    }
}

/// A JSON object on disk. Every batch rewrites the whole file through a temp file.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path)
            .wrap_err_with(|| format!("reading {}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).wrap_err_with(|| format!("parsing {}", self.path.display()))
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_string_pretty(entries)?)
            .wrap_err_with(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .wrap_err_with(|| format!("replacing {}", self.path.display()))?;
        debug!("store written to {}", self.path.display());
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut entries = self.read()?;
        apply(&mut entries);
        self.write(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(self.read()?.remove(key))
    }

    fn set_all(&self, entries: &[(&str, String)]) -> Result<()> {
        self.update(|stored| {
            for (key, value) in entries {
                stored.insert(key.to_string(), value.clone());
            }
        })
    }

    fn remove_all(&self, keys: &[&str]) -> Result<()> {
        self.update(|stored| {
            for key in keys {
                stored.remove(*key);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn KeyValueStore) -> Result<()> {
        assert_eq!(None, store.get("token")?);
        store.set_all(&[("token", "t1".to_string()), ("user", "{}".to_string())])?;
        assert_eq!(Some("t1".to_string()), store.get("token")?);
        assert_eq!(Some("{}".to_string()), store.get("user")?);
        store.remove_all(&["token", "user"])?;
        assert_eq!(None, store.get("token")?);
        assert_eq!(None, store.get("user")?);
        // removing absent keys is fine
        store.remove_all(&["token", "user"])?;
        Ok(())
    }

    #[test]
    fn test_memory_store() -> Result<()> {
        exercise(&MemoryStore::new())
    }

    #[test]
    fn test_file_store() -> Result<()> {
        let dir = tempfile::tempdir()?;
        exercise(&FileStore::new(dir.path().join("session.json")))
    }

    #[test]
    fn test_file_store_survives_reopen() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session.json");
        FileStore::new(&path).set_all(&[("token", "abc".to_string())])?;
        assert_eq!(Some("abc".to_string()), FileStore::new(&path).get("token")?);
        Ok(())
    }
}
