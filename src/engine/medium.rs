use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::{Error, Result};

/// A durable, string-keyed text storage medium.
///
/// The [`Store`](crate::engine::Store) is the only caller; it decides what to do with
/// failures, so implementations just report them.
pub trait Medium: Send + Sync {
    /// Returns the text stored under `key`, or `None` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;
    /// Replaces the text under `key`. On failure the previous text must survive.
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Stores every key as `<key>.json` in a directory.
///
/// Writes go to a temporary file that is then renamed over the destination, so a
/// crash mid-write never leaves a half-written collection behind.
pub struct FileMedium {
    data_dir: PathBuf,
}

impl FileMedium {
    /// Opens a medium rooted at `dir`, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { data_dir: dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }
}

impl Medium for FileMedium {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let file_path = self.path_for(key);
        let temp_path = file_path.with_extension("json.tmp");

        fs::write(&temp_path, value)?;
        fs::rename(&temp_path, &file_path)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local medium. An optional quota caps the total bytes held across all
/// keys, mirroring the storage limits of a browser.
#[derive(Default)]
pub struct MemoryMedium {
    entries: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota: Some(bytes),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, String>>> {
        self.entries.read().map_err(|_| Error::Internal("memory medium lock poisoned".to_string()))
    }
}

impl Medium for MemoryMedium {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Error::Internal("memory medium lock poisoned".to_string()))?;
        if let Some(quota) = self.quota {
            let others: usize = entries.iter().filter(|(k, _)| k.as_str() != key).map(|(_, v)| v.len()).sum();
            if others + value.len() > quota {
                return Err(Error::QuotaExceeded);
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Error::Internal("memory medium lock poisoned".to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_medium_set_get_remove() {
        let dir = tempdir().unwrap();
        let medium = FileMedium::new(dir.path()).unwrap();

        assert_eq!(medium.get("employees").unwrap(), None);
        medium.set("employees", "[]").unwrap();
        assert_eq!(medium.get("employees").unwrap().as_deref(), Some("[]"));

        medium.remove("employees").unwrap();
        assert_eq!(medium.get("employees").unwrap(), None);
        medium.remove("employees").unwrap();
    }

    #[test]
    fn test_atomic_rename() {
        let dir = tempdir().unwrap();
        let medium = FileMedium::new(dir.path()).unwrap();

        medium.set("users", "[]").unwrap();

        assert!(dir.path().join("users.json").exists());
        assert!(!dir.path().join("users.json.tmp").exists());
    }

    #[test]
    fn test_file_medium_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let medium = FileMedium::new(&nested).unwrap();
        medium.set("trainings", "[]").unwrap();
        assert!(nested.join("trainings.json").exists());
    }

    #[test]
    fn test_quota_rejects_write_and_keeps_previous_value() {
        let medium = MemoryMedium::with_quota(10);
        medium.set("k", "12345").unwrap();

        let res = medium.set("k", "0123456789abc");
        assert!(matches!(res, Err(Error::QuotaExceeded)));
        assert_eq!(medium.get("k").unwrap().as_deref(), Some("12345"));

        // Overwriting a key does not count its old value against the quota.
        medium.set("k", "0123456789").unwrap();
    }
}
