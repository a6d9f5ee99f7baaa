//! File-backed storage backend

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use crate::storage::{check_quota, KeyValueStorage};
use crate::StorageError;

const EXTENSION: &str = "json";

/// Stores each key as `<dir>/<key>.json`.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
    quota: Option<usize>,
}

impl FileStorage {
    pub fn open(dir: impl Into<PathBuf>, quota: Option<usize>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, quota })
    }

    pub fn dir(&self) -> &Path { &self.dir }

    fn path_for(&self, key: &str) -> PathBuf { self.dir.join(format!("{}.{}", key, EXTENSION)) }

    /// Bytes used by every entry except `key`.
    fn used_by_others(&self, key: &str) -> Result<usize, StorageError> {
        let own = self.path_for(key);
        let mut total = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path == own || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) { continue; }
            total += fs::metadata(&path)?.len() as usize;
        }
        Ok(total)
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.quota.is_some() {
            check_quota(key, self.used_by_others(key)?, value.len(), self.quota)?;
        }
        fs::write(self.path_for(key), value)?;
        debug!(key, bytes = value.len(), "storage entry written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let s = FileStorage::open(dir.path().join("data"), None).unwrap();
        assert_eq!(s.get("products").unwrap(), None);
        s.set("products", "[1,2]").unwrap();
        assert!(dir.path().join("data/products.json").exists());

        let reopened = FileStorage::open(dir.path().join("data"), None).unwrap();
        assert_eq!(reopened.get("products").unwrap().as_deref(), Some("[1,2]"));
        reopened.remove("products").unwrap();
        reopened.remove("products").unwrap();
        assert_eq!(reopened.get("products").unwrap(), None);
    }

    #[test]
    fn test_quota_rejects_and_keeps_old_value() {
        let dir = tempfile::tempdir().unwrap();
        let s = FileStorage::open(dir.path(), Some(10)).unwrap();
        s.set("productDraft", "{}").unwrap();
        s.set("products", "[]").unwrap();
        let err = s.set("products", "[\"0123456789\"]").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert_eq!(s.get("products").unwrap().as_deref(), Some("[]"));
    }
}
