use super::StorageBackend;
use crate::error::{FretpadError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const STORE_FILENAME: &str = "store.json";

/// File-backed storage: the whole key space as one JSON object in
/// `<root>/store.json`, reloaded on read and rewritten on every mutation.
///
/// Write-through on purpose: a `set` that returned is on disk, so a crash
/// immediately afterwards never loses that key.
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn store_path(&self) -> PathBuf {
        self.root.join(STORE_FILENAME)
    }

    fn load_map(&self) -> Result<BTreeMap<String, String>> {
        let path = self.store_path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(path).map_err(FretpadError::Io)?;
        let map: BTreeMap<String, String> =
            serde_json::from_str(&content).map_err(FretpadError::Serialization)?;
        Ok(map)
    }

    fn save_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(FretpadError::Io)?;
        }
        let content = serde_json::to_string_pretty(map).map_err(FretpadError::Serialization)?;
        // Write via a temp file so a crash mid-write cannot truncate the map.
        let tmp = self.root.join(format!("{}.tmp", STORE_FILENAME));
        fs::write(&tmp, content).map_err(FretpadError::Io)?;
        fs::rename(&tmp, self.store_path()).map_err(FretpadError::Io)?;
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut map = self.load_map()?;
        map.insert(key.to_string(), value.to_string());
        self.save_map(&map)
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load_map()?.remove(key))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut map = self.load_map()?;
        if map.remove(key).is_some() {
            self.save_map(&map)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.load_map()?.into_keys().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::new(dir.path());
        backend.set("users", "[]").unwrap();

        // A fresh instance sees the value: durability, not caching.
        let backend2 = FileBackend::new(dir.path());
        assert_eq!(backend2.get("users").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn remove_missing_key_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::new(dir.path());
        backend.remove("nope").unwrap();
    }

    #[test]
    fn keys_lists_everything() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::new(dir.path());
        backend.set("a", "1").unwrap();
        backend.set("b", "2").unwrap();
        let mut keys = backend.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn corrupt_store_file_surfaces_as_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STORE_FILENAME), "{not json").unwrap();
        let backend = FileBackend::new(dir.path());
        assert!(backend.get("users").is_err());
    }
}
