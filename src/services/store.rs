//! JSON file store for tournament state.
//!
//! Each key maps to one pretty-printed JSON file under the data
//! directory. Failures are logged and turned into defaults or `false`;
//! callers never see an I/O error from here.

use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// File-backed key-value store.
#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    /// Create a store rooted at `data_dir`. The directory is created lazily on save.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Resolved file path for a key.
    pub fn path(&self, key: &str) -> PathBuf {
        // Sanitize key for filesystem
        let safe_key = key.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_");
        self.data_dir.join(safe_key)
    }

    /// Load a value, falling back to `default` when the file is missing or unreadable.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let path = self.path(key);
        if !path.exists() {
            debug!("{} does not exist, using default", path.display());
            return default;
        }

        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                return default;
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to parse JSON from {}: {}", path.display(), e);
                default
            }
        }
    }

    /// Save a value. Returns whether the write succeeded.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let path = self.path(key);

        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create directory {}: {}", parent.display(), e);
                return false;
            }
        }

        let content = match serde_json::to_string_pretty(value) {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to serialize {}: {}", key, e);
                return false;
            }
        };

        match fs::write(&path, content) {
            Ok(()) => {
                debug!("Saved {}", path.display());
                true
            }
            Err(e) => {
                error!("Failed to write {}: {}", path.display(), e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    fn create_test_store(name: &str) -> JsonStore {
        let dir = std::env::temp_dir().join(format!("tourney_store_{}", name));
        if dir.exists() {
            let _ = fs::remove_dir_all(&dir);
        }
        JsonStore::new(dir)
    }

    fn cleanup_test_store(store: &JsonStore) {
        let _ = fs::remove_dir_all(store.data_dir());
    }

    #[test]
    fn test_save_and_load() {
        let store = create_test_store("save_load");

        let mut data = BTreeMap::new();
        data.insert("key".to_string(), vec![1, 2, 3]);

        assert!(store.save("data.json", &data));
        let loaded: BTreeMap<String, Vec<i32>> = store.load("data.json", BTreeMap::new());

        assert_eq!(loaded, data);
        cleanup_test_store(&store);
    }

    #[test]
    fn test_load_missing_returns_default() {
        let store = create_test_store("missing");

        let loaded: Vec<String> = store.load("does_not_exist.json", vec!["default".to_string()]);

        assert_eq!(loaded, vec!["default"]);
        cleanup_test_store(&store);
    }

    #[test]
    fn test_load_corrupt_returns_default() {
        let store = create_test_store("corrupt");
        fs::create_dir_all(store.data_dir()).unwrap();
        fs::write(store.path("bad.json"), "{not json").unwrap();

        let loaded: BTreeMap<String, f64> = store.load("bad.json", BTreeMap::new());

        assert!(loaded.is_empty());
        cleanup_test_store(&store);
    }

    #[test]
    fn test_load_wrong_shape_returns_default() {
        let store = create_test_store("shape");
        assert!(store.save("shape.json", &vec![1, 2, 3]));

        let loaded: BTreeMap<String, f64> = store.load("shape.json", BTreeMap::new());

        assert!(loaded.is_empty());
        cleanup_test_store(&store);
    }

    #[test]
    fn test_save_creates_directory() {
        let store = create_test_store("nested");
        let nested = JsonStore::new(store.data_dir().join("a").join("b"));

        assert!(nested.save("x.json", &42));
        assert_eq!(nested.load("x.json", 0), 42);
        cleanup_test_store(&store);
    }

    #[test]
    fn test_save_is_pretty_printed() {
        let store = create_test_store("pretty");

        #[derive(Serialize, Deserialize)]
        struct Point {
            x: i32,
        }

        assert!(store.save("p.json", &Point { x: 1 }));
        let raw = fs::read_to_string(store.path("p.json")).unwrap();
        assert_eq!(raw, "{\n  \"x\": 1\n}");
        cleanup_test_store(&store);
    }

    #[test]
    fn test_save_fails_when_path_is_a_directory() {
        let store = create_test_store("dir_conflict");
        fs::create_dir_all(store.path("taken.json")).unwrap();

        assert!(!store.save("taken.json", &1));
        cleanup_test_store(&store);
    }

    #[test]
    fn test_key_sanitization() {
        let store = create_test_store("sanitize");

        assert!(store.save("a/b:c*?.json", &"value"));
        assert!(store.path("a/b:c*?.json").ends_with("a_b_c__.json"));
        assert_eq!(store.load("a/b:c*?.json", String::new()), "value");
        cleanup_test_store(&store);
    }
}
