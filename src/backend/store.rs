use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde_json::{Map, Value};

use super::error::BackendError;

const STORE_FILE: &str = "store.json";

/// Flat JSON object on disk holding the application's remembered values.
#[derive(Debug, Clone)]
pub struct PreferenceFile {
    path: PathBuf,
}

impl PreferenceFile {
    /// Open (creating if needed) `store.json` under `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, BackendError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(STORE_FILE);
        if !path.exists() {
            fs::write(&path, "{}")?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().remove(key)
    }

    pub fn set(&self, key: &str, value: Value) -> Result<(), BackendError> {
        let mut data = self.read();
        data.insert(key.to_string(), value);
        let json = serde_json::to_string_pretty(&Value::Object(data))?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// A missing or unreadable file behaves like an empty store.
    fn read(&self) -> Map<String, Value> {
        let Ok(text) = fs::read_to_string(&self.path) else {
            return Map::new();
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!("Ignoring unreadable preference file {}", self.path.display());
                Map::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn values_persist_between_handles() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceFile::open(dir.path()).unwrap();
        assert_eq!(store.get("fileLocation"), None);

        store.set("fileLocation", json!("/tmp/a.csv")).unwrap();
        let reopened = PreferenceFile::open(dir.path()).unwrap();
        assert_eq!(reopened.get("fileLocation"), Some(json!("/tmp/a.csv")));
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceFile::open(dir.path()).unwrap();
        fs::write(store.path(), "{filePath:None}").unwrap();
        assert_eq!(store.get("filePath"), None);

        store.set("k", json!(1)).unwrap();
        assert_eq!(store.get("k"), Some(json!(1)));
    }
}
