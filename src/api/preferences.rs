use std::sync::Arc;

use serde_json::{json, Value};

use crate::bridge::{ops, Invoke};
use crate::error::Result;

/// Key/value preferences persisted by the backend.
#[derive(Clone)]
pub struct Preferences {
    bridge: Arc<dyn Invoke>,
}

impl Preferences {
    pub fn new(bridge: Arc<dyn Invoke>) -> Self {
        Self { bridge }
    }

    /// `None` when the key was never written.
    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        let value = self
            .bridge
            .invoke(ops::GET_DATA_KEY, json!({ "key": key }))
            .await?;
        Ok((!value.is_null()).then_some(value))
    }

    pub async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.bridge
            .invoke(ops::SET_DATA_KEY, json!({ "key": key, "value": value }))
            .await?;
        Ok(())
    }

    /// Stored CSV location. An empty string counts as unset.
    pub async fn csv_path(&self) -> Result<Option<String>> {
        Ok(match self.get(ops::CSV_PATH_KEY).await? {
            Some(Value::String(path)) if !path.is_empty() => Some(path),
            _ => None,
        })
    }

    pub async fn set_csv_path(&self, path: &str) -> Result<()> {
        self.set(ops::CSV_PATH_KEY, json!(path)).await
    }

    pub async fn clear_csv_path(&self) -> Result<()> {
        self.set(ops::CSV_PATH_KEY, json!("")).await
    }
}
