use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::BoxFuture;
use log::debug;
use serde_json::Value;

use super::envelope::Request;
use super::Invoke;
use crate::backend::{handle_request, Backend};
use crate::error::{AppError, Result};

/// Runs the backend router in-process. Calls go through the same envelope as the
/// child-process transport and are serialized so CSV writes never interleave.
#[derive(Clone)]
pub struct LocalBridge {
    backend: Arc<Mutex<Backend>>,
}

impl LocalBridge {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend: Arc::new(Mutex::new(backend)),
        }
    }

    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let backend = Backend::open(data_dir).map_err(|err| AppError::message(err.to_string()))?;
        Ok(Self::new(backend))
    }
}

impl Invoke for LocalBridge {
    fn invoke<'a>(&'a self, operation: &'a str, params: Value) -> BoxFuture<'a, Result<Value>> {
        Box::pin(async move {
            let backend = Arc::clone(&self.backend);
            let request = Request {
                id: "local".to_string(),
                method: operation.to_string(),
                params,
            };
            debug!("local -> {operation}");
            let response = tokio::task::spawn_blocking(move || {
                let backend = backend.lock().unwrap_or_else(PoisonError::into_inner);
                handle_request(&backend, request)
            })
            .await?;
            response.into_result(operation)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::ops;
    use serde_json::json;

    #[tokio::test]
    async fn preference_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = LocalBridge::open(dir.path()).unwrap();

        let before = bridge
            .invoke(ops::GET_DATA_KEY, json!({"key": ops::CSV_PATH_KEY}))
            .await
            .unwrap();
        assert_eq!(before, Value::Null);

        bridge
            .invoke(ops::SET_DATA_KEY, json!({"key": ops::CSV_PATH_KEY, "value": "/tmp/x.csv"}))
            .await
            .unwrap();
        let after = bridge
            .invoke(ops::GET_DATA_KEY, json!({"key": ops::CSV_PATH_KEY}))
            .await
            .unwrap();
        assert_eq!(after, json!("/tmp/x.csv"));
    }

    #[tokio::test]
    async fn backend_errors_surface_as_bridge_errors() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = LocalBridge::open(dir.path()).unwrap();
        let err = bridge.invoke(ops::GET_STUDENTS, json!({})).await.unwrap_err();
        assert_eq!(err.bridge_code(), Some("no_data_file"));
    }
}
