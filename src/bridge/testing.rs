use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use serde_json::Value;

use super::Invoke;
use crate::error::Result;

type Handler = dyn Fn(&str, &Value) -> Result<Value> + Send + Sync;

/// Test double answering every call through a closure and recording what was asked.
#[derive(Clone)]
pub struct RecordingBridge {
    handler: Arc<Handler>,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl RecordingBridge {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, operation: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(name, _)| name == operation)
            .map(|(_, params)| params)
            .collect()
    }
}

impl Invoke for RecordingBridge {
    fn invoke<'a>(&'a self, operation: &'a str, params: Value) -> BoxFuture<'a, Result<Value>> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push((operation.to_string(), params.clone()));
            (self.handler)(operation, &params)
        })
    }
}
