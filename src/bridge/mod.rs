//! Remote invocation: one async primitive that sends a named operation plus a
//! JSON parameter object to the backend and returns its JSON answer.
//!
//! There are no retries and no timeouts; each call is attempted once and the
//! caller decides what to do with a failure.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::Result;

pub mod envelope;
pub mod local;
pub mod ops;
pub mod process;

#[cfg(test)]
pub(crate) mod testing;

pub use envelope::{Request, Response, WireError};
pub use local::LocalBridge;
pub use process::ProcessBridge;

/// Transport-neutral call into the backend.
pub trait Invoke: Send + Sync {
    fn invoke<'a>(&'a self, operation: &'a str, params: Value) -> BoxFuture<'a, Result<Value>>;
}

impl<T: Invoke + ?Sized> Invoke for Arc<T> {
    fn invoke<'a>(&'a self, operation: &'a str, params: Value) -> BoxFuture<'a, Result<Value>> {
        (**self).invoke(operation, params)
    }
}
