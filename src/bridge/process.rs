use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs::File;
use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::BoxFuture;
use log::{debug, warn};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::oneshot;

use super::envelope::{Request, Response};
use super::Invoke;
use crate::error::{AppError, Context, Result};

#[derive(Default)]
struct Pending {
    closed: Option<String>,
    waiters: HashMap<String, oneshot::Sender<Response>>,
}

impl Pending {
    fn close(&mut self, reason: &str) {
        self.closed.get_or_insert_with(|| reason.to_string());
        // Dropping the senders wakes every waiter with a receive error.
        self.waiters.clear();
    }
}

type SharedPending = Arc<Mutex<Pending>>;

/// Talks to a backend child process over JSON lines on its stdin/stdout.
pub struct ProcessBridge {
    stdin: tokio::sync::Mutex<ChildStdin>,
    pending: SharedPending,
    next_id: AtomicU64,
    _child: Mutex<Child>,
}

impl ProcessBridge {
    /// Start the backend and its response reader. Must be called inside a tokio runtime.
    ///
    /// The child's stderr goes to `stderr_log` when given, otherwise it is discarded so
    /// backend logging never lands on the terminal UI.
    pub fn spawn<S: AsRef<OsStr>>(
        program: S,
        args: &[String],
        stderr_log: Option<&Path>,
    ) -> Result<Self> {
        let stderr = match stderr_log {
            Some(path) => Stdio::from(
                File::create(path)
                    .with_context(|| format!("Failed to create backend log {}", path.display()))?,
            ),
            None => Stdio::null(),
        };

        let program_label = program.as_ref().to_string_lossy().to_string();
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(stderr)
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start backend `{program_label}`"))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| AppError::transport("backend stdin unavailable"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AppError::transport("backend stdout unavailable"))?;

        let pending: SharedPending = Arc::default();
        tokio::spawn(read_responses(stdout, Arc::clone(&pending)));
        debug!("Started backend process `{program_label}`");

        Ok(Self {
            stdin: tokio::sync::Mutex::new(stdin),
            pending,
            next_id: AtomicU64::new(1),
            _child: Mutex::new(child),
        })
    }

    fn register(&self, id: &str) -> Result<oneshot::Receiver<Response>> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(reason) = &pending.closed {
            return Err(AppError::transport(reason.clone()));
        }
        let (tx, rx) = oneshot::channel();
        pending.waiters.insert(id.to_string(), tx);
        Ok(rx)
    }

    fn forget(&self, id: &str) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .waiters
            .remove(id);
    }

    async fn send_line(&self, line: &str) -> std::io::Result<()> {
        let mut stdin = self.stdin.lock().await;
        stdin.write_all(line.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await
    }
}

impl Invoke for ProcessBridge {
    fn invoke<'a>(&'a self, operation: &'a str, params: Value) -> BoxFuture<'a, Result<Value>> {
        Box::pin(async move {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
            let rx = self.register(&id)?;

            let request = Request {
                id: id.clone(),
                method: operation.to_string(),
                params,
            };
            let line = serde_json::to_string(&request)?;
            if let Err(err) = self.send_line(&line).await {
                self.forget(&id);
                return Err(AppError::transport(format!(
                    "failed to send {operation} to backend: {err}"
                )));
            }
            debug!("-> {operation} #{id}");

            let response = rx.await.map_err(|_| {
                AppError::transport(format!("backend exited before answering {operation}"))
            })?;
            response.into_result(operation)
        })
    }
}

async fn read_responses(stdout: ChildStdout, pending: SharedPending) {
    let mut lines = BufReader::new(stdout).lines();
    let reason = loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<Response>(&line) {
                    Ok(response) => route_response(&pending, response),
                    Err(err) => warn!("Discarding unreadable backend line: {err}"),
                }
            }
            Ok(None) => break "backend process exited".to_string(),
            Err(err) => break format!("failed to read backend output: {err}"),
        }
    };
    warn!("Backend bridge closed: {reason}");
    pending
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .close(&reason);
}

fn route_response(pending: &SharedPending, response: Response) {
    let Some(id) = response.id.clone() else {
        warn!("Backend response without id: {:?}", response.error);
        return;
    };
    let waiter = pending
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .waiters
        .remove(&id);
    match waiter {
        Some(tx) => {
            debug!("<- #{id} ok={}", response.ok);
            let _ = tx.send(response);
        }
        None => warn!("Backend answered unknown request #{id}"),
    }
}
