use thiserror::Error;

pub use anyhow::Context;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    /// The backend answered the call with an error envelope.
    #[error("{operation} failed ({code}): {message}")]
    Bridge {
        operation: String,
        code: String,
        message: String,
    },
    /// The call never produced an answer: the backend is gone or the channel broke.
    #[error("backend transport error: {0}")]
    Transport(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn message<T: Into<String>>(msg: T) -> Self {
        AppError::Message(msg.into())
    }

    pub fn transport<T: Into<String>>(msg: T) -> Self {
        AppError::Transport(msg.into())
    }

    /// Wire error code when the failure came from the backend.
    pub fn bridge_code(&self) -> Option<&str> {
        match self {
            AppError::Bridge { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }
}
