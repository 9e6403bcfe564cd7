use thiserror::Error;

use crate::records::TASK_COUNT;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no data file configured; complete setup first")]
    NoDataFile,
    #[error("student {0} not found")]
    StudentNotFound(i64),
    #[error("task id {0} is out of range (1-{max})", max = TASK_COUNT)]
    InvalidTask(usize),
    #[error("invalid parameters: {0}")]
    BadParams(String),
    #[error("unknown method: {0}")]
    UnknownMethod(String),
    #[error("cannot generate mark: {0}")]
    Generation(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl BackendError {
    pub fn generation<T: Into<String>>(msg: T) -> Self {
        BackendError::Generation(msg.into())
    }

    /// Error code carried in the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            BackendError::NoDataFile => "no_data_file",
            BackendError::StudentNotFound(_) => "not_found",
            BackendError::InvalidTask(_) | BackendError::BadParams(_) => "bad_params",
            BackendError::UnknownMethod(_) => "not_implemented",
            BackendError::Generation(_) => "generation_failed",
            BackendError::Io(_) | BackendError::Csv(_) | BackendError::Json(_) => "io",
        }
    }
}
