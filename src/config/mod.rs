use std::path::PathBuf;
use std::time::Duration;

pub mod loader;
pub mod validator;

pub use loader::{load_config, load_config_with, CONFIG_ENV, DATA_DIR_ENV, BACKEND_ENV};

pub const APP_DIR_NAME: &str = "student-records";
pub const DEFAULT_NOTICE_SECONDS: u64 = 6;

/// How the front-end reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// The bundled `records-backend` next to this executable if present, else in-process.
    Auto,
    Local,
    Process { program: String, args: Vec<String> },
}

impl BackendConfig {
    /// Parse `local`, `auto`, or a whitespace-separated command line.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        match value {
            "" => None,
            "local" => Some(BackendConfig::Local),
            "auto" => Some(BackendConfig::Auto),
            command => {
                let mut parts = command.split_whitespace().map(str::to_string);
                let program = parts.next()?;
                Some(BackendConfig::Process {
                    program,
                    args: parts.collect(),
                })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub data_dir: PathBuf,
    pub page_size: usize,
    pub notice_lifetime: Duration,
}

impl AppConfig {
    pub fn builtin() -> Self {
        Self {
            backend: BackendConfig::Auto,
            data_dir: default_data_dir(),
            page_size: crate::table::DEFAULT_PAGE_SIZE,
            notice_lifetime: Duration::from_secs(DEFAULT_NOTICE_SECONDS),
        }
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("student-records.log")
    }

    pub fn backend_log_file(&self) -> PathBuf {
        self.data_dir.join("records-backend.log")
    }
}

/// Platform data directory plus the application folder; the working directory as a last resort.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}
