use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::Deserialize;

use super::{validator, AppConfig, BackendConfig};
use crate::error::{AppError, Context, Result};

pub const CONFIG_ENV: &str = "STUDENT_RECORDS_CONFIG";
pub const BACKEND_ENV: &str = "STUDENT_RECORDS_BACKEND";
pub const DATA_DIR_ENV: &str = "STUDENT_RECORDS_DATA_DIR";

const CONFIG_FILE: &str = "config.json";

/// Load configuration from the process environment.
pub fn load_config() -> Result<AppConfig> {
    load_config_with(|key| std::env::var(key).ok())
}

/// Built-in defaults, then the JSON file, then environment overrides.
pub fn load_config_with<F>(env: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = AppConfig::builtin();

    if let Some(dir) = non_empty(env(DATA_DIR_ENV)) {
        config.data_dir = PathBuf::from(dir);
    }

    let explicit = non_empty(env(CONFIG_ENV)).map(PathBuf::from);
    let path = explicit
        .clone()
        .unwrap_or_else(|| config.data_dir.join(CONFIG_FILE));

    if path.exists() {
        let raw = read_raw_config(&path)?;
        raw.apply(&mut config)?;
        debug!("Loaded configuration from {}", path.display());
    } else if explicit.is_some() {
        return Err(AppError::message(format!(
            "config file not found: {}",
            path.display()
        )));
    }

    // The environment wins over the file.
    if let Some(dir) = non_empty(env(DATA_DIR_ENV)) {
        config.data_dir = PathBuf::from(dir);
    }
    if let Some(value) = env(BACKEND_ENV) {
        config.backend = BackendConfig::parse(&value).ok_or_else(|| {
            AppError::message(format!("{BACKEND_ENV} must not be empty"))
        })?;
    }

    validator::validate_config(&config)?;
    Ok(config)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn read_raw_config(path: &Path) -> Result<RawAppConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config JSON at {}", path.display()))?;
    let raw = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse config JSON at {}", path.display()))?;
    Ok(raw)
}

#[derive(Debug, Default, Deserialize)]
struct RawAppConfig {
    #[serde(default)]
    backend: Option<RawBackend>,
    #[serde(default)]
    data_dir: Option<PathBuf>,
    #[serde(default)]
    page_size: Option<usize>,
    #[serde(default)]
    notice_seconds: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBackend {
    Name(String),
    Command {
        command: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl RawBackend {
    fn into_backend(self) -> Result<BackendConfig> {
        match self {
            RawBackend::Name(value) => BackendConfig::parse(&value)
                .ok_or_else(|| AppError::message("backend must not be an empty string")),
            RawBackend::Command { command, args } => Ok(BackendConfig::Process {
                program: command,
                args,
            }),
        }
    }
}

impl RawAppConfig {
    fn apply(self, config: &mut AppConfig) -> Result<()> {
        if let Some(backend) = self.backend {
            config.backend = backend.into_backend()?;
        }
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(size) = self.page_size {
            config.page_size = size;
        }
        if let Some(seconds) = self.notice_seconds {
            config.notice_lifetime = Duration::from_secs(seconds);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, String)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_with(env_from(&[(
            DATA_DIR_ENV,
            dir.path().to_string_lossy().to_string(),
        )]))
        .unwrap();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.notice_lifetime, Duration::from_secs(6));
        assert_eq!(config.backend, BackendConfig::Auto);
        assert_eq!(config.data_dir, dir.path());
    }

    #[test]
    fn file_then_environment() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.json"),
            r#"{"backend": {"command": "records-backend", "args": ["--quiet"]}, "page_size": 5, "notice_seconds": 2}"#,
        )
        .unwrap();
        let data_dir = dir.path().to_string_lossy().to_string();

        let config = load_config_with(env_from(&[(DATA_DIR_ENV, data_dir.clone())])).unwrap();
        assert_eq!(config.page_size, 5);
        assert_eq!(
            config.backend,
            BackendConfig::Process {
                program: "records-backend".into(),
                args: vec!["--quiet".into()],
            }
        );

        let config = load_config_with(env_from(&[
            (DATA_DIR_ENV, data_dir),
            (BACKEND_ENV, "local".to_string()),
        ]))
        .unwrap();
        assert_eq!(config.backend, BackendConfig::Local);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        fs::write(&path, r#"{"page_size": 0}"#).unwrap();
        let err = load_config_with(env_from(&[(CONFIG_ENV, path.to_string_lossy().to_string())]))
            .unwrap_err();
        assert!(err.to_string().contains("page_size"));

        let missing = dir.path().join("missing.json");
        assert!(load_config_with(env_from(&[(CONFIG_ENV, missing.to_string_lossy().to_string())])).is_err());
    }
}
