use crate::error::{AppError, Result};

use super::{AppConfig, BackendConfig};

/// Validate a loaded configuration and surface every problem at once.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let mut issues = Vec::new();

    if config.page_size == 0 {
        issues.push("page_size must be greater than zero".to_string());
    }
    if config.notice_lifetime.is_zero() {
        issues.push("notice_seconds must be greater than zero".to_string());
    }
    if let BackendConfig::Process { program, .. } = &config.backend {
        if program.trim().is_empty() {
            issues.push("backend command must not be empty".to_string());
        }
    }
    if config.data_dir.as_os_str().is_empty() {
        issues.push("data_dir must not be empty".to_string());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::message(format!(
            "configuration invalid:\n  - {}",
            issues.join("\n  - ")
        )))
    }
}
