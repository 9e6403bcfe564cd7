use std::fs::{self, File};
use std::sync::Arc;

use log::{info, LevelFilter};

use crate::api::StudentApi;
use crate::app::controller::AppController;
use crate::app::session::{Session, SessionSettings};
use crate::bridge::{Invoke, LocalBridge, ProcessBridge};
use crate::config::{load_config, AppConfig, BackendConfig};
use crate::error::{Context, Result};

const BACKEND_BIN: &str = "records-backend";

/// Entry point used by `main` to bootstrap the controller stack.
pub async fn run() -> Result<()> {
    let config = load_config()?;
    fs::create_dir_all(&config.data_dir).with_context(|| {
        format!("Failed to create data directory {}", config.data_dir.display())
    })?;
    init_logging(&config)?;
    info!("Starting with data directory {}", config.data_dir.display());

    let bridge = connect(&config)?;
    let session = Session::new(
        StudentApi::new(bridge),
        SessionSettings {
            page_size: config.page_size,
            notice_lifetime: config.notice_lifetime,
        },
    );
    let start_dir = std::env::current_dir().unwrap_or_else(|_| config.data_dir.clone());
    AppController::new(session, start_dir).run().await
}

/// Log to a file in the data directory; the terminal belongs to the UI.
fn init_logging(config: &AppConfig) -> Result<()> {
    let path = config.log_file();
    let file = File::create(&path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .map_err(|err| crate::error::AppError::message(err.to_string()))
}

fn connect(config: &AppConfig) -> Result<Arc<dyn Invoke>> {
    let log = config.backend_log_file();
    match &config.backend {
        BackendConfig::Local => Ok(Arc::new(LocalBridge::open(&config.data_dir)?)),
        BackendConfig::Process { program, args } => {
            info!("Spawning backend `{program}`");
            Ok(Arc::new(ProcessBridge::spawn(program, args, Some(log.as_path()))?))
        }
        BackendConfig::Auto => {
            let sibling = std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(|dir| dir.join(BACKEND_BIN)))
                .filter(|path| path.is_file());
            match sibling {
                Some(path) => {
                    info!("Spawning bundled backend {}", path.display());
                    Ok(Arc::new(ProcessBridge::spawn(&path, &[], Some(log.as_path()))?))
                }
                None => {
                    info!("No bundled backend found; running in-process");
                    Ok(Arc::new(LocalBridge::open(&config.data_dir)?))
                }
            }
        }
    }
}
