//! JSON-lines backend: reads one request per stdin line, answers on stdout.
//! Logs go to stderr.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use log::{error, info, LevelFilter};
use student_records::backend::{serve, Backend};
use student_records::config::load_config;

#[derive(Parser)]
#[command(name = "records-backend")]
#[command(about = "Student records backend speaking JSON lines on stdin/stdout")]
struct Args {
    /// Data directory holding the preference store; overrides the configuration
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(err) = run(args) {
        error!("{err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> student_records::Result<()> {
    let mut config = load_config()?;
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    let backend = Backend::open(&config.data_dir)
        .map_err(|err| student_records::AppError::message(err.to_string()))?;
    info!("Serving with data directory {}", config.data_dir.display());

    let stdin = io::stdin();
    serve(&backend, stdin.lock(), io::stdout())?;
    info!("Input closed; shutting down");
    Ok(())
}
