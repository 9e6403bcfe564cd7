pub mod api;
pub mod app;
pub mod backend;
pub mod bridge;
pub mod config;
pub mod error;
pub mod records;
pub mod table;
pub mod ui;
pub mod utils;
pub mod views;

pub use error::{AppError, Result};
