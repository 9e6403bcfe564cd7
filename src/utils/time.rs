use chrono::{DateTime, Local};
use std::time::SystemTime;

/// Local `YYYY-MM-DD HH:MM` for file listings.
pub fn format_file_modified(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}
