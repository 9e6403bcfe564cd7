pub mod table;
pub mod terminal;
pub mod utils;

pub use table::{build_table, fit_widths, highlight_row};
pub use terminal::{TerminalGuard, POLL_INTERVAL};
