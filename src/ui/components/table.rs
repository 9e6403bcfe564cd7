use std::convert::TryFrom;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Row, Table},
};
use unicode_width::UnicodeWidthStr;

pub fn build_table<'a>(
    rows: Vec<Row<'a>>,
    header: Row<'a>,
    widths: Vec<Constraint>,
    title: impl Into<String>,
) -> Table<'a> {
    Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title.into()))
        .column_spacing(2)
}

pub fn highlight_row(row: Row<'_>) -> Row<'_> {
    row.reversed()
}

/// Fixed column widths wide enough for the header and every cell, plus padding.
pub fn fit_widths<S: AsRef<str>>(headers: &[S], rows: &[Vec<String>]) -> Vec<Constraint> {
    let mut widths: Vec<usize> = headers
        .iter()
        .map(|label| UnicodeWidthStr::width(label.as_ref()))
        .collect();
    for row in rows {
        for (idx, content) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(UnicodeWidthStr::width(content.as_str()));
            }
        }
    }
    widths
        .into_iter()
        .map(|w| u16::try_from(w + 2).unwrap_or(u16::MAX))
        .map(Constraint::Length)
        .collect()
}
