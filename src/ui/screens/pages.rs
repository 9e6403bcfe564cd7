use ratatui::{prelude::*, widgets::*};

use crate::ui::styles::{header_text, label_span, secondary_line};
use crate::views::TestPage;

pub fn render_error_page(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::default(),
        Line::from("Page not found."),
        Line::default(),
        secondary_line("Enter go back"),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Error")),
        area,
    );
}

pub fn render_test_page(f: &mut Frame, area: Rect, csv_path: &str, page: Option<&TestPage>) {
    let mut text = header_text("Test Page");
    text.extend([
        Line::default(),
        Line::from(format!("File: {csv_path}")),
    ]);

    let store = page
        .and_then(TestPage::store_path)
        .map_or_else(|| "loading...".to_string(), str::to_string);
    text.extend([Line::from(format!("Preference store: {store}")), Line::default()]);

    match page.and_then(TestPage::incomplete_lines) {
        None => text.extend([secondary_line("Checking for missing tasks...")]),
        Some(lines) if lines.is_empty() => {
            text.extend([Line::from("Every student has all tasks graded.")])
        }
        Some(lines) => {
            text.extend([Line::from(label_span("Students with missing tasks:"))]);
            text.extend(lines.into_iter().map(|line| Line::from(format!("  {line}"))));
        }
    }

    text.extend([
        Line::default(),
        secondary_line("Enter navigate to / • Esc back"),
    ]);
    f.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL)),
        area,
    );
}
