use ratatui::{prelude::*, widgets::*};

use crate::ui::components::utils::{centered_rect, split_vertical};
use crate::ui::styles::{cursor_span, error_style, header_text, secondary_line, selection_style};
use crate::utils::format_file_modified;
use crate::views::{FilePicker, SetupState};

pub fn render_setup(f: &mut Frame, area: Rect, setup: &SetupState) {
    let chunks = split_vertical(
        area,
        &[
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ],
    );

    f.render_widget(Paragraph::new(header_text("Setup")), chunks[0]);
    f.render_widget(
        Paragraph::new(secondary_line(
            "Choose the CSV file that holds the student records.",
        )),
        chunks[1],
    );

    let input = Paragraph::new(Line::from(vec![
        Span::raw(setup.input().to_string()),
        cursor_span(selection_style()),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Path to CSV file"),
    );
    f.render_widget(input, chunks[2]);

    f.render_widget(
        Paragraph::new(secondary_line(
            "Enter continue • Tab select file • Ctrl+C exit",
        )),
        chunks[4],
    );

    if let Some(picker) = setup.picker() {
        render_picker(f, area, picker);
    }
    if let Some(alert) = setup.alert() {
        render_alert(f, area, alert);
    }
}

fn render_picker(f: &mut Frame, area: Rect, picker: &FilePicker) {
    let popup = centered_rect(80, 70, area);
    f.render_widget(Clear, popup);

    let title = format!(
        "{} • ↑/↓/j/k move, Enter select, Esc cancel",
        picker.dir().display()
    );
    if picker.entries().is_empty() {
        let empty = Paragraph::new(secondary_line("No CSV files in this folder."))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(empty, popup);
        return;
    }

    let items: Vec<ListItem> = picker
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let text = format!(
                "{}  •  {}  •  {:.1} KB",
                entry.name,
                format_file_modified(entry.modified),
                entry.size_kb()
            );
            let item = ListItem::new(Line::from(text));
            if i == picker.selected() {
                item.style(selection_style())
            } else {
                item
            }
        })
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, popup);
}

/// Blocking message box; the caller ignores other input until it is dismissed.
pub fn render_alert(f: &mut Frame, area: Rect, message: &str) {
    let popup = centered_rect(60, 30, area);
    f.render_widget(Clear, popup);
    let text = vec![
        Line::from(Span::styled(message.to_string(), error_style())),
        Line::default(),
        secondary_line("Press Enter to dismiss"),
    ];
    let alert = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Error"));
    f.render_widget(alert, popup);
}
