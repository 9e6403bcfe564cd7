use ratatui::{prelude::*, widgets::*};

use crate::records::Student;
use crate::table::{SortDirection, TableState};
use crate::ui::components::{build_table, fit_widths, highlight_row, utils::split_vertical};
use crate::ui::styles::{accent_style, cursor_span, label_span, secondary_line, secondary_span};
use crate::views::{FilterField, ListView, LoadState};

pub struct ListUi {
    /// The query line takes typed characters.
    pub editing_query: bool,
}

pub fn render_list(f: &mut Frame, area: Rect, view: &ListView, ui: &ListUi) {
    let chunks = split_vertical(
        area,
        &[
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ],
    );

    render_filter_bar(f, chunks[0], view, ui);

    match view.state() {
        LoadState::Loading => {
            let loading = Paragraph::new(secondary_line("Loading students..."))
                .block(Block::default().borders(Borders::ALL).title("Students"));
            f.render_widget(loading, chunks[1]);
        }
        LoadState::Empty => {
            let empty = Paragraph::new(secondary_line("No students found."))
                .block(Block::default().borders(Borders::ALL).title("Students"));
            f.render_widget(empty, chunks[1]);
        }
        LoadState::Loaded => render_table(f, chunks[1], view.table()),
    }

    let table = view.table();
    let footer = format!(
        "Page {}/{} • {} shown • ↑/↓ move • ←/→ page • Enter open • / search • f field • s sort • d flip • a add • r reload • n show • t test • R reset • q quit",
        table.page() + 1,
        table.page_count(),
        table.visible_rows().len(),
    );
    f.render_widget(
        Paragraph::new(secondary_line(footer)).wrap(Wrap { trim: true }),
        chunks[2],
    );
}

fn render_filter_bar(f: &mut Frame, area: Rect, view: &ListView, ui: &ListUi) {
    let query = match view.filter_field() {
        FilterField::HasEmptyTasks => match view.query() {
            "true" => "Yes (Has empty tasks)".to_string(),
            "false" => "No (All tasks complete)".to_string(),
            "any" => "Any".to_string(),
            other => other.to_string(),
        },
        _ => view.query().to_string(),
    };
    let mut spans = vec![
        label_span("Filter by "),
        Span::styled(view.filter_field().label(), accent_style()),
        Span::raw("  "),
        Span::raw(query),
    ];
    if ui.editing_query {
        spans.push(cursor_span(accent_style()));
    } else if view.query().is_empty() {
        spans.push(secondary_span("press / to search"));
    }
    let bar = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title("Search"));
    f.render_widget(bar, area);
}

fn render_table(f: &mut Frame, area: Rect, table: &TableState<Student>) {
    let sort = table.sort();
    let headers: Vec<String> = table
        .columns()
        .iter()
        .map(|column| match sort {
            Some(sort) if sort.column == column.id => {
                format!("{} {}", sort.direction.icon(), column.header)
            }
            _ => column.header.to_string(),
        })
        .collect();

    let page = table.page_rows();
    let contents: Vec<Vec<String>> = page
        .iter()
        .map(|student| {
            table
                .columns()
                .iter()
                .map(|column| column.value(student).to_string())
                .collect()
        })
        .collect();

    let widths = fit_widths(&headers, &contents);
    let header = Row::new(headers.iter().map(|label| {
        let mut style = accent_style();
        if sort.is_some_and(|s| label.starts_with(s.direction.icon())) {
            style = style.add_modifier(Modifier::BOLD);
        }
        Cell::from(label.clone()).style(style)
    }));

    let rows = contents
        .into_iter()
        .enumerate()
        .map(|(i, cells)| {
            let row = Row::new(cells.into_iter().map(Cell::from));
            if i == table.selected() {
                highlight_row(row)
            } else {
                row
            }
        })
        .collect();

    let title = match sort {
        Some(sort) => format!(
            "Students ({} rows, sorted {})",
            table.visible_rows().len(),
            if sort.direction == SortDirection::Ascending { "ascending" } else { "descending" }
        ),
        None => format!("Students ({} rows)", table.visible_rows().len()),
    };
    f.render_widget(build_table(rows, header, widths, title), area);
}
