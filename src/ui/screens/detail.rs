use ratatui::{prelude::*, widgets::*};

use crate::records::format_mark;
use crate::ui::components::{build_table, highlight_row, utils::centered_rect, utils::split_vertical};
use crate::ui::styles::{
    accent_style, cursor_span, error_style, header_text, label_span, missing_task_style,
    secondary_line, GENERATE_LABEL,
};
use crate::views::{DetailState, DetailView, MarkDialog, MarkEditor};

pub fn render_detail(f: &mut Frame, area: Rect, view: &DetailView) {
    let chunks = split_vertical(
        area,
        &[
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ],
    );

    f.render_widget(Paragraph::new(header_text(view.title())), chunks[0]);

    match view.state() {
        DetailState::Loading => {
            f.render_widget(Paragraph::new(secondary_line("Loading...")), chunks[2]);
        }
        DetailState::NotFound => {
            let text = format!("No student found with ID {}.", view.student_id());
            f.render_widget(
                Paragraph::new(secondary_line(text)).alignment(Alignment::Center),
                chunks[2],
            );
        }
        DetailState::Loaded(_) => {
            render_summary(f, chunks[1], view);
            render_tasks(f, chunks[2], view);
        }
    }

    f.render_widget(
        Paragraph::new(secondary_line(
            "↑/↓ task • g generate • e edit mark • Esc back",
        )),
        chunks[3],
    );

    if let Some(dialog) = view.dialog() {
        render_dialog(f, area, dialog);
    }
    if let Some(editor) = view.editor() {
        render_editor(f, area, editor);
    }
}

fn render_summary(f: &mut Frame, area: Rect, view: &DetailView) {
    let Some(summary) = view.summary() else {
        return;
    };
    let mut spans = Vec::new();
    for (label, value) in summary {
        spans.push(label_span(format!("{label}: ")));
        spans.push(Span::raw(value));
        spans.push(Span::raw("    "));
    }
    let block = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(block, area);
}

fn render_tasks(f: &mut Frame, area: Rect, view: &DetailView) {
    let rows: Vec<Row> = view
        .task_cells()
        .into_iter()
        .map(|(task_id, mark)| {
            let cell = match mark {
                Some(mark) => Cell::from(mark),
                None => Cell::from(GENERATE_LABEL).style(missing_task_style()),
            };
            let row = Row::new(vec![Cell::from(task_id.to_string()), cell]);
            if task_id == view.selected_task() {
                highlight_row(row)
            } else {
                row
            }
        })
        .collect();
    let header = Row::new(vec![
        Cell::from("#").style(accent_style()),
        Cell::from("Task").style(accent_style()),
    ]);
    let table = build_table(
        rows,
        header,
        vec![Constraint::Length(4), Constraint::Min(12)],
        "Tasks",
    );
    f.render_widget(table, area);
}

fn render_dialog(f: &mut Frame, area: Rect, dialog: &MarkDialog) {
    let popup = centered_rect(50, 30, area);
    f.render_widget(Clear, popup);
    let lines = match dialog {
        MarkDialog::Generating { .. } => vec![
            secondary_line("Working..."),
            Line::default(),
            secondary_line("Esc cancel"),
        ],
        MarkDialog::Proposed { mark, .. } => vec![
            Line::from("Marks generated successfully!"),
            Line::from(format!("New Mark: {}", format_mark(*mark))),
            Line::default(),
            secondary_line("Enter confirm • Esc cancel"),
        ],
        MarkDialog::Saving { mark, .. } => vec![
            Line::from(format!("New Mark: {}", format_mark(*mark))),
            Line::default(),
            secondary_line("Saving..."),
        ],
    };
    let title = format!("{} (Task {})", dialog.title(), dialog.task_id());
    let body = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(body, popup);
}

fn render_editor(f: &mut Frame, area: Rect, editor: &MarkEditor) {
    let popup = centered_rect(40, 25, area);
    f.render_widget(Clear, popup);
    let mut lines = vec![Line::from(vec![
        Span::raw(editor.input.clone()),
        cursor_span(accent_style()),
    ])];
    if let Some(error) = &editor.error {
        lines.push(Line::from(Span::styled(error.clone(), error_style())));
    }
    lines.push(secondary_line("Enter save • Esc cancel"));
    let body = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Mark for Task {}", editor.task_id)),
    );
    f.render_widget(body, popup);
}
