use ratatui::{prelude::*, widgets::*};

use crate::ui::components::utils::centered_rect;
use crate::ui::styles::{cursor_span, error_style, secondary_line, selection_style};
use crate::views::AddStudentView;

pub fn render_add_student(f: &mut Frame, area: Rect, form: &AddStudentView) {
    let popup = centered_rect(60, 70, area);
    f.render_widget(Clear, popup);

    let mut lines = Vec::new();
    for field in 0..form.field_count() {
        let focused = field == form.focus();
        let label = format!("{:<8}", form.label(field));
        let mut spans = vec![
            if focused {
                Span::styled(label, selection_style())
            } else {
                Span::raw(label)
            },
            Span::raw(form.value(field).to_string()),
        ];
        if focused {
            spans.push(cursor_span(selection_style()));
        }
        lines.push(Line::from(spans));
        if let Some(error) = form.error(field) {
            lines.push(Line::from(Span::styled(format!("        {error}"), error_style())));
        }
    }
    lines.push(Line::default());
    lines.push(secondary_line(if form.is_submitting() {
        "Saving..."
    } else {
        "Tab/↓ next • Shift+Tab/↑ previous • Enter save • Esc close"
    }));

    let body = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Add Student"),
    );
    f.render_widget(body, popup);
}
