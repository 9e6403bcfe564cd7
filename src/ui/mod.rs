pub mod components;
pub mod screens;
pub mod styles;

use ratatui::{prelude::*, widgets::*};

use crate::app::session::{Gate, Session};
use crate::views::Route;
use components::utils::{split_vertical, truncate_left};
use screens::ListUi;
use styles::{label_span, secondary_line, secondary_span};

pub use components::{TerminalGuard, POLL_INTERVAL};

/// Keyboard modes the views do not track themselves.
#[derive(Debug, Default)]
pub struct UiState {
    pub editing_query: bool,
}

pub fn draw(f: &mut Frame, session: &Session, ui: &UiState) {
    let area = f.size();

    match session.gate() {
        Gate::Checking => {
            f.render_widget(
                Paragraph::new(secondary_line("Checking settings...")).alignment(Alignment::Center),
                area,
            );
        }
        Gate::Setup(setup) => screens::render_setup(f, area, setup),
        Gate::Ready { csv_path } => {
            let chunks = split_vertical(area, &[Constraint::Length(1), Constraint::Min(3)]);
            render_header(f, chunks[0], session, csv_path);
            let body = chunks[1];
            match session.route() {
                Route::List => screens::render_list(
                    f,
                    body,
                    session.list(),
                    &ListUi {
                        editing_query: ui.editing_query,
                    },
                ),
                Route::Student(_) => {
                    if let Some(detail) = session.detail() {
                        screens::render_detail(f, body, detail);
                    }
                }
                Route::Test => screens::render_test_page(f, body, csv_path, session.test_page()),
                Route::Error => screens::render_error_page(f, body),
            }
            if let Some(form) = session.add_form() {
                screens::render_add_student(f, body, form);
            }
        }
    }

    screens::render_notices(f, area, session.notices());
}

fn render_header(f: &mut Frame, area: Rect, session: &Session, csv_path: &str) {
    let hint = if session.is_busy() {
        "working..."
    } else {
        "R reset setup"
    };
    let title = session.route().title();
    let room = (area.width as usize)
        .saturating_sub(title.len() + "Selected file path: ".len() + hint.len() + 8)
        .max(8);
    let line = Line::from(vec![
        Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("    "),
        label_span("Selected file path: "),
        Span::raw(truncate_left(csv_path, room)),
        Span::raw("    "),
        secondary_span(hint),
    ]);
    f.render_widget(Paragraph::new(line), area);
}
