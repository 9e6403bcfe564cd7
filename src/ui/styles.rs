use std::borrow::Cow;

use ratatui::prelude::Stylize;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

use crate::views::NoticeKind;

/// Accent color for column headers, prompts and info notices.
pub const ACCENT: Color = Color::Indexed(208);
pub const ERROR: Color = Color::Red;

/// Label on a task that has no mark yet.
pub const GENERATE_LABEL: &str = "[ Generate ]";

const CURSOR: &str = "▏";

/// Bold accent title shown at the top of each page.
pub fn header_text<'a>(text: impl Into<Cow<'a, str>>) -> Text<'a> {
    let owned = text.into().into_owned();
    Text::from(owned.bold().fg(ACCENT))
}

pub fn secondary_line<'a>(text: impl Into<Cow<'a, str>>) -> Line<'a> {
    let owned = text.into().into_owned();
    Line::from(owned.dim())
}

pub fn secondary_span<'a>(text: impl Into<Cow<'a, str>>) -> Span<'a> {
    let owned = text.into().into_owned();
    Span::from(owned).dim()
}

pub fn label_span<'a>(text: impl Into<Cow<'a, str>>) -> Span<'a> {
    let owned = text.into().into_owned();
    Span::from(owned).bold()
}

pub fn accent_style() -> Style {
    Style::default().fg(ACCENT)
}

/// Focused field or option in the setup and add-student forms.
pub fn selection_style() -> Style {
    accent_style().add_modifier(Modifier::BOLD)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

/// A task cell without a mark stands out so it reads as actionable.
pub fn missing_task_style() -> Style {
    error_style().add_modifier(Modifier::BOLD)
}

pub fn notice_border(kind: NoticeKind) -> Style {
    match kind {
        NoticeKind::Info => accent_style(),
        NoticeKind::Error => error_style(),
    }
}

/// Text cursor drawn after an input that has focus.
pub fn cursor_span(style: Style) -> Span<'static> {
    Span::styled(CURSOR, style)
}
