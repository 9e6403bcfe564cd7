use ratatui::{prelude::*, widgets::*};

use crate::ui::styles::{notice_border, secondary_line};
use crate::views::Notices;

const NOTICE_WIDTH: u16 = 48;
const NOTICE_HEIGHT: u16 = 4;

/// Stack notices upward from the bottom-left corner, newest at the bottom.
pub fn render_notices(f: &mut Frame, area: Rect, notices: &Notices) {
    let newest = notices.len().saturating_sub(1);
    let width = NOTICE_WIDTH.min(area.width);
    let mut bottom = area.y + area.height;

    for (idx, notice) in notices.iter().enumerate().rev() {
        if bottom < area.y + NOTICE_HEIGHT {
            break;
        }
        bottom -= NOTICE_HEIGHT;
        let rect = Rect::new(area.x, bottom, width, NOTICE_HEIGHT);

        let mut lines = Vec::new();
        if let Some(description) = &notice.description {
            lines.push(Line::from(description.clone()));
        }
        if let (Some(action), true) = (notice.action, idx == newest) {
            lines.push(secondary_line(format!("n {} • x dismiss", action.label())));
        }

        f.render_widget(Clear, rect);
        f.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: true }).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(notice_border(notice.kind))
                    .title(notice.title.clone()),
            ),
            rect,
        );
    }
}
