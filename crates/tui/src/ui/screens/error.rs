use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Paragraph, Wrap};

use super::{centered_box, framed};
use crate::ui::theme::Theme;

pub fn render(frame: &mut Frame, area: Rect, theme: &Theme, message: &str) {
    let outer = centered_box(area, 64, 9);
    let inner = framed(frame, outer, theme, "Error");

    let rows = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(inner);

    let body = Paragraph::new(message.to_string())
        .style(Style::default().fg(theme.error))
        .wrap(Wrap { trim: true });
    frame.render_widget(body, rows[0]);

    let hints = Paragraph::new("r retry \u{00b7} Enter/q quit").style(Style::default().fg(theme.dim));
    frame.render_widget(hints, rows[1]);
}
