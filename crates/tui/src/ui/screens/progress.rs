use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Paragraph;

use super::{centered_box, framed};
use crate::ui::theme::Theme;

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

pub fn render(frame: &mut Frame, area: Rect, theme: &Theme, label: &str, tick: usize) {
    let outer = centered_box(area, 48, 5);
    let inner = framed(frame, outer, theme, "Working");

    let glyph = SPINNER[tick % SPINNER.len()];
    let body = Paragraph::new(format!("{glyph} {label}")).style(Style::default().fg(theme.text));
    frame.render_widget(body, inner);
}
