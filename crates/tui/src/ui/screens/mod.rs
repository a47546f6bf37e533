pub mod budgets;
pub mod done;
pub mod error;
pub mod progress;
pub mod token;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};

use super::theme::Theme;

/// Centers a fixed-size box inside `area`, clamped to fit.
pub fn centered_box(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .split(area);
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width),
        Constraint::Fill(1),
    ])
    .split(vertical[1]);
    horizontal[1]
}

pub fn titled_block(theme: &Theme, title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(format!(" {title} "))
}

/// Draws a bordered box and returns the inner area to render into.
pub fn framed(frame: &mut Frame, area: Rect, theme: &Theme, title: &str) -> Rect {
    let block = titled_block(theme, title);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}
