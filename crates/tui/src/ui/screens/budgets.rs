use api_types::budget::BudgetSummary;
use engine::ListEntry;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};

use super::{centered_box, framed};
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
    budgets: &[BudgetSummary],
    selected: usize,
    filter: &str,
) {
    let height = (budgets.len() as u16 + 7).clamp(9, area.height);
    let outer = centered_box(area, 76, height);
    let inner = framed(frame, outer, theme, "Select a Budget");

    let rows = Layout::vertical([
        Constraint::Fill(1),   // list
        Constraint::Length(1), // filter line
        Constraint::Length(1), // key hints
    ])
    .split(inner);

    if budgets.is_empty() {
        let empty = Paragraph::new("No budgets found for this account.")
            .style(Style::default().fg(theme.dim));
        frame.render_widget(empty, rows[0]);
    } else {
        let items: Vec<ListItem> = budgets
            .iter()
            .map(|budget| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        budget.display_title(),
                        Style::default().fg(theme.text),
                    )),
                    Line::from(Span::styled(
                        format!("  {}", budget.display_subtitle()),
                        Style::default().fg(theme.dim),
                    )),
                ])
            })
            .collect();
        let list = List::new(items).highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        );
        let mut state = ListState::default();
        state.select(Some(selected));
        frame.render_stateful_widget(list, rows[0], &mut state);
    }

    if !filter.is_empty() {
        let filter_line = Paragraph::new(format!("/{filter}"))
            .style(Style::default().fg(theme.accent));
        frame.render_widget(filter_line, rows[1]);
    }

    let hints = Paragraph::new(
        "\u{2191}/\u{2193} move \u{00b7} Enter export \u{00b7} type to jump \u{00b7} Esc back \u{00b7} Ctrl+C quit",
    )
    .style(Style::default().fg(theme.dim));
    frame.render_widget(hints, rows[2]);
}
