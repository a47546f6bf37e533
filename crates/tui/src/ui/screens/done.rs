use engine::{ExportOutcome, human_size};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::{centered_box, framed};
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
    outcome: &ExportOutcome,
    inspection: Option<&[(String, String)]>,
) {
    let inspection_rows = inspection.map_or(0, |fields| fields.len() as u16 + 2);
    let height = (13 + inspection_rows).min(area.height);
    let outer = centered_box(area, 76, height);
    let inner = framed(frame, outer, theme, "Export Complete");

    let rows = Layout::vertical([
        Constraint::Length(1), // path
        Constraint::Length(1),
        Constraint::Length(8), // summary
        Constraint::Fill(1),   // inspection
        Constraint::Length(1), // key hints
    ])
    .split(inner);

    let path = Paragraph::new(Line::from(vec![
        Span::styled("Saved to ", Style::default().fg(theme.dim)),
        Span::styled(
            outcome.path.display().to_string(),
            Style::default().fg(theme.positive).add_modifier(Modifier::BOLD),
        ),
    ]));
    frame.render_widget(path, rows[0]);

    let summary = &outcome.summary;
    let label = Style::default().fg(theme.dim);
    let value = Style::default().fg(theme.text);
    let lines = vec![
        row("Budget", summary.name.clone(), label, value),
        row("Currency", summary.currency.clone(), label, value),
        row("Date Range", summary.date_range(), label, value),
        row(
            "Accounts",
            format!(
                "{} (+{} closed)",
                summary.account_count, summary.closed_account_count
            ),
            label,
            value,
        ),
        row(
            "Categories",
            format!(
                "{} (+{} hidden, +{} deleted)",
                summary.category_count,
                summary.hidden_category_count,
                summary.deleted_category_count
            ),
            label,
            value,
        ),
        row("Payees", summary.payee_count.to_string(), label, value),
        row(
            "Transactions",
            summary.transaction_count.to_string(),
            label,
            value,
        ),
        row(
            "File Size",
            human_size(summary.file_size_bytes),
            label,
            value,
        ),
    ];
    frame.render_widget(Paragraph::new(lines), rows[2]);

    if let Some(fields) = inspection {
        let mut lines = vec![Line::from(Span::styled(
            "Document fields:",
            Style::default().fg(theme.dim),
        ))];
        lines.extend(fields.iter().map(|(name, shape)| {
            Line::from(vec![
                Span::styled(format!("  {name}: "), Style::default().fg(theme.accent)),
                Span::styled(shape.clone(), Style::default().fg(theme.text)),
            ])
        }));
        frame.render_widget(Paragraph::new(lines), rows[3]);
    }

    let hints =
        Paragraph::new("Enter/q quit").style(Style::default().fg(theme.dim));
    frame.render_widget(hints, rows[4]);
}

fn row(name: &str, text: String, label: Style, value: Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{name:>13}: "), label),
        Span::styled(text, value),
    ])
}
