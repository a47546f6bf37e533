use engine::{TOKEN_LENGTH, TokenFeedback, check_token_length};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::{centered_box, framed};
use crate::ui::theme::Theme;

const HELP_TEXT: &str =
    "Create a personal access token under Account Settings > Developer Settings, then paste it here.";

pub fn render(frame: &mut Frame, area: Rect, theme: &Theme, input: &str, notice: Option<&str>) {
    let outer = centered_box(area, 72, 12);
    let inner = framed(frame, outer, theme, "API Token");

    let rows = Layout::vertical([
        Constraint::Length(2), // help text
        Constraint::Length(1),
        Constraint::Length(1), // input line
        Constraint::Length(1), // length feedback
        Constraint::Length(1),
        Constraint::Length(2), // notice
        Constraint::Length(1), // key hints
    ])
    .split(inner);

    let help = Paragraph::new(HELP_TEXT)
        .style(Style::default().fg(theme.dim))
        .wrap(ratatui::widgets::Wrap { trim: true });
    frame.render_widget(help, rows[0]);

    // Mask the token; only its length matters visually.
    let masked: String = input.chars().map(|_| '\u{2022}').collect();
    let input_line = Line::from(vec![
        Span::styled("Token: ", Style::default().fg(theme.text)),
        Span::styled(masked, Style::default().fg(theme.accent)),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]);
    frame.render_widget(Paragraph::new(input_line), rows[2]);

    let feedback = check_token_length(input);
    let feedback_line = match feedback {
        TokenFeedback::Valid => Line::from(Span::styled(
            format!("\u{2713} {TOKEN_LENGTH} characters"),
            Style::default().fg(theme.positive),
        )),
        TokenFeedback::Empty => Line::default(),
        other => match other.message() {
            Some(message) => Line::from(Span::styled(message, Style::default().fg(theme.warning))),
            None => Line::default(),
        },
    };
    frame.render_widget(Paragraph::new(feedback_line), rows[3]);

    if let Some(notice) = notice {
        let notice = Paragraph::new(notice.to_string())
            .style(Style::default().fg(theme.error))
            .wrap(ratatui::widgets::Wrap { trim: true });
        frame.render_widget(notice, rows[5]);
    }

    let hints = Paragraph::new("Enter submit \u{00b7} Ctrl+C quit")
        .style(Style::default().fg(theme.dim));
    frame.render_widget(hints, rows[6]);
}
