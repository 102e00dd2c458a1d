//! Startup screen shown until the catalog arrives

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::LoadState;
use crate::theme::Theme;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Spinner frame for a UI tick
pub fn spinner(tick: usize) -> &'static str {
    SPINNER[(tick / 4) % SPINNER.len()]
}

/// Status message for a load state
pub fn message(state: &LoadState) -> String {
    match state {
        LoadState::Connecting => "Connecting...".to_string(),
        LoadState::Syncing | LoadState::Ready => "Loading problems...".to_string(),
        LoadState::Failed(reason) => format!("Could not load problems: {reason}"),
    }
}

pub fn draw(frame: &mut Frame, area: Rect, state: &LoadState, tick: usize, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .style(Style::default().bg(theme.bg_primary));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [_, body, _] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(4), Constraint::Fill(1)])
            .areas(inner);

    let lines = match state {
        LoadState::Failed(_) => vec![
            Line::from(Span::styled(
                message(state),
                Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from(Span::styled(
                "Check the log file for details, :q to quit",
                Style::default().fg(theme.fg_muted),
            )),
        ],
        _ => vec![Line::from(vec![
            Span::styled(spinner(tick), Style::default().fg(theme.accent_primary)),
            Span::raw(" "),
            Span::styled(message(state), Style::default().fg(theme.fg_secondary)),
        ])],
    };

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, body);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_cycles() {
        assert_eq!(spinner(0), "⠋");
        assert_eq!(spinner(4), "⠙");
        assert_eq!(spinner(40), spinner(0));
    }

    #[test]
    fn messages_follow_state() {
        assert_eq!(message(&LoadState::Connecting), "Connecting...");
        assert_eq!(message(&LoadState::Syncing), "Loading problems...");
        assert_eq!(
            message(&LoadState::Failed("store offline".into())),
            "Could not load problems: store offline"
        );
    }
}
