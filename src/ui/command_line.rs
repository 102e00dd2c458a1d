//! Command line at the bottom of the screen

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::Controller;
use crate::app::state::{CommandLineState, CommandMode};
use crate::theme::Theme;

const HINT: &str = "Press : for commands, ? for help";

/// Draw the command line, with background activity on the right
pub fn draw(
    frame: &mut Frame,
    area: Rect,
    state: &CommandLineState,
    controller: &Controller,
    theme: &Theme,
) {
    let (text, style) = match state.mode {
        CommandMode::Normal => match state.message {
            Some(ref msg) if state.is_error => (msg.clone(), Style::default().fg(theme.error)),
            Some(ref msg) => (msg.clone(), Style::default().fg(theme.fg_secondary)),
            None => (HINT.to_string(), Style::default().fg(theme.fg_muted)),
        },
        CommandMode::Command => {
            (format!(":{}", state.input), Style::default().fg(theme.accent_primary))
        }
    };

    let mut line = if state.is_input_mode() {
        build_line_with_cursor(&text, state.cursor + 1, style, theme) // +1 for ':'
    } else {
        Line::from(Span::styled(text, style))
    };

    if let Some(activity) = activity(controller.pending_writes(), controller.assistance_pending())
    {
        let pad = (area.width as usize).saturating_sub(line.width() + activity.len() + 1);
        line.spans.push(Span::raw(" ".repeat(pad)));
        line.spans.push(Span::styled(activity, Style::default().fg(theme.warning)));
    }

    frame.render_widget(Paragraph::new(line), area);
}

/// Right-hand activity text, if anything is in flight
fn activity(pending_writes: usize, assistance: Option<&str>) -> Option<String> {
    match (pending_writes, assistance) {
        (0, None) => None,
        (0, Some(_)) => Some("asking AI...".to_string()),
        (n, None) => Some(format!("saving {n}...")),
        (n, Some(_)) => Some(format!("saving {n}... asking AI...")),
    }
}

/// Build a line with a visible cursor
fn build_line_with_cursor(
    text: &str,
    cursor_pos: usize,
    base_style: Style,
    theme: &Theme,
) -> Line<'static> {
    let chars: Vec<char> = text.chars().collect();
    let mut spans = Vec::new();

    // Text before cursor
    if cursor_pos > 0 {
        let before: String = chars.iter().take(cursor_pos).collect();
        spans.push(Span::styled(before, base_style));
    }

    // Cursor character (or space if at end)
    let cursor_char = chars.get(cursor_pos).copied().unwrap_or(' ');
    let cursor_style =
        Style::default().fg(theme.bg_primary).bg(theme.fg_primary).add_modifier(Modifier::BOLD);
    spans.push(Span::styled(cursor_char.to_string(), cursor_style));

    // Text after cursor
    if cursor_pos + 1 < chars.len() {
        let after: String = chars.iter().skip(cursor_pos + 1).collect();
        spans.push(Span::styled(after, base_style));
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_reflects_in_flight_work() {
        assert_eq!(activity(0, None), None);
        assert_eq!(activity(2, None).as_deref(), Some("saving 2..."));
        assert_eq!(activity(0, Some("Hint")).as_deref(), Some("asking AI..."));
        assert_eq!(activity(1, Some("Hint")).as_deref(), Some("saving 1... asking AI..."));
    }

    #[test]
    fn build_cursor_at_start() {
        let theme = Theme::default();
        let line = build_line_with_cursor(":test", 0, Style::default(), &theme);
        assert_eq!(line.spans.len(), 2); // cursor + rest
    }

    #[test]
    fn build_cursor_at_end() {
        let theme = Theme::default();
        let line = build_line_with_cursor(":test", 5, Style::default(), &theme);
        assert_eq!(line.spans.len(), 2); // before + cursor (space)
    }

    #[test]
    fn build_cursor_in_middle() {
        let theme = Theme::default();
        let line = build_line_with_cursor(":test", 2, Style::default(), &theme);
        assert_eq!(line.spans.len(), 3); // before + cursor + after
    }
}
