//! Status badge: a pure lookup from status to style and icon

use ratatui::{
    style::{Modifier, Style},
    text::Span,
};

use crate::progress::Status;
use crate::theme::Theme;

const ICON_TODO: &str = "○";
const ICON_ATTEMPTING: &str = "◔";
const ICON_SOLVED: &str = "✓";

/// Style and icon for a status; an absent status renders as To-Do
pub fn badge(status: Option<Status>, theme: &Theme) -> (Style, &'static str) {
    let status = status.unwrap_or_default();
    let icon = match status {
        Status::ToDo => ICON_TODO,
        Status::Attempting => ICON_ATTEMPTING,
        Status::Solved => ICON_SOLVED,
    };
    let mut style = Style::default().fg(theme.status_color(status));
    if status == Status::Solved {
        style = style.add_modifier(Modifier::BOLD);
    }
    (style, icon)
}

/// "✓ Solved" as a styled span
pub fn span(status: Status, theme: &Theme) -> Span<'static> {
    let (style, icon) = badge(Some(status), theme);
    Span::styled(format!("{icon} {}", status.label()), style)
}
