//! Question list for one topic

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::status_badge;
use crate::app::Controller;
use crate::app::state::AppState;
use crate::catalog::{Question, Topic};
use crate::progress::Status;
use crate::theme::Theme;

/// Width reserved for the badge column ("◔ Attempting")
const BADGE_WIDTH: usize = 12;
/// Width reserved for the difficulty column
const DIFFICULTY_WIDTH: usize = 8;

pub fn draw(
    frame: &mut Frame,
    area: Rect,
    topic: &Topic,
    state: &mut AppState,
    controller: &Controller,
    theme: &Theme,
    focused: bool,
) {
    let border_color = if focused { theme.border_focused } else { theme.border };

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", topic.name),
            Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(" [Enter] open  [1/2/3] status  [Esc] back ").centered())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme.bg_primary));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if topic.questions.is_empty() {
        let empty = Paragraph::new("No questions in this topic yet")
            .style(Style::default().fg(theme.fg_muted));
        frame.render_widget(empty, inner);
        return;
    }

    state.questions.visible_height = inner.height as usize;
    state.questions.ensure_selection_visible();

    let width = inner.width as usize;
    let lines: Vec<Line> = topic
        .questions
        .iter()
        .enumerate()
        .skip(state.questions.scroll_offset)
        .take(inner.height as usize)
        .map(|(index, question)| {
            let selected = focused && index == state.questions.selected;
            row(question, controller.status_of(&question.id), selected, width, theme)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// One list row: name, difficulty and status badge
fn row(
    question: &Question,
    status: Status,
    selected: bool,
    width: usize,
    theme: &Theme,
) -> Line<'static> {
    let name_width = width.saturating_sub(BADGE_WIDTH + DIFFICULTY_WIDTH + 3).max(8);
    let name = truncate(&question.name, name_width);

    let mut name_style = Style::default().fg(theme.fg_primary);
    let mut difficulty_style = Style::default().fg(theme.difficulty_color(question.difficulty));
    let mut badge = status_badge::span(status, theme);
    if selected {
        name_style = theme.selected_style();
        difficulty_style = difficulty_style.bg(theme.selection);
        badge.style = badge.style.bg(theme.selection);
    }

    Line::from(vec![
        Span::styled(format!(" {name:<name_width$} "), name_style),
        Span::styled(
            format!("{:<DIFFICULTY_WIDTH$} ", question.difficulty.label()),
            difficulty_style,
        ),
        badge,
    ])
}

/// Cut `text` to `max` characters, marking the cut with "…"
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
