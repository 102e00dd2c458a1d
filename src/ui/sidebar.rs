//! Sidebar: title, the Dashboard entry, one entry per topic and the session

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::Controller;
use crate::app::state::{AppState, Focus};
use crate::identity::Principal;
use crate::progress::{Status, status_of};
use crate::theme::Theme;

/// Characters of the session id shown in the footer
const SESSION_ID_CHARS: usize = 10;

/// Footer text for the current session
pub fn session_label(principal: Option<&Principal>) -> String {
    match principal {
        Some(principal) => {
            let short: String = principal.uid.chars().take(SESSION_ID_CHARS).collect();
            format!("{short}...")
        }
        None => "Loading...".to_string(),
    }
}

pub fn draw(
    frame: &mut Frame,
    area: Rect,
    state: &mut AppState,
    controller: &Controller,
    theme: &Theme,
) {
    let focused = state.focus == Focus::Sidebar;
    let border_color = if focused { theme.border_focused } else { theme.border };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme.bg_secondary));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [header, entries, footer] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(1), Constraint::Length(2)])
            .areas(inner);

    let title = vec![
        Line::from(Span::styled(
            "TCS Pro Coder",
            Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled("CSES Tracker", Style::default().fg(theme.fg_muted))),
    ];
    frame.render_widget(Paragraph::new(title), header);

    state.sidebar.visible_height = entries.height as usize;
    state.sidebar.ensure_selection_visible();

    let active = controller.view().topic().map(|t| t.id.as_str());
    let row_style = |index: usize, current: bool| {
        if focused && index == state.sidebar.selected {
            theme.selected_style()
        } else if current {
            Style::default().fg(theme.accent_secondary).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.fg_primary)
        }
    };

    let mut lines = vec![Line::from(Span::styled(
        " ▣ Dashboard",
        row_style(0, controller.view().topic().is_none()),
    ))];

    for (index, topic) in controller.catalog().iter().enumerate() {
        let solved = topic
            .questions
            .iter()
            .filter(|q| status_of(controller.progress(), &q.id) == Status::Solved)
            .count();
        let style = row_style(index + 1, active == Some(topic.id.as_str()));
        lines.push(Line::from(vec![
            Span::styled(format!(" ▸ {}", topic.name), style),
            Span::styled(
                format!(" {}/{}", solved, topic.questions.len()),
                Style::default().fg(theme.fg_muted),
            ),
        ]));
    }

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(state.sidebar.scroll_offset)
        .take(entries.height as usize)
        .collect();
    frame.render_widget(Paragraph::new(visible), entries);

    let session = vec![
        Line::from(Span::styled("User ID", Style::default().fg(theme.fg_muted))),
        Line::from(Span::styled(
            session_label(controller.session()),
            Style::default().fg(theme.fg_secondary),
        )),
    ];
    frame.render_widget(Paragraph::new(session), footer);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_is_truncated() {
        let principal =
            Principal { uid: "8f14e45fceea167a5a36dedd4bea2543".to_string(), anonymous: true };
        assert_eq!(session_label(Some(&principal)), "8f14e45fce...");
    }

    #[test]
    fn short_ids_still_get_ellipsis() {
        let principal = Principal { uid: "alice".to_string(), anonymous: false };
        assert_eq!(session_label(Some(&principal)), "alice...");
    }

    #[test]
    fn no_session_is_loading() {
        assert_eq!(session_label(None), "Loading...");
    }
}
