//! Key and command reference overlay

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::layout::centered_rect;
use crate::theme::Theme;

const KEYS: &[(&str, &str)] = &[
    ("j/k  ↑/↓", "Move"),
    ("g/G", "Top / bottom"),
    ("Enter  l", "Open"),
    ("Esc  ←", "Back"),
    ("Tab", "Switch sidebar / main"),
    ("d", "Dashboard"),
    ("1 2 3", "Mark To-Do / Attempting / Solved"),
    ("n/p  ]/[", "Next / previous approach"),
    ("y", "Copy approach code"),
    ("h", "✨ Get a Hint"),
    ("e", "✨ Explain Code"),
    ("a", "Suggest Another Approach"),
    ("r", "Set Reminder"),
    ("Ctrl-d/u", "Half page down / up"),
    ("?", "Toggle this help"),
    ("q", "Quit"),
];

const COMMANDS: &[(&str, &str)] = &[
    (":topic <n|name>", "Open a topic"),
    (":open <id>", "Open a question by CSES id"),
    (":status <todo|attempting|solved>", "Set status"),
    (":hint  :explain [n]  :suggest", "Ask the assistant"),
    (":copy [n]  :remind", "Copy code, calendar reminder"),
    (":ai-key <key>  :ai-clear", "Store or remove the Gemini key"),
    (":dashboard  :q", "Dashboard, quit"),
];

pub fn draw(frame: &mut Frame, area: Rect, theme: &Theme) {
    let popup = centered_rect(70, 80, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Help ")
        .title_bottom(Line::from(" [?/Esc] close ").centered())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.bg_secondary));

    frame.render_widget(Paragraph::new(lines(theme)).block(block), popup);
}

fn lines(theme: &Theme) -> Vec<Line<'static>> {
    let heading = Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD);
    let key_style = Style::default().fg(theme.accent_secondary);
    let text_style = Style::default().fg(theme.fg_primary);

    let section = |title: &'static str, rows: &[(&'static str, &'static str)]| {
        let width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
        let mut lines = vec![Line::from(Span::styled(title, heading))];
        lines.extend(rows.iter().map(|(key, text)| {
            Line::from(vec![
                Span::styled(format!("  {key:<width$}  "), key_style),
                Span::styled(*text, text_style),
            ])
        }));
        lines
    };

    let mut out = section("Keys", KEYS);
    out.push(Line::default());
    out.extend(section("Commands", COMMANDS));
    out
}
