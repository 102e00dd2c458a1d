//! Overlay for assistant replies

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::layout::{centered_rect, draw_scroll_indicator};
use super::{loading, markdown};
use crate::app::state::AiModal;
use crate::theme::Theme;

pub fn draw(frame: &mut Frame, area: Rect, modal: &mut AiModal, tick: usize, theme: &Theme) {
    let popup = centered_rect(80, 80, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(Span::styled(
            format!(" ✨ {} ", modal.title),
            Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(" [j/k] scroll  [Esc] close ").centered())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.bg_secondary));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let Some(content) = modal.content.as_deref() else {
        let thinking = Paragraph::new(Line::from(vec![
            Span::styled(loading::spinner(tick), Style::default().fg(theme.accent_primary)),
            Span::styled(" Your AI assistant is thinking...", Style::default().fg(theme.fg_muted)),
        ]))
        .alignment(Alignment::Center);
        let middle = Rect { y: inner.y + inner.height / 2, height: 1, ..inner };
        frame.render_widget(thinking, middle);
        return;
    };

    let text = Rect { x: inner.x + 1, width: inner.width.saturating_sub(3), ..inner };
    let lines = markdown::render(content, text.width as usize, theme);

    let max_scroll = lines.len().saturating_sub(text.height as usize);
    modal.scroll = modal.scroll.min(max_scroll);

    let paragraph = Paragraph::new(lines).scroll((modal.scroll as u16, 0));
    frame.render_widget(paragraph, text);
    draw_scroll_indicator(frame, popup, modal.scroll, max_scroll, theme);
}
