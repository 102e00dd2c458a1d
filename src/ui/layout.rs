//! Layout utilities and common components

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Paragraph,
};

use crate::theme::Theme;

/// Minimum width for the sidebar
const SIDEBAR_MIN_WIDTH: u16 = 24;

/// The three regions of the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    pub sidebar: Rect,
    pub main: Rect,
    pub command: Rect,
}

/// Split the terminal into sidebar, main area and the command line
pub fn split_screen(area: Rect) -> Screen {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let sidebar_width = (area.width / 5).max(SIDEBAR_MIN_WIDTH).min(area.width / 2);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(sidebar_width), Constraint::Min(30)])
        .split(vertical[0]);

    Screen { sidebar: horizontal[0], main: horizontal[1], command: vertical[1] }
}

/// Create a centered rectangle with the given percentage of width and height
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

/// Draw a scroll thumb on the right edge of `area`
pub fn draw_scroll_indicator(
    frame: &mut Frame,
    area: Rect,
    scroll: usize,
    max_scroll: usize,
    theme: &Theme,
) {
    if area.height < 3 || max_scroll == 0 {
        return;
    }

    let track_height = area.height.saturating_sub(2) as usize;
    let thumb_pos = (scroll.min(max_scroll) * track_height) / max_scroll;

    let thumb_y = area.y + 1 + thumb_pos as u16;
    let thumb_x = area.x + area.width - 1;

    if thumb_y < area.y + area.height - 1 {
        let thumb = Paragraph::new("█").style(Style::default().fg(theme.fg_muted));
        frame.render_widget(thumb, Rect::new(thumb_x, thumb_y, 1, 1));
    }
}
