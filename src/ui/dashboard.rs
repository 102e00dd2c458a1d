//! Dashboard: stat cards, the weekly consistency chart and topic progress

use chrono::Local;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
};

use crate::app::Controller;
use crate::progress::{DayCount, ProgressStats, TopicProgress, topic_breakdown, weekly_series};
use crate::theme::Theme;

/// Width of the per-topic progress bar
const BAR_WIDTH: usize = 20;

pub fn draw(frame: &mut Frame, area: Rect, controller: &Controller, theme: &Theme) {
    let block = Block::default()
        .title(" Dashboard ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .style(Style::default().bg(theme.bg_primary));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let stats = controller.stats();
    let series = weekly_series(controller.progress(), &Local::now());
    let topics = topic_breakdown(controller.catalog(), controller.progress());

    let [cards, chart, breakdown] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(8),
        Constraint::Length(topics.len() as u16 + 2),
    ])
    .areas(inner);

    draw_cards(frame, cards, &stats, theme);
    draw_chart(frame, chart, &series, theme);
    draw_breakdown(frame, breakdown, &topics, theme);
}

/// Text of the three stat cards, in display order
pub fn card_values(stats: &ProgressStats) -> [(&'static str, String); 3] {
    [
        ("Solved", format!("{} / {}", stats.solved, stats.total)),
        ("Attempting", stats.attempting.to_string()),
        ("To-Do", stats.todo.to_string()),
    ]
}

fn draw_cards(frame: &mut Frame, area: Rect, stats: &ProgressStats, theme: &Theme) {
    let columns = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);
    let colors = [theme.status_solved, theme.status_attempting, theme.status_todo];

    for ((column, (title, value)), color) in columns.iter().zip(card_values(stats)).zip(colors) {
        let card = Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().fg(theme.fg_primary).add_modifier(Modifier::BOLD),
        )))
        .block(
            Block::default()
                .title(Span::styled(format!(" {title} "), Style::default().fg(color)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .style(Style::default().bg(theme.bg_secondary)),
        );
        frame.render_widget(card, *column);
    }
}

fn draw_chart(frame: &mut Frame, area: Rect, series: &[DayCount], theme: &Theme) {
    let bars: Vec<Bar> = series
        .iter()
        .map(|day| {
            Bar::default()
                .value(day.solved)
                .label(Line::from(day.label.clone()))
                .style(Style::default().fg(theme.status_solved))
                .value_style(Style::default().fg(theme.bg_primary).bg(theme.status_solved))
        })
        .collect();

    // Spread seven bars over the available width
    let inner_width = area.width.saturating_sub(2);
    let bar_gap = 2;
    let bar_width = (inner_width.saturating_sub(bar_gap * 6) / 7).clamp(3, 9);

    let chart = BarChart::default()
        .block(
            Block::default()
                .title(" Weekly Consistency ")
                .title_bottom(
                    Line::from(Span::styled(
                        " ■ Questions Solved ",
                        Style::default().fg(theme.status_solved),
                    ))
                    .centered(),
                )
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(bar_gap)
        .label_style(Style::default().fg(theme.fg_muted));

    frame.render_widget(chart, area);
}

/// A fixed-width text progress bar ("█████░░░░░")
pub fn progress_bar(solved: usize, total: usize, width: usize) -> String {
    let filled = if total == 0 { 0 } else { (solved.min(total) * width) / total };
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn draw_breakdown(frame: &mut Frame, area: Rect, topics: &[TopicProgress], theme: &Theme) {
    let name_width = topics.iter().map(|t| t.name.chars().count()).max().unwrap_or(0);

    let lines: Vec<Line> = topics
        .iter()
        .map(|topic| {
            Line::from(vec![
                Span::styled(
                    format!("{:<name_width$}  ", topic.name),
                    Style::default().fg(theme.fg_primary),
                ),
                Span::styled(
                    progress_bar(topic.solved, topic.total, BAR_WIDTH),
                    Style::default().fg(theme.status_solved),
                ),
                Span::styled(
                    format!(" {}/{}", topic.solved, topic.total),
                    Style::default().fg(theme.fg_muted),
                ),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Topics ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(paragraph, area);
}
