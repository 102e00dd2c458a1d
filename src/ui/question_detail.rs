//! Question detail: link, status selector, assistant actions and approaches

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::layout::draw_scroll_indicator;
use crate::app::Controller;
use crate::app::state::{AppState, QuestionState};
use crate::catalog::Question;
use crate::progress::Status;
use crate::syntax::highlight_block;
use crate::theme::Theme;

pub fn draw(
    frame: &mut Frame,
    area: Rect,
    question: &Question,
    state: &mut AppState,
    controller: &Controller,
    theme: &Theme,
) {
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", question.name),
            Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(" [n/p] approach  [j/k] scroll  [Esc] back ").centered())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .style(Style::default().bg(theme.bg_primary));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = Rect { x: inner.x + 1, width: inner.width.saturating_sub(3), ..inner };
    let status = controller.status_of(&question.id);
    let lines = build_lines(question, status, &state.question, text.width as usize, theme);

    let view = &mut state.question;
    view.total_lines = lines.len();
    view.visible_height = text.height as usize;
    view.scroll_offset = view.scroll_offset.min(view.max_scroll());

    let paragraph = Paragraph::new(lines).scroll((view.scroll_offset as u16, 0));
    frame.render_widget(paragraph, text);
    draw_scroll_indicator(frame, area, view.scroll_offset, view.max_scroll(), theme);
}

/// Every line of the detail view, top to bottom
pub fn build_lines(
    question: &Question,
    status: Status,
    view: &QuestionState,
    width: usize,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let muted = Style::default().fg(theme.fg_muted);
    let key = Style::default().fg(theme.accent_secondary);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                question.name.clone(),
                Style::default().fg(theme.fg_primary).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                question.difficulty.label(),
                Style::default().fg(theme.difficulty_color(question.difficulty)),
            ),
        ]),
        Line::from(vec![
            Span::styled("View Problem on CSES: ", muted),
            Span::styled(
                question.link.clone(),
                Style::default().fg(theme.info).add_modifier(Modifier::UNDERLINED),
            ),
        ]),
        Line::default(),
        status_selector(status, theme),
        Line::default(),
        Line::from(vec![
            Span::styled("[h] ", key),
            Span::styled("✨ Get a Hint", Style::default().fg(theme.accent_primary)),
            Span::raw("   "),
            Span::styled("[r] ", key),
            Span::styled("Set Reminder", Style::default().fg(theme.fg_primary)),
            Span::raw("   "),
            Span::styled("[a] ", key),
            Span::styled("Suggest Another Approach", Style::default().fg(theme.fg_primary)),
        ]),
    ];

    if question.approaches.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("No approaches recorded yet.", muted)));
        return lines;
    }

    for (index, approach) in question.approaches.iter().enumerate() {
        let selected = index == view.approach;
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled(
                if selected { "▶ " } else { "  " },
                Style::default().fg(theme.accent_primary),
            ),
            Span::styled(
                format!("Approach {}: {}", index + 1, approach.title),
                Style::default().fg(theme.accent_secondary).add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Thought Process & Strategy",
            Style::default().fg(theme.fg_secondary).add_modifier(Modifier::BOLD),
        )));
        for wrapped in textwrap::wrap(&approach.strategy, width.max(10)) {
            lines.push(Line::from(Span::styled(
                wrapped.into_owned(),
                Style::default().fg(theme.fg_primary),
            )));
        }
        lines.push(Line::default());

        let copy = if view.is_copied(index) {
            Span::styled("Copied!", Style::default().fg(theme.success))
        } else {
            Span::styled("Copy", Style::default().fg(theme.fg_primary))
        };
        let mut actions = vec![
            Span::styled("[e] ", key),
            Span::styled("✨ Explain Code", Style::default().fg(theme.accent_primary)),
            Span::raw("   "),
            Span::styled("[y] ", key),
            copy,
        ];
        if !selected {
            // Keys act on the selected approach
            for span in &mut actions {
                span.style = span.style.add_modifier(Modifier::DIM);
            }
        }
        lines.push(Line::from(actions));
        lines.extend(highlight_block(approach.code.trim(), Some("cpp"), theme));
    }

    lines
}

/// "[1] To-Do  [2] Attempting  [3] Solved" with the current status lit
fn status_selector(current: Status, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::styled("Status: ", Style::default().fg(theme.fg_muted))];
    for (index, status) in Status::all().iter().copied().enumerate() {
        let style = if status == current {
            Style::default()
                .fg(theme.bg_primary)
                .bg(theme.status_color(status))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.status_color(status))
        };
        spans.push(Span::styled(format!(" [{}] {} ", index + 1, status.label()), style));
        spans.push(Span::raw(" "));
    }
    spans.pop();
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::cses_problem_set;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn all_text(lines: &[Line]) -> Vec<String> {
        lines.iter().map(text).collect()
    }

    #[test]
    fn shows_link_and_actions() {
        let theme = Theme::default();
        let question = cses_problem_set()[0].questions[0].clone();
        let lines = build_lines(&question, Status::ToDo, &QuestionState::default(), 80, &theme);
        let text = all_text(&lines);

        assert!(text.contains(&format!("View Problem on CSES: {}", question.link)));
        assert!(text.iter().any(|l| l.contains("✨ Get a Hint") && l.contains("Set Reminder")));
        assert!(text.iter().any(|l| l.contains("Approach 1: ")));
        assert!(text.iter().any(|l| l == "Thought Process & Strategy"));
    }

    #[test]
    fn current_status_is_lit() {
        let theme = Theme::default();
        let line = status_selector(Status::Attempting, &theme);
        let lit = line.spans.iter().find(|s| s.style.bg.is_some()).unwrap();
        assert_eq!(lit.content, " [2] Attempting ");
        assert_eq!(lit.style.bg, Some(theme.status_color(Status::Attempting)));
    }

    #[test]
    fn selected_approach_is_marked() {
        let theme = Theme::default();
        let question = cses_problem_set()[0].questions[0].clone();
        let lines = build_lines(&question, Status::ToDo, &QuestionState::default(), 80, &theme);
        let marked = lines.iter().map(text).find(|l| l.starts_with("▶ ")).unwrap();
        assert!(marked.starts_with("▶ Approach 1: "));
    }

    #[test]
    fn copied_label_follows_state() {
        let theme = Theme::default();
        let question = cses_problem_set()[0].questions[0].clone();
        let mut view = QuestionState::default();

        let before = all_text(&build_lines(&question, Status::ToDo, &view, 80, &theme));
        assert!(before.iter().any(|l| l.ends_with("[y] Copy")));

        view.mark_copied(0);
        let after = all_text(&build_lines(&question, Status::ToDo, &view, 80, &theme));
        assert!(after.iter().any(|l| l.ends_with("[y] Copied!")));
    }

    #[test]
    fn question_without_approaches() {
        let theme = Theme::default();
        let mut question = cses_problem_set()[0].questions[0].clone();
        question.approaches.clear();
        let lines = build_lines(&question, Status::Solved, &QuestionState::default(), 80, &theme);
        assert_eq!(text(lines.last().unwrap()), "No approaches recorded yet.");
    }
}
