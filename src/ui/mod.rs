//! UI rendering components
//!
//! Rendering is stateless with respect to the store: every frame is drawn
//! from what the controller currently holds. The only state written back is
//! layout feedback (visible heights, clamped scroll offsets).

pub mod ai_modal;
pub mod command_line;
pub mod dashboard;
pub mod help;
pub mod layout;
pub mod loading;
pub mod markdown;
pub mod question_detail;
pub mod sidebar;
pub mod status_badge;
pub mod topic_list;

use ratatui::{Frame, style::Style, widgets::Block};

use crate::app::state::{AppState, Focus};
use crate::app::{Controller, LoadState, View};
use crate::theme::Theme;

/// Main draw function
pub fn draw(frame: &mut Frame, state: &mut AppState, controller: &Controller, theme: &Theme) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(theme.bg_primary)), area);

    let screen = layout::split_screen(area);
    let main_focused = state.focus == Focus::Main;

    sidebar::draw(frame, screen.sidebar, state, controller, theme);

    // Nothing to show until the first catalog snapshot arrives
    if controller.catalog().is_empty() && *controller.load_state() != LoadState::Ready {
        loading::draw(frame, screen.main, controller.load_state(), state.tick, theme);
    } else {
        match controller.view() {
            View::Dashboard => dashboard::draw(frame, screen.main, controller, theme),
            View::Topic(topic) => {
                topic_list::draw(frame, screen.main, topic, state, controller, theme, main_focused)
            }
            View::Question { question, .. } => {
                question_detail::draw(frame, screen.main, question, state, controller, theme)
            }
        }
    }

    command_line::draw(frame, screen.command, &state.command_line, controller, theme);

    if let Some(modal) = state.modal.as_mut() {
        ai_modal::draw(frame, area, modal, state.tick, theme);
    }
    if state.show_help {
        help::draw(frame, area, theme);
    }
}
