//! Key mapping

use crossterm::event::{KeyCode, KeyModifiers};

use crate::progress::Status;

/// Vim-style key mapping (basic, without modifiers)
pub fn vim_key_to_action(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Char('j') | KeyCode::Down => Some(Action::Down),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::Up),
        KeyCode::Char('g') | KeyCode::Home => Some(Action::Top),
        KeyCode::Char('G') | KeyCode::End => Some(Action::Bottom),
        KeyCode::PageDown => Some(Action::PageDown),
        KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => Some(Action::Select),
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Left => Some(Action::Back),
        KeyCode::Tab | KeyCode::BackTab => Some(Action::ToggleFocus),
        KeyCode::Char('d') => Some(Action::Dashboard),
        // Status selector
        KeyCode::Char('1') => Some(Action::SetStatus(Status::ToDo)),
        KeyCode::Char('2') => Some(Action::SetStatus(Status::Attempting)),
        KeyCode::Char('3') => Some(Action::SetStatus(Status::Solved)),
        // Approaches
        KeyCode::Char('n') | KeyCode::Char(']') => Some(Action::NextApproach),
        KeyCode::Char('p') | KeyCode::Char('[') => Some(Action::PrevApproach),
        KeyCode::Char('y') => Some(Action::CopyCode),
        // Assistant
        KeyCode::Char('h') => Some(Action::Hint),
        KeyCode::Char('e') => Some(Action::ExplainCode),
        KeyCode::Char('a') => Some(Action::SuggestApproach),
        KeyCode::Char('r') => Some(Action::Reminder),
        KeyCode::Char(':') => Some(Action::CommandMode),
        KeyCode::Char('?') => Some(Action::Help),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}

/// Key mapping with modifiers (for Ctrl combinations)
pub fn key_with_modifier_to_action(key: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
    if modifiers.contains(KeyModifiers::CONTROL) {
        match key {
            KeyCode::Char('d') => Some(Action::HalfPageDown),
            KeyCode::Char('u') => Some(Action::HalfPageUp),
            KeyCode::Char('f') => Some(Action::PageDown),
            KeyCode::Char('b') => Some(Action::PageUp),
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        }
    } else {
        vim_key_to_action(key)
    }
}

/// Actions that can be taken in the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Navigation
    Up,
    Down,
    Top,
    Bottom,
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,

    // Views
    Select,
    Back,
    Dashboard,
    ToggleFocus,

    // Question
    SetStatus(Status),
    NextApproach,
    PrevApproach,
    CopyCode,
    Reminder,

    // Assistant
    Hint,
    ExplainCode,
    SuggestApproach,

    // Modes
    CommandMode,
    Help,
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vim_j_maps_to_down() {
        assert_eq!(vim_key_to_action(KeyCode::Char('j')), Some(Action::Down));
    }

    #[test]
    fn vim_k_maps_to_up() {
        assert_eq!(vim_key_to_action(KeyCode::Char('k')), Some(Action::Up));
    }

    #[test]
    fn unknown_key_returns_none() {
        assert_eq!(vim_key_to_action(KeyCode::Char('x')), None);
    }

    #[test]
    fn digits_select_status() {
        assert_eq!(vim_key_to_action(KeyCode::Char('1')), Some(Action::SetStatus(Status::ToDo)));
        assert_eq!(
            vim_key_to_action(KeyCode::Char('2')),
            Some(Action::SetStatus(Status::Attempting))
        );
        assert_eq!(vim_key_to_action(KeyCode::Char('3')), Some(Action::SetStatus(Status::Solved)));
    }

    #[test]
    fn back_keys() {
        assert_eq!(vim_key_to_action(KeyCode::Esc), Some(Action::Back));
        assert_eq!(vim_key_to_action(KeyCode::Backspace), Some(Action::Back));
    }

    #[test]
    fn ctrl_d_half_page_down() {
        assert_eq!(
            key_with_modifier_to_action(KeyCode::Char('d'), KeyModifiers::CONTROL),
            Some(Action::HalfPageDown)
        );
    }

    #[test]
    fn plain_d_goes_to_dashboard() {
        assert_eq!(
            key_with_modifier_to_action(KeyCode::Char('d'), KeyModifiers::NONE),
            Some(Action::Dashboard)
        );
    }

    #[test]
    fn ctrl_c_quits() {
        assert_eq!(
            key_with_modifier_to_action(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(Action::Quit)
        );
    }
}
