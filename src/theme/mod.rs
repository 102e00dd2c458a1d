//! Theming for the tracker

mod tokyo_night;

pub use tokyo_night::TOKYO_NIGHT;

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

use crate::catalog::Difficulty;
use crate::progress::Status;

/// A color theme for the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,

    // Background colors
    pub bg_primary: Color,
    pub bg_secondary: Color,
    pub bg_tertiary: Color,

    // Foreground colors
    pub fg_primary: Color,
    pub fg_secondary: Color,
    pub fg_muted: Color,

    // Accent colors
    pub accent_primary: Color,
    pub accent_secondary: Color,

    // Semantic colors
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,

    // Progress status
    pub status_todo: Color,
    pub status_attempting: Color,
    pub status_solved: Color,

    // Syntax highlighting fallback
    pub syntax_keyword: Color,
    pub syntax_string: Color,
    pub syntax_number: Color,
    pub syntax_comment: Color,
    pub syntax_type: Color,
    pub syntax_operator: Color,

    // UI elements
    pub border: Color,
    pub border_focused: Color,
    pub selection: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::tokyo_night()
    }
}

impl Theme {
    /// Colour used for a progress status
    pub fn status_color(&self, status: Status) -> Color {
        match status {
            Status::ToDo => self.status_todo,
            Status::Attempting => self.status_attempting,
            Status::Solved => self.status_solved,
        }
    }

    /// Colour used for a difficulty label
    pub fn difficulty_color(&self, difficulty: Difficulty) -> Color {
        match difficulty {
            Difficulty::Easy => self.success,
            Difficulty::Medium => self.warning,
            Difficulty::Hard => self.error,
        }
    }

    /// Style for a focused list row
    pub fn selected_style(&self) -> Style {
        Style::default().bg(self.selection).fg(self.fg_secondary).add_modifier(Modifier::BOLD)
    }
}
