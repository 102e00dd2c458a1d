//! UI-only state: cursors, focus, overlays and the command line
//!
//! Anything that lives in the store (catalog, progress, session) belongs to
//! the controller; this module only tracks what the terminal is showing.

use std::time::{Duration, Instant};

/// How long the "Copied!" indicator stays on an approach
pub const COPIED_INDICATOR: Duration = Duration::from_millis(2000);

/// Which column receives movement keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    #[default]
    Main,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Focus::Sidebar => Focus::Main,
            Focus::Main => Focus::Sidebar,
        }
    }
}

/// Cursor over a vertical list
#[derive(Debug, Clone, Default)]
pub struct ListState {
    /// Currently selected row
    pub selected: usize,
    /// First visible row
    pub scroll_offset: usize,
    /// Visible height in rows (updated on render)
    pub visible_height: usize,
}

impl ListState {
    /// Ensure the selected row is visible by adjusting scroll offset
    pub fn ensure_selection_visible(&mut self) {
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        }
        let visible = self.visible_height;
        if visible > 0 && self.selected >= self.scroll_offset + visible {
            self.scroll_offset = self.selected + 1 - visible;
        }
    }

    pub fn next(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
        self.ensure_selection_visible();
    }

    pub fn previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.ensure_selection_visible();
    }

    pub fn first(&mut self) {
        self.selected = 0;
        self.ensure_selection_visible();
    }

    pub fn last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
        self.ensure_selection_visible();
    }

    /// Keep the cursor inside a list that may have shrunk
    pub fn clamp(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
        self.ensure_selection_visible();
    }
}

/// State of the question detail view
#[derive(Debug, Clone, Default)]
pub struct QuestionState {
    /// Approach the code actions apply to
    pub approach: usize,
    /// Scroll position (lines from top)
    pub scroll_offset: usize,
    /// Total rendered lines (updated on render)
    pub total_lines: usize,
    /// Visible height in lines (updated on render)
    pub visible_height: usize,
    /// Approach whose code was copied, and when
    pub copied: Option<(usize, Instant)>,
}

impl QuestionState {
    /// Get the maximum allowed scroll offset
    pub fn max_scroll(&self) -> usize {
        self.total_lines.saturating_sub(self.visible_height / 2)
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let target = self.scroll_offset.saturating_add_signed(delta);
        self.scroll_offset = target.min(self.max_scroll());
    }

    pub fn next_approach(&mut self, count: usize) {
        if self.approach + 1 < count {
            self.approach += 1;
        }
    }

    pub fn previous_approach(&mut self) {
        self.approach = self.approach.saturating_sub(1);
    }

    pub fn mark_copied(&mut self, approach: usize) {
        self.copied = Some((approach, Instant::now()));
    }

    /// Whether `approach` should still show "Copied!"
    pub fn is_copied(&self, approach: usize) -> bool {
        self.copied.is_some_and(|(index, at)| index == approach && at.elapsed() < COPIED_INDICATOR)
    }

    /// Drop an expired copied indicator
    pub fn tick(&mut self) {
        if self.copied.is_some_and(|(_, at)| at.elapsed() >= COPIED_INDICATOR) {
            self.copied = None;
        }
    }
}

/// The AI response overlay
#[derive(Debug, Clone)]
pub struct AiModal {
    pub title: String,
    /// `None` while the assistant is thinking
    pub content: Option<String>,
    pub scroll: usize,
}

impl AiModal {
    pub fn loading(title: impl Into<String>) -> Self {
        Self { title: title.into(), content: None, scroll: 0 }
    }

    pub fn is_loading(&self) -> bool {
        self.content.is_none()
    }
}

/// Command line mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommandMode {
    /// Showing the last message or the key hint
    #[default]
    Normal,
    /// Accepting : commands
    Command,
}

/// State for the command line input
#[derive(Debug, Clone, Default)]
pub struct CommandLineState {
    /// Current mode
    pub mode: CommandMode,
    /// Input buffer
    pub input: String,
    /// Cursor position in input (character index)
    pub cursor: usize,
    /// Status/error message to display (when not in input mode)
    pub message: Option<String>,
    /// Whether message is an error
    pub is_error: bool,
    /// Command history
    pub history: Vec<String>,
    /// Current history index when navigating
    pub history_index: Option<usize>,
}

impl CommandLineState {
    /// Maximum number of history entries to keep
    const MAX_HISTORY: usize = 200;

    /// Start command mode
    pub fn enter_command_mode(&mut self) {
        self.mode = CommandMode::Command;
        self.input.clear();
        self.cursor = 0;
        self.message = None;
        self.history_index = None;
    }

    /// Exit input mode
    pub fn exit_input_mode(&mut self) {
        self.mode = CommandMode::Normal;
        self.input.clear();
        self.cursor = 0;
    }

    /// Set a status message
    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.is_error = false;
    }

    /// Set an error message
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.is_error = true;
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    fn char_to_byte_index(&self, char_idx: usize) -> usize {
        self.input.char_indices().nth(char_idx).map(|(i, _)| i).unwrap_or(self.input.len())
    }

    fn char_count(&self) -> usize {
        self.input.chars().count()
    }

    /// Insert a character at cursor
    pub fn insert_char(&mut self, c: char) {
        let byte_idx = self.char_to_byte_index(self.cursor);
        self.input.insert(byte_idx, c);
        self.cursor += 1;
    }

    /// Delete character before cursor
    pub fn delete_char(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_idx = self.char_to_byte_index(self.cursor);
            self.input.remove(byte_idx);
        }
    }

    /// Delete character at cursor
    pub fn delete_char_forward(&mut self) {
        if self.cursor < self.char_count() {
            let byte_idx = self.char_to_byte_index(self.cursor);
            self.input.remove(byte_idx);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    pub fn move_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    pub fn is_input_mode(&self) -> bool {
        self.mode == CommandMode::Command
    }

    pub fn add_to_history(&mut self, cmd: String) {
        if !cmd.is_empty() && self.history.last() != Some(&cmd) {
            if self.history.len() >= Self::MAX_HISTORY {
                self.history.remove(0);
            }
            self.history.push(cmd);
        }
    }

    /// Navigate history up
    pub fn history_up(&mut self) {
        if self.history.is_empty() {
            return;
        }
        match self.history_index {
            None => self.history_index = Some(self.history.len() - 1),
            Some(i) if i > 0 => self.history_index = Some(i - 1),
            _ => {}
        }
        if let Some(i) = self.history_index {
            self.input = self.history[i].clone();
            self.cursor = self.char_count();
        }
    }

    /// Navigate history down
    pub fn history_down(&mut self) {
        if let Some(i) = self.history_index {
            if i + 1 < self.history.len() {
                self.history_index = Some(i + 1);
                self.input = self.history[i + 1].clone();
                self.cursor = self.char_count();
            } else {
                self.history_index = None;
                self.input.clear();
                self.cursor = 0;
            }
        }
    }
}

/// Full UI state
#[derive(Debug, Default)]
pub struct AppState {
    pub focus: Focus,

    /// Sidebar cursor: row 0 is Dashboard, then one row per topic
    pub sidebar: ListState,

    /// Question list cursor in the Topic view
    pub questions: ListState,

    /// Question detail view state
    pub question: QuestionState,

    /// AI response overlay, when open
    pub modal: Option<AiModal>,

    /// Whether the key help overlay is open
    pub show_help: bool,

    /// Frame counter for spinners
    pub tick: usize,

    pub command_line: CommandLineState,

    pub should_quit: bool,
}

impl AppState {
    /// Reset the per-view cursors when a different question is opened
    pub fn open_question(&mut self) {
        self.question = QuestionState::default();
    }

    /// Reset the list cursor when a different topic is opened
    pub fn open_topic(&mut self) {
        self.questions = ListState::default();
    }
}
