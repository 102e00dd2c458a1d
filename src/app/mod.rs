//! Application shell: terminal setup, the event loop and intent routing

pub mod command;
pub mod context;
pub mod controller;
pub mod headless;
pub mod input;
pub mod state;
pub mod view;

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::assistant::{ApiKeyManager, AssistKind};
use crate::calendar;
use crate::catalog::{Question, Topic, find_question};
use crate::progress::Status;
use crate::theme::Theme;
use crate::ui;
use command::{Command, ParseResult, parse_command};
use input::{Action, key_with_modifier_to_action};
use state::{AiModal, AppState, Focus};

pub use context::ClientContext;
pub use controller::{Controller, LoadState, Notice};
pub use view::{Navigation, View};

/// Frame budget of the event loop
const FRAME: Duration = Duration::from_millis(16);

/// The terminal application
pub struct App {
    theme: Theme,

    /// UI-only state
    state: AppState,

    /// Store-backed state and the collaborators
    controller: Controller,

    /// Opened on first copy; `None` until then or when unavailable
    clipboard: Option<arboard::Clipboard>,

    /// Terminal backend
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl App {
    /// Create a new application instance
    pub fn new(controller: Controller, theme: Theme) -> Result<Self> {
        let terminal = Self::setup_terminal()?;

        Ok(Self { theme, state: AppState::default(), controller, clipboard: None, terminal })
    }

    /// Set up the terminal for TUI rendering
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    /// Restore the terminal to its original state
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Run the application main loop
    pub async fn run(&mut self) -> Result<()> {
        // Set up panic hook to restore terminal
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
            original_hook(panic_info);
        }));

        self.controller.start();

        loop {
            for notice in self.controller.pump() {
                self.handle_notice(notice);
            }
            self.sync_cursors();

            self.terminal.draw(|frame| {
                ui::draw(frame, &mut self.state, &self.controller, &self.theme);
            })?;

            if event::poll(FRAME)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            self.state.tick = self.state.tick.wrapping_add(1);
            self.state.question.tick();

            if self.state.should_quit {
                break;
            }
        }

        self.controller.shutdown();
        self.restore_terminal()?;
        Ok(())
    }

    fn handle_notice(&mut self, notice: Notice) {
        match notice {
            Notice::Info(message) => self.state.command_line.set_message(message),
            Notice::Error(message) => self.state.command_line.set_error(message),
            Notice::Reply { title, text } => {
                self.state.modal = Some(AiModal { title, content: Some(text), scroll: 0 });
            }
        }
    }

    /// Keep cursors consistent with a catalog that may have changed underneath
    fn sync_cursors(&mut self) {
        let topics = self.controller.catalog().len();
        self.state.sidebar.clamp(topics + 1);

        if let View::Topic(topic) = self.controller.view() {
            self.state.questions.clamp(topic.questions.len());
        }
        if let Some(question) = self.controller.view().question() {
            let count = question.approaches.len();
            if self.state.question.approach >= count {
                self.state.question.approach = count.saturating_sub(1);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.state.command_line.is_input_mode() {
            self.handle_command_input(key);
            return;
        }

        if self.state.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q' | '?')) {
                self.state.show_help = false;
            }
            return;
        }

        if self.state.modal.is_some() {
            self.handle_modal_key(key);
            return;
        }

        if let Some(action) = key_with_modifier_to_action(key.code, key.modifiers) {
            self.handle_action(action);
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) {
        let Some(modal) = self.state.modal.as_mut() else {
            return;
        };
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => self.state.modal = None,
            KeyCode::Char('c') if ctrl => self.state.modal = None,
            KeyCode::Char('j') | KeyCode::Down => modal.scroll = modal.scroll.saturating_add(1),
            KeyCode::Char('k') | KeyCode::Up => modal.scroll = modal.scroll.saturating_sub(1),
            KeyCode::Char('d') if ctrl => modal.scroll = modal.scroll.saturating_add(10),
            KeyCode::Char('u') if ctrl => modal.scroll = modal.scroll.saturating_sub(10),
            KeyCode::PageDown => modal.scroll = modal.scroll.saturating_add(10),
            KeyCode::PageUp => modal.scroll = modal.scroll.saturating_sub(10),
            KeyCode::Char('g') | KeyCode::Home => modal.scroll = 0,
            _ => {}
        }
    }

    fn handle_command_input(&mut self, key: KeyEvent) {
        let line = &mut self.state.command_line;
        match key.code {
            KeyCode::Esc => line.exit_input_mode(),
            KeyCode::Enter => {
                let input = line.input.clone();
                line.add_to_history(input.clone());
                line.exit_input_mode();
                self.execute_command(&input);
            }
            KeyCode::Backspace if line.input.is_empty() => line.exit_input_mode(),
            KeyCode::Backspace => line.delete_char(),
            KeyCode::Delete => line.delete_char_forward(),
            KeyCode::Left => line.move_left(),
            KeyCode::Right => line.move_right(),
            KeyCode::Home => line.move_start(),
            KeyCode::End => line.move_end(),
            KeyCode::Up => line.history_up(),
            KeyCode::Down => line.history_down(),
            KeyCode::Char(c) => line.insert_char(c),
            _ => {}
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Up => self.move_cursor(-1),
            Action::Down => self.move_cursor(1),
            Action::PageUp => self.move_cursor(-(self.page_size() as isize)),
            Action::PageDown => self.move_cursor(self.page_size() as isize),
            Action::HalfPageUp => self.move_cursor(-(self.page_size() as isize / 2).max(1)),
            Action::HalfPageDown => self.move_cursor((self.page_size() as isize / 2).max(1)),
            Action::Top => self.jump(false),
            Action::Bottom => self.jump(true),
            Action::Select => self.select(),
            Action::Back => self.navigate(Navigation::Back),
            Action::Dashboard => self.navigate(Navigation::Dashboard),
            Action::ToggleFocus => self.state.focus = self.state.focus.toggle(),
            Action::SetStatus(status) => self.set_status(status),
            Action::NextApproach => {
                if let Some(question) = self.controller.view().question() {
                    self.state.question.next_approach(question.approaches.len());
                }
            }
            Action::PrevApproach => self.state.question.previous_approach(),
            Action::CopyCode => self.copy_code(None),
            Action::Reminder => self.reminder(),
            Action::Hint => self.assist(AssistKind::Hint),
            Action::ExplainCode => {
                self.assist(AssistKind::Explain { approach: self.state.question.approach })
            }
            Action::SuggestApproach => self.assist(AssistKind::Suggest),
            Action::CommandMode => self.state.command_line.enter_command_mode(),
            Action::Help => self.state.show_help = true,
            Action::Quit => self.state.should_quit = true,
        }
    }

    fn page_size(&self) -> usize {
        match self.controller.view() {
            View::Question { .. } => self.state.question.visible_height.max(2),
            _ => self.state.questions.visible_height.max(2),
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.state.focus == Focus::Sidebar {
            let len = self.controller.catalog().len() + 1;
            step(&mut self.state.sidebar, delta, len);
            return;
        }

        match self.controller.view() {
            View::Dashboard => {}
            View::Topic(topic) => step(&mut self.state.questions, delta, topic.questions.len()),
            View::Question { .. } => self.state.question.scroll_by(delta),
        }
    }

    fn jump(&mut self, bottom: bool) {
        if self.state.focus == Focus::Sidebar {
            let len = self.controller.catalog().len() + 1;
            if bottom { self.state.sidebar.last(len) } else { self.state.sidebar.first() }
            return;
        }

        match self.controller.view() {
            View::Dashboard => {}
            View::Topic(topic) => {
                let len = topic.questions.len();
                if bottom { self.state.questions.last(len) } else { self.state.questions.first() }
            }
            View::Question { .. } => {
                self.state.question.scroll_offset =
                    if bottom { self.state.question.max_scroll() } else { 0 };
            }
        }
    }

    fn select(&mut self) {
        if self.state.focus == Focus::Sidebar {
            match self.state.sidebar.selected.checked_sub(1) {
                None => self.navigate(Navigation::Dashboard),
                Some(index) => {
                    if let Some(topic) = self.controller.catalog().get(index).cloned() {
                        self.open_topic(topic);
                    }
                }
            }
            self.state.focus = Focus::Main;
            return;
        }

        if let View::Topic(topic) = self.controller.view() {
            if let Some(question) = topic.questions.get(self.state.questions.selected).cloned() {
                self.open_question(question);
            }
        }
    }

    fn navigate(&mut self, navigation: Navigation) {
        let from_question = matches!(self.controller.view(), View::Question { .. });
        self.controller.navigate(navigation);

        // Returning to the list keeps the cursor on the question just left
        if !from_question {
            self.state.questions = Default::default();
        }
        self.sync_sidebar();
    }

    fn open_topic(&mut self, topic: Topic) {
        self.controller.navigate(Navigation::SelectTopic(topic));
        self.state.open_topic();
        self.sync_sidebar();
    }

    fn open_question(&mut self, question: Question) {
        self.controller.navigate(Navigation::SelectQuestion(question));
        self.state.open_question();
    }

    /// Point the sidebar cursor at the entry matching the view
    fn sync_sidebar(&mut self) {
        let view = self.controller.view();
        self.state.sidebar.selected = view
            .topic()
            .and_then(|topic| self.controller.catalog().iter().position(|t| t.id == topic.id))
            .map_or(0, |index| index + 1);
        self.state.sidebar.ensure_selection_visible();
    }

    /// Question the status and assistant actions apply to
    fn target_question(&self) -> Option<Question> {
        match self.controller.view() {
            View::Question { question, .. } => Some(question.clone()),
            View::Topic(topic) if self.state.focus == Focus::Main => {
                topic.questions.get(self.state.questions.selected).cloned()
            }
            _ => None,
        }
    }

    fn set_status(&mut self, status: Status) {
        let Some(question) = self.target_question() else {
            self.state.command_line.set_error("Open a question to change its status");
            return;
        };

        if self.controller.set_status(&question.id, status) {
            self.state.command_line.set_message(format!("Saving {}...", question.name));
        } else if self.controller.session().is_none() {
            self.state.command_line.set_error("Not signed in yet");
        } else {
            self.state.command_line.set_error("Progress is still loading");
        }
    }

    fn assist(&mut self, kind: AssistKind) {
        let Some(question) = self.controller.view().question().cloned() else {
            self.state.command_line.set_error("Open a question to ask the assistant");
            return;
        };

        if !self.controller.request_assistance(&question, kind) {
            self.state.command_line.set_error("No such approach");
            return;
        }

        let title = self.controller.assistance_pending().unwrap_or_default().to_string();
        self.state.modal = Some(AiModal::loading(title));
    }

    fn copy_code(&mut self, approach: Option<usize>) {
        let Some(question) = self.controller.view().question().cloned() else {
            self.state.command_line.set_error("Open a question to copy its code");
            return;
        };

        let index = approach.unwrap_or(self.state.question.approach);
        let Some(code) = question.approaches.get(index).map(|a| a.code.trim().to_string()) else {
            self.state.command_line.set_error(format!("No approach {}", index + 1));
            return;
        };

        match self.copy_to_clipboard(code) {
            Ok(()) => {
                self.state.question.approach = index;
                self.state.question.mark_copied(index);
                self.state.command_line.set_message("Copied!");
            }
            Err(e) => {
                tracing::error!("Failed to copy text: {}", e);
                self.state.command_line.set_error(format!("Failed to copy text: {e}"));
            }
        }
    }

    fn reminder(&mut self) {
        let Some(question) = self.target_question() else {
            self.state.command_line.set_error("Open a question to set a reminder");
            return;
        };

        let url = match calendar::reminder_url(&question) {
            Ok(url) => url,
            Err(e) => {
                self.state.command_line.set_error(format!("Could not build reminder link: {e}"));
                return;
            }
        };

        if let Err(e) = calendar::open_in_browser(&url) {
            tracing::warn!("Could not open browser: {}", e);
            match self.copy_to_clipboard(url.to_string()) {
                Ok(()) => {
                    self.state.command_line.set_message(format!("Reminder link copied: {url}"))
                }
                Err(e) => {
                    tracing::warn!("Clipboard unavailable: {}", e);
                    self.state.command_line.set_message(format!("Reminder link: {url}"));
                }
            }
            return;
        }
        self.state.command_line.set_message(format!("Opened reminder for {}", question.name));
    }

    fn copy_to_clipboard(&mut self, text: String) -> Result<()> {
        let clipboard = match self.clipboard.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new()?,
        };
        self.clipboard.insert(clipboard).set_text(text)?;
        Ok(())
    }

    fn execute_command(&mut self, input: &str) {
        let command = match parse_command(input) {
            ParseResult::Ok(command) => command,
            ParseResult::UnknownCommand(cmd) => {
                self.state.command_line.set_error(format!("Unknown command: {cmd}"));
                return;
            }
            ParseResult::MissingArgument(cmd) => {
                self.state.command_line.set_error(format!("{cmd} needs an argument"));
                return;
            }
            ParseResult::InvalidArgument(cmd, arg) => {
                self.state.command_line.set_error(format!("{cmd}: invalid argument '{arg}'"));
                return;
            }
        };

        match command {
            Command::Nop => self.state.command_line.clear_message(),
            Command::Quit => self.state.should_quit = true,
            Command::Help => self.state.show_help = true,
            Command::Dashboard => self.navigate(Navigation::Dashboard),
            Command::Topic(name) => match self.find_topic(&name) {
                Some(topic) => {
                    self.open_topic(topic);
                    self.state.focus = Focus::Main;
                }
                None => self.state.command_line.set_error(format!("No topic named '{name}'")),
            },
            Command::Open(id) => {
                let found = find_question(self.controller.catalog(), &id)
                    .map(|(topic, question)| (topic.clone(), question.clone()));
                match found {
                    Some((topic, question)) => {
                        self.open_topic(topic);
                        self.open_question(question);
                        self.state.focus = Focus::Main;
                    }
                    None => {
                        self.state.command_line.set_error(format!("No question with id '{id}'"))
                    }
                }
            }
            Command::Status(status) => self.set_status(status),
            Command::Hint => self.assist(AssistKind::Hint),
            Command::Explain(index) => {
                let approach = index.unwrap_or(self.state.question.approach);
                self.assist(AssistKind::Explain { approach });
            }
            Command::Suggest => self.assist(AssistKind::Suggest),
            Command::Remind => self.reminder(),
            Command::Copy(index) => self.copy_code(index),
            Command::AiKey(key) => match ApiKeyManager::set_api_key(&key) {
                Ok(()) => self.state.command_line.set_message(format!(
                    "Gemini API key saved ({})",
                    ApiKeyManager::mask_key(key.trim())
                )),
                Err(e) => self.state.command_line.set_error(format!("Could not save key: {e}")),
            },
            Command::AiClear => match ApiKeyManager::delete_api_key() {
                Ok(()) => self.state.command_line.set_message("Gemini API key removed"),
                Err(e) => self.state.command_line.set_error(format!("Could not remove key: {e}")),
            },
        }
    }

    /// Topic by 1-based number, name or document key
    fn find_topic(&self, query: &str) -> Option<Topic> {
        find_topic(self.controller.catalog(), query).cloned()
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

/// Move a list cursor by `delta` rows
fn step(list: &mut state::ListState, delta: isize, len: usize) {
    if len == 0 {
        return;
    }
    list.selected = list.selected.saturating_add_signed(delta).min(len - 1);
    list.ensure_selection_visible();
}

/// Topic by 1-based number, case-insensitive name or document key
pub fn find_topic<'a>(catalog: &'a [Topic], query: &str) -> Option<&'a Topic> {
    let query = query.trim();
    if let Ok(number) = query.parse::<usize>() {
        return number.checked_sub(1).and_then(|index| catalog.get(index));
    }
    catalog.iter().find(|t| t.name.eq_ignore_ascii_case(query) || t.id.eq_ignore_ascii_case(query))
}
