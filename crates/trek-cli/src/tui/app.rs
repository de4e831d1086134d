//! Application state and logic

use std::cell::RefCell;
use std::time::{Duration, Instant};

use trek_core::{
    Confirmation, Entry, EntryForm, EntryListView, Journal, JournalError, Notice, NoticeLevel,
    Notifier,
};

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Typing into the command line
    Command,
    /// Waiting for y/n on a delete
    ConfirmDelete,
}

/// What the command line is collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    /// Title of a new entry
    Add,
    /// New title for the selected entry
    EditTitle,
}

impl CommandType {
    pub fn prompt(self) -> &'static str {
        match self {
            CommandType::Add => "New entry: ",
            CommandType::EditTitle => "Title: ",
        }
    }
}

/// Keeps the last notice raised while saving
#[derive(Default)]
struct NoticeSlot(RefCell<Option<Notice>>);

impl NoticeSlot {
    fn take(&self) -> Option<Notice> {
        self.0.borrow_mut().take()
    }
}

impl Notifier for NoticeSlot {
    fn notify(&self, notice: Notice) {
        *self.0.borrow_mut() = Some(notice);
    }
}

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Type of command being entered
    pub command_type: Option<CommandType>,
    /// Command input buffer
    pub command_input: String,
    /// Cursor position in command input, in characters
    pub command_cursor: usize,
    /// Entries shown in the list
    pub view: EntryListView,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Error shown in a modal until a key is pressed
    pub error_message: Option<String>,
    /// Whether help overlay is visible
    pub show_help: bool,
    /// Scroll offset for detail pane
    pub detail_scroll: u16,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            command_type: None,
            command_input: String::new(),
            command_cursor: 0,
            view: EntryListView::new(),
            status_message: None,
            status_message_time: None,
            error_message: None,
            show_help: false,
            detail_scroll: 0,
        }
    }

    /// Reload entries from the journal
    pub async fn refresh(&mut self, journal: &Journal) {
        if let Err(e) = self.view.refresh(journal).await {
            self.show_error(&e);
        }
    }

    // ==================== Messages ====================

    /// Set a status message (auto-dismisses after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > Duration::from_secs(3) {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    fn show_error(&mut self, error: &JournalError) {
        match error.recovery_suggestion() {
            Some(hint) => self.set_error(format!("{}\n\n{}", error, hint)),
            None => self.set_error(error.to_string()),
        }
    }

    fn show_notice(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => self.set_status(notice.title),
            NoticeLevel::Failure => match notice.detail {
                Some(detail) => self.set_error(format!("{}: {}", notice.title, detail)),
                None => self.set_error(notice.title),
            },
        }
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    // ==================== Navigation ====================

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.view.selected()
    }

    pub fn move_up(&mut self) {
        self.view.select_prev();
        self.detail_scroll = 0;
    }

    pub fn move_down(&mut self) {
        self.view.select_next();
        self.detail_scroll = 0;
    }

    pub fn move_to_top(&mut self) {
        self.view.select_first();
        self.detail_scroll = 0;
    }

    pub fn move_to_bottom(&mut self) {
        self.view.select_last();
        self.detail_scroll = 0;
    }

    pub fn scroll_detail_down(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_add(1);
    }

    pub fn scroll_detail_up(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
    }

    // ==================== Command line ====================

    /// Open the command line; editing starts from the current title
    pub fn enter_command_mode(&mut self, command: CommandType) {
        let initial = match command {
            CommandType::Add => String::new(),
            CommandType::EditTitle => match self.selected_entry() {
                Some(entry) => entry.title.clone(),
                None => {
                    self.set_status("No entry selected");
                    return;
                }
            },
        };

        self.command_cursor = initial.chars().count();
        self.command_input = initial;
        self.command_type = Some(command);
        self.input_mode = InputMode::Command;
    }

    pub fn exit_command_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command_type = None;
        self.command_input.clear();
        self.command_cursor = 0;
    }

    /// Insert character at cursor
    pub fn insert_char(&mut self, c: char) {
        let index = self.byte_index();
        self.command_input.insert(index, c);
        self.command_cursor += 1;
    }

    /// Delete character before cursor
    pub fn delete_char(&mut self) {
        if self.command_cursor > 0 {
            self.command_cursor -= 1;
            let index = self.byte_index();
            self.command_input.remove(index);
        }
    }

    pub fn cursor_left(&mut self) {
        self.command_cursor = self.command_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.command_cursor < self.command_input.chars().count() {
            self.command_cursor += 1;
        }
    }

    fn byte_index(&self) -> usize {
        self.command_input
            .char_indices()
            .nth(self.command_cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.command_input.len())
    }

    /// Save what the command line holds
    ///
    /// The command line stays open when saving fails so the input is not
    /// lost.
    pub async fn submit_command(&mut self, journal: &Journal) {
        let Some(command) = self.command_type else {
            self.exit_command_mode();
            return;
        };

        let mut form = match command {
            CommandType::Add => EntryForm::new(),
            CommandType::EditTitle => match self.selected_form() {
                Some(form) => form,
                None => {
                    self.exit_command_mode();
                    return;
                }
            },
        };
        form.title = self.command_input.clone();

        if self.save(journal, &form).await {
            self.exit_command_mode();
        }
    }

    /// Replace the selected entry's description
    pub async fn save_description(&mut self, journal: &Journal, description: String) {
        let Some(mut form) = self.selected_form() else {
            return;
        };
        if form.description == description {
            self.set_status("No changes");
            return;
        }
        form.description = description;
        self.save(journal, &form).await;
    }

    fn selected_form(&self) -> Option<EntryForm> {
        let id = self.selected_entry()?.id.clone();
        self.view.begin_edit(&id)
    }

    async fn save(&mut self, journal: &Journal, form: &EntryForm) -> bool {
        let notices = NoticeSlot::default();
        let saved = form.submit(journal, &notices).await;

        let ok = match saved {
            Ok(entry) if form.editing_id().is_some() => {
                self.view.apply_updated(entry);
                true
            }
            Ok(entry) => {
                self.view.apply_created(entry);
                true
            }
            Err(_) => false,
        };

        if let Some(notice) = notices.take() {
            self.show_notice(notice);
        }
        ok
    }

    // ==================== Delete ====================

    /// Ask to delete the selected entry
    pub fn request_delete(&mut self) {
        let Some(id) = self.selected_entry().map(|e| e.id.clone()) else {
            self.set_status("No entry selected");
            return;
        };

        if self.view.request_delete(&id).is_some() {
            self.input_mode = InputMode::ConfirmDelete;
        }
    }

    /// Title of the entry awaiting confirmation
    pub fn pending_delete_title(&self) -> Option<&str> {
        self.view.pending_delete().map(|e| e.title.as_str())
    }

    pub async fn answer_delete(&mut self, journal: &Journal, answer: Confirmation) {
        self.input_mode = InputMode::Normal;

        match self.view.resolve_delete(journal, answer).await {
            Ok(Some(removed)) => self.set_status(format!("Deleted: {}", removed.title)),
            Ok(None) => self.set_status("Cancelled"),
            Err(e) => self.show_error(&e),
        }
    }
}
