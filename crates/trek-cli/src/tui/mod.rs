//! trek TUI
//!
//! Terminal user interface for trek - the journal list with a detail pane.
//!
//! ## Layout
//!
//! Two-pane layout:
//! - Left: Entries, newest first
//! - Right: Detail of the selected entry
//!
//! ## Keys
//!
//! - j/k or ↑/↓: Move selection up/down
//! - g/G: First/last entry
//! - J/K: Scroll the detail pane
//! - a: Add entry
//! - e: Edit title
//! - E: Edit description in $EDITOR
//! - d: Delete entry (asks first)
//! - r: Reload from disk
//! - ?: Help
//! - q: Quit
//!
//! The list reloads whenever the terminal regains focus.

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;
use trek_core::{Config, Confirmation, Journal};

use app::{App, CommandType, InputMode};

use crate::editor;

/// Run the TUI application
pub async fn run(config: Config) -> Result<()> {
    // Initialize TUI logging (file-based, only if TREK_LOG is set)
    init_tui_logging(&config);

    let journal = Journal::open(&config);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableFocusChange)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = App::new();
    app.refresh(&journal).await;

    let result = run_app(&mut terminal, &mut app, &journal).await;

    // Restore terminal
    stdout().execute(DisableFocusChange)?;
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    journal: &Journal,
) -> Result<()> {
    loop {
        // Check for status message timeout
        app.check_status_timeout();

        terminal.draw(|frame| ui::draw(frame, app))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }

        match event::read()? {
            // Surface became active again
            Event::FocusGained => app.refresh(journal).await,
            Event::Key(key) => {
                // Only handle key press events (not release)
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // If error modal is showing, any key dismisses it
                if app.has_error() {
                    app.clear_error();
                    continue;
                }

                // If help is showing, any key dismisses it
                if app.show_help {
                    app.show_help = false;
                    continue;
                }

                match app.input_mode {
                    InputMode::Normal => {
                        if handle_normal_mode(app, journal, key).await == Some(Action::EditDescription)
                        {
                            edit_description(terminal, app, journal).await?;
                        }
                    }
                    InputMode::Command => handle_command_mode(app, journal, key).await,
                    InputMode::ConfirmDelete => handle_confirm_mode(app, journal, key.code).await,
                }
            }
            _ => {}
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Work that needs the terminal itself
#[derive(Debug, PartialEq, Eq)]
enum Action {
    EditDescription,
}

/// Handle key events in normal mode
async fn handle_normal_mode(app: &mut App, journal: &Journal, key: KeyEvent) -> Option<Action> {
    match key.code {
        // Quit
        KeyCode::Char('q') | KeyCode::Esc => {
            app.should_quit = true;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        // Navigation
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('g') | KeyCode::Home => app.move_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.move_to_bottom(),
        KeyCode::Char('J') | KeyCode::PageDown => app.scroll_detail_down(),
        KeyCode::Char('K') | KeyCode::PageUp => app.scroll_detail_up(),

        // Command shortcuts
        KeyCode::Char('a') => app.enter_command_mode(CommandType::Add),
        KeyCode::Char('e') => app.enter_command_mode(CommandType::EditTitle),
        KeyCode::Char('E') => {
            if app.selected_entry().is_some() {
                return Some(Action::EditDescription);
            }
            app.set_status("No entry selected");
        }
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('r') => {
            app.refresh(journal).await;
            app.set_status("Reloaded");
        }
        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }

    None
}

/// Handle key events while typing into the command line
async fn handle_command_mode(app: &mut App, journal: &Journal, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_command_mode(),
        KeyCode::Enter => app.submit_command(journal).await,
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

async fn handle_confirm_mode(app: &mut App, journal: &Journal, code: KeyCode) {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.answer_delete(journal, Confirmation::Confirm).await;
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.answer_delete(journal, Confirmation::Cancel).await;
        }
        _ => {}
    }
}

/// Suspend the TUI, edit the description in $EDITOR, then save it
async fn edit_description<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    journal: &Journal,
) -> Result<()> {
    let Some(entry) = app.selected_entry() else {
        return Ok(());
    };
    let (title, current) = (entry.title.clone(), entry.description.clone());

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    let edited = editor::edit_description(&title, &current);

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    terminal.clear()?;

    match edited {
        Ok(description) => app.save_description(journal, description).await,
        Err(e) => app.set_error(format!("Editor failed: {}", e)),
    }

    Ok(())
}

/// Initialize file-based logging for the TUI
///
/// Only logs if TREK_LOG environment variable is set.
/// Logs to config.log_file or data_dir/debug.log
fn init_tui_logging(config: &Config) {
    let Ok(log_level) = std::env::var("TREK_LOG") else {
        return;
    };

    let log_path = config.log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!("trek_core={},trek={}", log_level, log_level));

    // Initialize file-based logging (ignore error if already initialized)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}
