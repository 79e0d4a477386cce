//! Main application logic for the terminal user interface.
//!
//! `App` owns the state model and the store. Key events are mapped to
//! [`Command`]s, applied to the state, persisted, and the view is rebuilt
//! according to the transition each command reports. Changes written to the
//! data file by other running instances are picked up between key presses.

use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{error, info, warn};
use ratatui::{backend::Backend, Terminal};

use crate::fields::Tag;
use crate::state::{AppState, Command, Direction, Position, Render};
use crate::store::{parse_lists, Store};
use crate::todo::today_title;
use crate::tui::{
    enums::{Focus, Mode},
    input::InputField,
    view::{self, ViewModel},
};

/// Main application state for the terminal user interface.
pub struct App {
    state: AppState,
    store: Store,
    focus: Focus,
    editor: InputField,
    mode: Mode,
    status_message: String,
    poll_interval: Duration,
    last_poll: Instant,
    should_quit: bool,
}

impl App {
    /// Create a new App, loading the lists from the specified path.
    pub fn new(db_path: &Path, poll_interval: Duration) -> Self {
        let mut store = Store::new(db_path);
        let state = store.load();
        Self::with_state(store, state, poll_interval)
    }

    /// Create an App around an already loaded state.
    pub fn with_state(store: Store, state: AppState, poll_interval: Duration) -> Self {
        let mut app = App {
            state,
            store,
            focus: Focus::Item(0),
            editor: InputField::new(),
            mode: Mode::Lists,
            status_message: String::new(),
            poll_interval,
            last_poll: Instant::now(),
            should_quit: false,
        };
        app.rebuild(false);
        app
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Set a status message to display in the status bar.
    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    /// Apply a command, persist if asked, and follow the requested focus.
    fn execute(&mut self, command: Command) {
        let transition = self.state.apply(command);
        if transition.persist {
            if let Err(e) = self.store.save(&self.state) {
                error!("Failed to save {}: {e}", self.store.path().display());
                self.set_status_message(format!("Save failed: {e}"));
            }
        }
        let previous = self.focus;
        if let Some(target) = transition.focus {
            self.focus = target.into();
        }
        match transition.render {
            Render::Full => self.rebuild(self.focus == previous),
            Render::None if self.focus != previous => self.rebuild(false),
            Render::None | Render::Silent => {}
        }
    }

    /// Rebuild view-side state from the model: clamp focus to what exists
    /// and reload the editor with the focused field's stored text.
    fn rebuild(&mut self, keep_cursor: bool) {
        let item_count = self.state.current_list().items.len();
        self.focus = match self.focus {
            Focus::ListTitle(_) => Focus::ListTitle(self.state.current_index()),
            Focus::Item(i) => Focus::Item(i.min(item_count.saturating_sub(1))),
            Focus::Notes => Focus::Notes,
        };
        let text = self.focused_text().unwrap_or_default();
        if keep_cursor {
            self.editor.reset_keep_cursor(&text);
        } else {
            self.editor = InputField::with_value(&text);
        }
    }

    /// Stored text of the focused field, `None` when an empty item list has focus.
    fn focused_text(&self) -> Option<String> {
        let list = self.state.current_list();
        match self.focus {
            Focus::ListTitle(_) => Some(list.title.clone()),
            Focus::Item(i) => list.items.get(i).map(|item| item.text.clone()),
            Focus::Notes => Some(list.notes.clone()),
        }
    }

    fn focused_item(&self) -> Option<usize> {
        match self.focus {
            Focus::Item(i) if i < self.state.current_list().items.len() => Some(i),
            _ => None,
        }
    }

    /// Move focus without mutating anything.
    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.rebuild(false);
    }

    /// Replace the local lists with a collection written by another instance.
    pub fn handle_external_change(&mut self, raw: &str) {
        match parse_lists(raw) {
            Ok(lists) => {
                if self.state.replace_lists(lists) {
                    info!("Reloaded lists changed by another instance");
                    self.rebuild(true);
                    self.set_status_message("Reloaded changes from another window".to_string());
                }
            }
            Err(e) => {
                warn!("Ignoring external change: {e}");
                self.set_status_message(format!("Ignored unreadable change on disk: {e}"));
            }
        }
    }

    fn poll_store(&mut self) {
        if self.last_poll.elapsed() < self.poll_interval {
            return;
        }
        self.last_poll = Instant::now();
        if let Some(raw) = self.store.poll_external_change() {
            self.handle_external_change(&raw);
        }
    }

    /// Route one key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        self.status_message.clear();

        if self.mode == Mode::Help {
            self.mode = Mode::Lists;
            return;
        }

        if self.handle_global_key(key) {
            return;
        }

        match self.focus {
            Focus::ListTitle(i) => self.handle_title_key(i, key),
            Focus::Item(_) => self.handle_item_key(key),
            Focus::Notes => self.handle_notes_key(key),
        }
    }

    /// Keys that act regardless of focus. Returns true when consumed.
    fn handle_global_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('q') | KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::F(1) => self.mode = Mode::Help,
            KeyCode::Char('n') if ctrl => {
                self.execute(Command::NewList { title: today_title() });
            }
            KeyCode::Char('d') if ctrl => {
                self.execute(Command::DeleteList);
            }
            KeyCode::Char('s') if ctrl => {
                self.execute(Command::Sort);
            }
            KeyCode::Char('t') if ctrl => {
                self.execute(Command::NewTodo(Position::BeforeFirstDone));
            }
            KeyCode::Tab => {
                let next = self.focus.next_region(self.state.current_index());
                self.set_focus(next);
            }
            KeyCode::BackTab => {
                let prev = self.focus.prev_region(self.state.current_index());
                self.set_focus(prev);
            }
            KeyCode::Char(c @ '1'..='6') if alt => {
                let tag = Tag::CATEGORIES[c as usize - '1' as usize];
                if let Some(i) = self.focused_item() {
                    self.execute(Command::ToggleTag(i, tag));
                }
            }
            _ => return false,
        }
        true
    }

    /// Shared line editing. Returns true when the editor value changed.
    fn edit_text(&mut self, key: KeyEvent, multiline: bool) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char(c) if !ctrl => {
                self.editor.handle_char(c);
                true
            }
            KeyCode::Enter if multiline => {
                self.editor.handle_char('\n');
                true
            }
            KeyCode::Backspace => {
                self.editor.handle_backspace();
                true
            }
            KeyCode::Delete => {
                self.editor.handle_delete();
                true
            }
            KeyCode::Left => {
                self.editor.move_cursor_left();
                false
            }
            KeyCode::Right => {
                self.editor.move_cursor_right();
                false
            }
            KeyCode::Home => {
                self.editor.move_home();
                false
            }
            KeyCode::End => {
                self.editor.move_end();
                false
            }
            KeyCode::Up if multiline => {
                self.editor.move_up();
                false
            }
            KeyCode::Down if multiline => {
                self.editor.move_down();
                false
            }
            _ => false,
        }
    }

    fn handle_title_key(&mut self, index: usize, key: KeyEvent) {
        let count = self.state.lists().len();
        match key.code {
            KeyCode::Up | KeyCode::Down => {
                let next = match key.code {
                    KeyCode::Up => (index + count - 1) % count,
                    _ => (index + 1) % count,
                };
                let id = self.state.lists()[next].id;
                self.execute(Command::SelectList(id));
                self.set_focus(Focus::ListTitle(next));
            }
            KeyCode::Enter => self.set_focus(Focus::Item(0)),
            _ => {
                if self.edit_text(key, false) {
                    let list_id = self.state.current_list_id();
                    let title = self.editor.value.clone();
                    self.execute(Command::Rename { list_id, title });
                }
            }
        }
    }

    fn handle_item_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let Some(index) = self.focused_item() else {
            if key.code == KeyCode::Enter {
                self.execute(Command::NewTodo(Position::Index(0)));
            }
            return;
        };

        match key.code {
            KeyCode::Enter => {
                self.execute(Command::NewTodo(Position::Index(index + 1)));
            }
            // Terminals report Ctrl+Space either as a control-modified space or as NUL.
            KeyCode::Char(' ') if ctrl => self.toggle_done(index),
            KeyCode::Null => self.toggle_done(index),
            KeyCode::Delete if ctrl => {
                self.execute(Command::DeleteTodo(index));
            }
            KeyCode::Backspace if self.editor.value.is_empty() => {
                self.execute(Command::DeleteTodo(index));
                self.set_focus(Focus::Item(index.saturating_sub(1)));
            }
            KeyCode::Up | KeyCode::Down => {
                let direction = if key.code == KeyCode::Up { Direction::Up } else { Direction::Down };
                self.execute(Command::Reorder { index, direction, swap: ctrl });
            }
            _ => {
                if self.edit_text(key, false) {
                    let text = self.editor.value.clone();
                    self.execute(Command::EditText { index, text });
                }
            }
        }
    }

    fn toggle_done(&mut self, index: usize) {
        self.execute(Command::ToggleTag(index, Tag::Done));
    }

    fn handle_notes_key(&mut self, key: KeyEvent) {
        if self.edit_text(key, true) {
            let list_id = self.state.current_list_id();
            let notes = self.editor.value.clone();
            self.execute(Command::EditNotes { list_id, notes });
        }
    }

    /// Poll for and handle keyboard events.
    fn handle_input(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                self.handle_key(key);
            }
        }
        Ok(())
    }

    /// Main event loop for the TUI application.
    ///
    /// Handles rendering, input and external changes until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        info!("Opened {} ({} lists)", self.store.path().display(), self.state.lists().len());
        loop {
            terminal.draw(|f| {
                let model = ViewModel {
                    state: &self.state,
                    focus: self.focus,
                    editor: &self.editor,
                    mode: self.mode,
                    status: &self.status_message,
                };
                view::draw(f, &model);
            })?;

            self.handle_input()?;
            if self.should_quit {
                break;
            }
            self.poll_store();
        }
        Ok(())
    }
}
