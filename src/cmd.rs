//! Command implementations for the CLI interface.
//!
//! Every subcommand loads the data file, runs the same state commands the
//! interactive UI uses, and writes the result back. Without `--list` a
//! command acts on the first list, which is the list the UI opens on.

use std::path::Path;
use std::time::Duration;

use clap::Subcommand;
use clap_complete::{generate, Shell};
use log::info;

use crate::fields::Tag;
use crate::state::{AppState, Command, FocusTarget, Position};
use crate::store::{create_backup, Store};
use crate::todo::{today_title, TodoItem, TodoList};
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI (the default).
    Ui,

    /// List all to-do lists.
    Lists,

    /// Show the items and notes of one list.
    Show {
        /// List ID (defaults to the first list).
        #[arg(long)]
        list: Option<u64>,
    },

    /// Add an item before the first done item.
    Add {
        /// Item text.
        text: String,
        /// Tag to set on the new item. May be repeated.
        #[arg(long = "tag", value_enum)]
        tags: Vec<Tag>,
        /// List ID (defaults to the first list).
        #[arg(long)]
        list: Option<u64>,
    },

    /// Toggle the done flag of an item.
    Done {
        /// Item number as printed by `show` (starting at 1).
        index: usize,
        #[arg(long)]
        list: Option<u64>,
    },

    /// Delete an item.
    Rm {
        /// Item number as printed by `show` (starting at 1).
        index: usize,
        #[arg(long)]
        list: Option<u64>,
    },

    /// Start a new list for today, carrying over open items and notes.
    NewList,

    /// Delete a list. The last remaining list is cleared instead.
    DeleteList {
        #[arg(long)]
        list: Option<u64>,
    },

    /// Move done items below open ones.
    Sort {
        #[arg(long)]
        list: Option<u64>,
    },

    /// Create a timestamped backup of the data file.
    Backup,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the TUI interface.
pub fn cmd_ui(db_path: &Path, poll_interval: Duration) {
    if let Err(e) = run_tui(db_path, poll_interval) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

/// Print every list with its open/total item counts.
pub fn cmd_lists(state: &AppState) {
    println!("{:<5} {:<24} {}", "ID", "Title", "Open/Total");
    for list in state.lists() {
        println!(
            "{:<5} {:<24} {}/{}",
            list.id,
            truncate(display_title(list), 24),
            list.open_count(),
            list.items.len()
        );
    }
}

/// Print one list's items and notes.
pub fn cmd_show(state: &mut AppState, list: Option<u64>) {
    exit_on_err(select_list(state, list));
    print!("{}", format_list(state.current_list()));
}

/// Add an item with the given text and tags.
pub fn cmd_add(store: &mut Store, state: &mut AppState, text: String, tags: Vec<Tag>, list: Option<u64>) {
    exit_on_err(select_list(state, list));
    let index = add_item(state, text, &tags);
    save_or_exit(store, state);
    println!("Added item {} to {}", index + 1, display_title(state.current_list()));
}

/// Toggle the done flag on an item.
pub fn cmd_done(store: &mut Store, state: &mut AppState, index: usize, list: Option<u64>) {
    exit_on_err(select_list(state, list));
    let idx = exit_on_err(item_index(state, index));
    state.apply(Command::ToggleTag(idx, Tag::Done));
    save_or_exit(store, state);
    let item = &state.current_list().items[idx];
    let status = if item.is_done() { "done" } else { "open" };
    println!("Item {} is now {}: {}", index, status, item.text);
}

/// Delete an item.
pub fn cmd_rm(store: &mut Store, state: &mut AppState, index: usize, list: Option<u64>) {
    exit_on_err(select_list(state, list));
    let idx = exit_on_err(item_index(state, index));
    let text = state.current_list().items[idx].text.clone();
    state.apply(Command::DeleteTodo(idx));
    save_or_exit(store, state);
    println!("Deleted item {}: {}", index, text);
}

/// Start a new list titled with today's date.
pub fn cmd_new_list(store: &mut Store, state: &mut AppState) {
    state.apply(Command::NewList { title: today_title() });
    save_or_exit(store, state);
    let list = state.current_list();
    println!(
        "Created list {} '{}' with {} open items carried over",
        list.id,
        list.title,
        list.items.len()
    );
}

/// Delete (or clear, if it is the only one) a list.
pub fn cmd_delete_list(store: &mut Store, state: &mut AppState, list: Option<u64>) {
    exit_on_err(select_list(state, list));
    let id = state.current_list_id();
    let was_last = state.lists().len() == 1;
    state.apply(Command::DeleteList);
    save_or_exit(store, state);
    if was_last {
        println!("Cleared list {} (the last list is never removed)", id);
    } else {
        println!("Deleted list {}", id);
    }
}

/// Sort a list so open items come first.
pub fn cmd_sort(store: &mut Store, state: &mut AppState, list: Option<u64>) {
    exit_on_err(select_list(state, list));
    state.apply(Command::Sort);
    save_or_exit(store, state);
    print!("{}", format_list(state.current_list()));
}

/// Back up the data file.
pub fn cmd_backup(db_path: &Path) {
    match create_backup(db_path) {
        Ok(backup_path) => {
            info!("Backup written to {}", backup_path.display());
            println!("Backup created: {}", backup_path.display());
        }
        Err(e) => {
            eprintln!("Failed to create backup: {}", e);
            std::process::exit(1);
        }
    }
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

/// Make `list` (or the first list) current.
pub fn select_list(state: &mut AppState, list: Option<u64>) -> Result<(), String> {
    let id = match list {
        Some(id) => id,
        None => state.lists()[0].id,
    };
    if !state.lists().iter().any(|l| l.id == id) {
        return Err(format!("No list with ID {}", id));
    }
    state.apply(Command::SelectList(id));
    Ok(())
}

/// Convert a 1-based item number into an index into the current list.
pub fn item_index(state: &AppState, number: usize) -> Result<usize, String> {
    let len = state.current_list().items.len();
    if number == 0 || number > len {
        return Err(format!("Item {} not found (list has {} items)", number, len));
    }
    Ok(number - 1)
}

/// Insert an item before the first done one and fill it in. Returns its index.
pub fn add_item(state: &mut AppState, text: String, tags: &[Tag]) -> usize {
    let index = match state.apply(Command::NewTodo(Position::BeforeFirstDone)).focus {
        Some(FocusTarget::Item(i)) => i,
        _ => state.current_list().items.len() - 1,
    };
    state.apply(Command::EditText { index, text });
    for &tag in tags {
        if !state.current_list().items[index].tags.get(tag) {
            state.apply(Command::ToggleTag(index, tag));
        }
    }
    index
}

/// Render a list as plain text for the terminal.
pub fn format_list(list: &TodoList) -> String {
    let mut out = format!(
        "List {}: {} ({}/{} open)\n",
        list.id,
        display_title(list),
        list.open_count(),
        list.items.len()
    );
    for (i, item) in list.items.iter().enumerate() {
        out.push_str(&format_item(i + 1, item));
        out.push('\n');
    }
    if !list.notes.is_empty() {
        out.push_str("Notes:\n");
        for line in list.notes.lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

fn format_item(number: usize, item: &TodoItem) -> String {
    let check = if item.is_done() { "[x]" } else { "[ ]" };
    format!("{:>3} {} {} {}", number, check, item.tags.category_markers(), item.text)
}

fn display_title(list: &TodoList) -> &str {
    if list.title.is_empty() {
        "(untitled)"
    } else {
        &list.title
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

fn exit_on_err<T>(result: Result<T, String>) -> T {
    result.unwrap_or_else(|e| {
        eprintln!("{e}");
        std::process::exit(1);
    })
}

fn save_or_exit(store: &mut Store, state: &AppState) {
    if let Err(e) = store.save(state) {
        eprintln!("Failed to save {}: {e}", store.path().display());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        let mut list = TodoList::new(2, "MON 2024/1/1");
        list.items.push(TodoItem::with_text("open"));
        let mut done = TodoItem::with_text("finished");
        done.tags.done = true;
        list.items.push(done);
        AppState::from_lists(vec![list, TodoList::new(1, "older")]).unwrap()
    }

    #[test]
    fn test_add_item_goes_before_done_with_tags() {
        let mut state = state();
        let idx = add_item(&mut state, "new".into(), &[Tag::Pinned, Tag::Life, Tag::Pinned]);
        assert_eq!(idx, 1);
        let item = &state.current_list().items[1];
        assert_eq!(item.text, "new");
        assert!(item.tags.pinned && item.tags.life && !item.tags.done);
    }

    #[test]
    fn test_select_list_by_id() {
        let mut state = state();
        assert!(select_list(&mut state, Some(1)).is_ok());
        assert_eq!(state.current_list().title, "older");
        assert!(select_list(&mut state, Some(99)).is_err());
        assert!(select_list(&mut state, None).is_ok());
        assert_eq!(state.current_list_id(), 2);
    }

    #[test]
    fn test_item_index_is_one_based() {
        let state = state();
        assert_eq!(item_index(&state, 1), Ok(0));
        assert!(item_index(&state, 0).is_err());
        assert!(item_index(&state, 3).is_err());
    }

    #[test]
    fn test_format_list() {
        let mut state = state();
        state.apply(Command::EditNotes { list_id: 2, notes: "a\nb".into() });
        let text = format_list(state.current_list());
        assert_eq!(
            text,
            "List 2: MON 2024/1/1 (1/2 open)\n  1 [ ] ...... open\n  2 [x] ...... finished\nNotes:\n  a\n  b\n"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title", 6), "a lon…");
    }
}
