//! To-do list and item data structures.
//!
//! This module defines the `TodoList` and `TodoItem` structs that make up the
//! persisted document, along with the date-based title new lists receive.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::fields::TagSet;

/// A single entry: free text plus its tag flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoItem {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tags: TagSet,
}

impl TodoItem {
    /// A blank item with every tag cleared.
    pub fn blank() -> Self {
        TodoItem::with_text("")
    }

    /// Create an item with the given text and no tags.
    pub fn with_text(text: &str) -> Self {
        TodoItem {
            text: text.to_string(),
            tags: TagSet::default(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.tags.done
    }
}

/// A named, ordered collection of items plus free-form notes.
///
/// The id is stored under `ID` so documents written by earlier versions of
/// the program load unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoList {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub items: Vec<TodoItem>,
    #[serde(default)]
    pub notes: String,
}

impl TodoList {
    /// An empty list with the given id and title.
    pub fn new(id: u64, title: &str) -> Self {
        TodoList {
            id,
            title: title.to_string(),
            items: Vec::new(),
            notes: String::new(),
        }
    }

    /// Index of the first done item, if any.
    pub fn first_done_index(&self) -> Option<usize> {
        self.items.iter().position(|item| item.is_done())
    }

    /// Number of items not yet done.
    pub fn open_count(&self) -> usize {
        self.items.iter().filter(|item| !item.is_done()).count()
    }
}

/// Format a date the way list titles are written, e.g. `SUN 2026/10/18`.
pub fn date_title(date: NaiveDate) -> String {
    let weekday = date.format("%a").to_string().to_uppercase();
    format!("{} {}/{}/{}", weekday, date.year(), date.month(), date.day())
}

/// Title for a list created today.
pub fn today_title() -> String {
    date_title(Local::now().date_naive())
}
