//! Tag flags carried by every to-do item.
//!
//! Tags are a fixed set of independent booleans. `done` drives sorting and
//! list rollover; the rest are categories the user toggles freely.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One named flag on an item.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Hash)]
pub enum Tag {
    Done,
    Pinned,
    Health,
    Project,
    Life,
    Maintenance,
    Entertainment,
}

impl Tag {
    /// Category toggles in the order they are drawn after the item text.
    pub const CATEGORIES: [Tag; 6] = [
        Tag::Pinned,
        Tag::Health,
        Tag::Project,
        Tag::Life,
        Tag::Maintenance,
        Tag::Entertainment,
    ];

    /// Single-letter marker used in compact views.
    pub fn marker(self) -> char {
        match self {
            Tag::Done => 'x',
            Tag::Pinned => 'P',
            Tag::Health => 'H',
            Tag::Project => 'J',
            Tag::Life => 'L',
            Tag::Maintenance => 'M',
            Tag::Entertainment => 'E',
        }
    }
}

/// The full set of flags on one item. Missing fields in stored documents
/// read as `false`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagSet {
    #[serde(default)]
    pub health: bool,
    #[serde(default)]
    pub project: bool,
    #[serde(default)]
    pub life: bool,
    #[serde(default)]
    pub maintenance: bool,
    #[serde(default)]
    pub entertainment: bool,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub done: bool,
}

impl TagSet {
    pub fn get(&self, tag: Tag) -> bool {
        match tag {
            Tag::Done => self.done,
            Tag::Pinned => self.pinned,
            Tag::Health => self.health,
            Tag::Project => self.project,
            Tag::Life => self.life,
            Tag::Maintenance => self.maintenance,
            Tag::Entertainment => self.entertainment,
        }
    }

    pub fn set(&mut self, tag: Tag, value: bool) {
        let slot = match tag {
            Tag::Done => &mut self.done,
            Tag::Pinned => &mut self.pinned,
            Tag::Health => &mut self.health,
            Tag::Project => &mut self.project,
            Tag::Life => &mut self.life,
            Tag::Maintenance => &mut self.maintenance,
            Tag::Entertainment => &mut self.entertainment,
        };
        *slot = value;
    }

    /// Flip one flag, leaving the others untouched.
    pub fn toggle(&mut self, tag: Tag) {
        let current = self.get(tag);
        self.set(tag, !current);
    }

    /// Compact marker string such as `"P.J..."` for the six categories.
    pub fn category_markers(&self) -> String {
        Tag::CATEGORIES
            .iter()
            .map(|&t| if self.get(t) { t.marker() } else { '.' })
            .collect()
    }
}
