//! Enumerations for TUI state management.

use crate::state::FocusTarget;

/// Screen mode for the terminal user interface.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Lists,
    Help,
}

/// The element that currently receives typed input.
///
/// Focusing a list title also makes that list current, so a focused title
/// always belongs to the current list.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Focus {
    ListTitle(usize),
    Item(usize),
    Notes,
}

impl Focus {
    /// Next region in Tab order: titles, items, notes.
    pub fn next_region(self, current_list: usize) -> Focus {
        match self {
            Focus::ListTitle(_) => Focus::Item(0),
            Focus::Item(_) => Focus::Notes,
            Focus::Notes => Focus::ListTitle(current_list),
        }
    }

    /// Previous region in Tab order.
    pub fn prev_region(self, current_list: usize) -> Focus {
        match self {
            Focus::ListTitle(_) => Focus::Notes,
            Focus::Item(_) => Focus::ListTitle(current_list),
            Focus::Notes => Focus::Item(0),
        }
    }
}

impl From<FocusTarget> for Focus {
    fn from(target: FocusTarget) -> Self {
        match target {
            FocusTarget::ListTitle(i) => Focus::ListTitle(i),
            FocusTarget::Item(i) => Focus::Item(i),
        }
    }
}
