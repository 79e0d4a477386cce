//! Application state and the commands that transform it.
//!
//! `AppState` owns every list, item and tag. It is only changed through
//! [`AppState::apply`], which takes a [`Command`] and reports back a
//! [`Transition`]: whether the result must be written to disk, whether the
//! view has to be rebuilt, and which element should receive focus. Nothing
//! here touches the terminal or the file system, so every operation can be
//! exercised directly in tests.

use crate::fields::Tag;
use crate::todo::{TodoItem, TodoList};

/// Where a new item is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Insert at this index, clamped to the end of the list.
    Index(usize),
    /// Insert before the first done item, or at the end if none is done.
    BeforeFirstDone,
}

/// Direction for moving focus or swapping items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Every mutation the program can perform on the state model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    NewList { title: String },
    DeleteList,
    SelectList(u64),
    NewTodo(Position),
    DeleteTodo(usize),
    ToggleTag(usize, Tag),
    Reorder { index: usize, direction: Direction, swap: bool },
    Sort,
    Rename { list_id: u64, title: String },
    EditNotes { list_id: u64, notes: String },
    EditText { index: usize, text: String },
}

/// Element that should hold input focus after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    ListTitle(usize),
    Item(usize),
}

/// How much of the view a command invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Render {
    /// Nothing changed.
    None,
    /// Field text changed in place; the editor already shows it.
    Silent,
    /// Structure changed; rebuild every region from state.
    Full,
}

/// Outcome of applying one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub persist: bool,
    pub render: Render,
    pub focus: Option<FocusTarget>,
}

impl Transition {
    fn unchanged() -> Self {
        Transition { persist: false, render: Render::None, focus: None }
    }

    fn structural(focus: Option<FocusTarget>) -> Self {
        Transition { persist: true, render: Render::Full, focus }
    }

    fn silent() -> Self {
        Transition { persist: true, render: Render::Silent, focus: None }
    }
}

/// In-memory model: the list collection, the current list, and the id counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    lists: Vec<TodoList>,
    current_list_id: u64,
    next_id: u64,
}

impl AppState {
    /// A fresh state holding one empty list with id 0.
    pub fn seed(title: &str) -> Self {
        AppState {
            lists: vec![TodoList::new(0, title)],
            current_list_id: 0,
            next_id: 1,
        }
    }

    /// Build a state from a loaded collection, selecting the first list.
    ///
    /// Returns `None` for an empty collection, or when no id is left above
    /// the largest one in use.
    pub fn from_lists(lists: Vec<TodoList>) -> Option<Self> {
        let first = lists.first()?.id;
        let next_id = next_id_for(&lists)?;
        Some(AppState { lists, current_list_id: first, next_id })
    }

    pub fn lists(&self) -> &[TodoList] {
        &self.lists
    }

    pub fn current_list_id(&self) -> u64 {
        self.current_list_id
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Position of the current list in the collection.
    pub fn current_index(&self) -> usize {
        self.index_of(self.current_list_id)
            .expect("current list id must name a list in the collection")
    }

    pub fn current_list(&self) -> &TodoList {
        &self.lists[self.current_index()]
    }

    fn current_list_mut(&mut self) -> &mut TodoList {
        let idx = self.current_index();
        &mut self.lists[idx]
    }

    fn index_of(&self, id: u64) -> Option<usize> {
        self.lists.iter().position(|l| l.id == id)
    }

    /// Replace the collection wholesale with one written elsewhere.
    ///
    /// The current selection survives if its id still exists, otherwise the
    /// first list becomes current. An empty collection, or one whose ids are
    /// exhausted, is rejected and the state is left untouched.
    pub fn replace_lists(&mut self, lists: Vec<TodoList>) -> bool {
        let Some(current) = reconcile_selection(self.current_list_id, &lists) else {
            return false;
        };
        let Some(next_id) = next_id_for(&lists) else {
            return false;
        };
        self.next_id = next_id;
        self.lists = lists;
        self.current_list_id = current;
        self.check_invariants();
        true
    }

    /// Apply one command and report what the caller has to do next.
    pub fn apply(&mut self, command: Command) -> Transition {
        let transition = match command {
            Command::NewList { title } => self.new_list(title),
            Command::DeleteList => self.delete_list(),
            Command::SelectList(id) => self.select_list(id),
            Command::NewTodo(position) => self.new_todo(position),
            Command::DeleteTodo(index) => self.delete_todo(index),
            Command::ToggleTag(index, tag) => self.toggle_tag(index, tag),
            Command::Reorder { index, direction, swap } => self.reorder(index, direction, swap),
            Command::Sort => self.sort(),
            Command::Rename { list_id, title } => match self.index_of(list_id) {
                Some(idx) => {
                    self.lists[idx].title = title;
                    Transition::silent()
                }
                None => Transition::unchanged(),
            },
            Command::EditNotes { list_id, notes } => match self.index_of(list_id) {
                Some(idx) => {
                    self.lists[idx].notes = notes;
                    Transition::silent()
                }
                None => Transition::unchanged(),
            },
            Command::EditText { index, text } => match self.current_list_mut().items.get_mut(index) {
                Some(item) => {
                    item.text = text;
                    Transition::silent()
                }
                None => Transition::unchanged(),
            },
        };
        self.check_invariants();
        transition
    }

    /// The collection is never empty and the current id always resolves.
    pub fn check_invariants(&self) {
        assert!(!self.lists.is_empty(), "list collection must never be empty");
        assert!(
            self.index_of(self.current_list_id).is_some(),
            "current list id {} is not in the collection",
            self.current_list_id
        );
    }

    fn new_list(&mut self, title: String) -> Transition {
        let Some(after) = self.next_id.checked_add(1) else {
            return Transition::unchanged();
        };
        let template = &self.lists[0];
        // Cloning the items gives each carried-over entry its own tag set.
        let items: Vec<TodoItem> = template
            .items
            .iter()
            .filter(|item| !item.is_done())
            .cloned()
            .collect();
        let list = TodoList {
            id: self.next_id,
            title,
            items,
            notes: template.notes.clone(),
        };
        self.next_id = after;
        self.current_list_id = list.id;
        self.lists.insert(0, list);
        Transition::structural(Some(FocusTarget::ListTitle(0)))
    }

    fn delete_list(&mut self) -> Transition {
        if self.lists.len() == 1 {
            let list = &mut self.lists[0];
            list.title.clear();
            list.items.clear();
            list.notes.clear();
            return Transition::structural(Some(FocusTarget::ListTitle(0)));
        }
        let pos = self.current_index();
        self.lists.remove(pos);
        let next = pos.min(self.lists.len() - 1);
        self.current_list_id = self.lists[next].id;
        Transition::structural(None)
    }

    fn select_list(&mut self, id: u64) -> Transition {
        if id == self.current_list_id || self.index_of(id).is_none() {
            return Transition::unchanged();
        }
        self.current_list_id = id;
        Transition { persist: false, render: Render::Full, focus: None }
    }

    fn new_todo(&mut self, position: Position) -> Transition {
        let list = self.current_list_mut();
        let index = match position {
            Position::Index(i) => i.min(list.items.len()),
            Position::BeforeFirstDone => list.first_done_index().unwrap_or(list.items.len()),
        };
        list.items.insert(index, TodoItem::blank());
        Transition::structural(Some(FocusTarget::Item(index)))
    }

    fn delete_todo(&mut self, index: usize) -> Transition {
        let list = self.current_list_mut();
        if index >= list.items.len() {
            return Transition::unchanged();
        }
        list.items.remove(index);
        Transition::structural(None)
    }

    fn toggle_tag(&mut self, index: usize, tag: Tag) -> Transition {
        match self.current_list_mut().items.get_mut(index) {
            Some(item) => {
                item.tags.toggle(tag);
                Transition::structural(Some(FocusTarget::Item(index)))
            }
            None => Transition::unchanged(),
        }
    }

    fn reorder(&mut self, index: usize, direction: Direction, swap: bool) -> Transition {
        let items = &mut self.current_list_mut().items;
        if index >= items.len() {
            return Transition::unchanged();
        }
        let neighbor = neighbor_index(index, items.len(), direction);
        let focus = Some(FocusTarget::Item(neighbor));
        if swap {
            items.swap(index, neighbor);
            Transition::structural(focus)
        } else {
            Transition { persist: false, render: Render::None, focus }
        }
    }

    fn sort(&mut self) -> Transition {
        let list = self.current_list_mut();
        let (open, done): (Vec<TodoItem>, Vec<TodoItem>) =
            list.items.drain(..).partition(|item| !item.is_done());
        list.items = open;
        list.items.extend(done);
        Transition::structural(None)
    }
}

/// Index adjacent to `index` in a list of `len` items, wrapping at both ends.
pub fn neighbor_index(index: usize, len: usize, direction: Direction) -> usize {
    match direction {
        Direction::Up => {
            if index == 0 {
                len - 1
            } else {
                index - 1
            }
        }
        Direction::Down => (index + 1) % len,
    }
}

/// Pick the list that should be current after the collection is replaced.
///
/// Keeps `current_id` if it still exists, else the first list. `None` means
/// the collection is empty.
pub fn reconcile_selection(current_id: u64, lists: &[TodoList]) -> Option<u64> {
    if lists.iter().any(|l| l.id == current_id) {
        Some(current_id)
    } else {
        lists.first().map(|l| l.id)
    }
}

/// One past the largest id in use. `None` when that would overflow.
pub fn next_id_for(lists: &[TodoList]) -> Option<u64> {
    match lists.iter().map(|l| l.id).max() {
        Some(max) => max.checked_add(1),
        None => Some(0),
    }
}
