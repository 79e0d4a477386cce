//! Persistence of the list collection to a single JSON file.
//!
//! The whole collection is written on every save; there are no partial
//! writes and no schema version. Several running instances may share one
//! file, so the store also notices when someone else has replaced it.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{debug, info, warn};

use crate::state::{next_id_for, AppState};
use crate::todo::{today_title, TodoList};

/// Errors raised while reading or writing the data file.
#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    /// The file exists but does not hold a list collection.
    Deserialization(serde_json::Error),
    /// The file holds a valid but empty collection.
    Empty,
    /// The largest list id leaves no room for another one.
    IdsExhausted,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "data file I/O error: {e}"),
            StoreError::Deserialization(e) => write!(f, "malformed data file: {e}"),
            StoreError::Empty => write!(f, "data file holds no lists"),
            StoreError::IdsExhausted => write!(f, "data file uses the largest possible list id"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// Parse a raw document into a non-empty list collection.
pub fn parse_lists(raw: &str) -> Result<Vec<TodoList>, StoreError> {
    let lists: Vec<TodoList> = serde_json::from_str(raw).map_err(StoreError::Deserialization)?;
    if lists.is_empty() {
        return Err(StoreError::Empty);
    }
    if next_id_for(&lists).is_none() {
        return Err(StoreError::IdsExhausted);
    }
    Ok(lists)
}

/// Serialize a list collection the way it is stored on disk.
pub fn serialize_lists(lists: &[TodoList]) -> String {
    // A Vec of plain structs with string keys cannot fail to serialize.
    serde_json::to_string_pretty(lists).unwrap_or_else(|_| "[]".to_string())
}

/// File-backed store for one list collection.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    last_content: Option<String>,
}

impl Store {
    pub fn new(path: &Path) -> Self {
        Store {
            path: path.to_path_buf(),
            last_content: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state, seeding a single list titled with today's date when
    /// the file is missing or unusable.
    pub fn load(&mut self) -> AppState {
        self.load_or_seed(&today_title())
    }

    /// Load the state, seeding with `seed_title` when nothing usable exists.
    pub fn load_or_seed(&mut self, seed_title: &str) -> AppState {
        match self.read_lists() {
            Ok(Some(lists)) => {
                info!("Loaded {} lists from {}", lists.len(), self.path.display());
                AppState::from_lists(lists).unwrap_or_else(|| AppState::seed(seed_title))
            }
            Ok(None) => {
                info!("No data file at {}, starting fresh", self.path.display());
                AppState::seed(seed_title)
            }
            Err(StoreError::Io(e)) => {
                warn!("Error reading {}, starting fresh: {e}", self.path.display());
                AppState::seed(seed_title)
            }
            Err(e) => {
                warn!("Error loading {}, starting fresh: {e}", self.path.display());
                // The seed replaces the file on the first save.
                match create_backup(&self.path) {
                    Ok(backup) => info!("Kept unreadable data file as {}", backup.display()),
                    Err(e) => warn!("Failed to back up {}: {e}", self.path.display()),
                }
                AppState::seed(seed_title)
            }
        }
    }

    /// Read and parse the data file. `Ok(None)` means it does not exist.
    pub fn read_lists(&mut self) -> Result<Option<Vec<TodoList>>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        self.remember(raw.clone());
        parse_lists(&raw).map(Some)
    }

    /// Overwrite the data file with the full collection using atomic write
    /// (temp file + rename).
    pub fn save(&mut self, state: &AppState) -> Result<(), StoreError> {
        let data = serialize_lists(state.lists());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data.as_bytes())?;
        fs::rename(&tmp, &self.path)?;
        debug!("Saved {} lists to {}", state.lists().len(), self.path.display());
        self.remember(data);
        Ok(())
    }

    /// Report the new raw contents if another process has replaced the file
    /// since this store last read or wrote it.
    /// The whole file is compared on every poll.
    pub fn poll_external_change(&mut self) -> Option<String> {
        let raw = fs::read_to_string(&self.path).ok()?;
        if self.last_content.as_deref() == Some(raw.as_str()) {
            return None;
        }
        info!("Data file {} changed on disk", self.path.display());
        self.remember(raw.clone());
        Some(raw)
    }

    fn remember(&mut self, content: String) {
        self.last_content = Some(content);
    }
}

/// Create a timestamped backup of the data file in a `backup/` directory
/// next to it.
pub fn create_backup(db_path: &Path) -> io::Result<PathBuf> {
    if !db_path.exists() {
        return Err(io::Error::new(io::ErrorKind::NotFound, "Data file does not exist"));
    }

    let parent_dir = db_path.parent().unwrap_or_else(|| Path::new("."));
    let backup_dir = parent_dir.join("backup");
    fs::create_dir_all(&backup_dir)?;

    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let file_name = db_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("todo-lists.json");
    let backup_path = backup_dir.join(format!("{}_{}", timestamp, file_name));

    fs::copy(db_path, &backup_path)?;
    Ok(backup_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Tag;
    use crate::state::{Command, Position};
    use tempfile::TempDir;

    fn populated_state() -> AppState {
        let mut state = AppState::seed("MON 2024/1/1");
        state.apply(Command::NewTodo(Position::BeforeFirstDone));
        state.apply(Command::EditText { index: 0, text: "buy milk".into() });
        state.apply(Command::ToggleTag(0, Tag::Health));
        state.apply(Command::NewTodo(Position::Index(1)));
        state.apply(Command::ToggleTag(1, Tag::Done));
        state.apply(Command::EditNotes { list_id: 0, notes: "call back".into() });
        state.apply(Command::NewList { title: "TUE 2024/1/2".into() });
        state
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todo-lists.json");
        let state = populated_state();

        Store::new(&path).save(&state).unwrap();
        let loaded = Store::new(&path).load_or_seed("unused");

        assert_eq!(loaded.lists(), state.lists());
        assert_eq!(loaded.next_id(), state.next_id());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_missing_file_seeds_one_list() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::new(&dir.path().join("absent.json"));
        let state = store.load_or_seed("SUN 2026/10/18");
        assert_eq!(state.lists().len(), 1);
        assert_eq!(state.lists()[0].id, 0);
        assert_eq!(state.lists()[0].title, "SUN 2026/10/18");
        assert!(state.lists()[0].items.is_empty());
    }

    #[test]
    fn test_malformed_file_falls_back_to_seed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todo-lists.json");
        fs::write(&path, "{not json").unwrap();

        let mut store = Store::new(&path);
        assert!(matches!(store.read_lists(), Err(StoreError::Deserialization(_))));
        let state = store.load_or_seed("seed");
        assert_eq!(state.lists()[0].title, "seed");

        fs::write(&path, "[]").unwrap();
        assert!(matches!(store.read_lists(), Err(StoreError::Empty)));
    }

    #[test]
    fn test_malformed_file_is_backed_up_before_seeding() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todo-lists.json");
        fs::write(&path, "{not json").unwrap();

        let mut store = Store::new(&path);
        let state = store.load_or_seed("seed");
        store.save(&state).unwrap();

        let backups: Vec<_> = fs::read_dir(dir.path().join("backup"))
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0]).unwrap(), "{not json");
    }

    #[test]
    fn test_exhausted_list_id_falls_back_to_seed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todo-lists.json");
        let raw = format!(r#"[{{"ID":{},"title":"full","items":[],"notes":""}}]"#, u64::MAX);
        fs::write(&path, &raw).unwrap();

        assert!(matches!(parse_lists(&raw), Err(StoreError::IdsExhausted)));
        let state = Store::new(&path).load_or_seed("seed");
        assert_eq!(state.lists()[0].title, "seed");
        assert_eq!(state.next_id(), 1);
    }

    #[test]
    fn test_own_save_is_not_an_external_change() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todo-lists.json");
        let mut store = Store::new(&path);
        store.save(&populated_state()).unwrap();
        assert_eq!(store.poll_external_change(), None);
    }

    #[test]
    fn test_foreign_write_is_reported_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todo-lists.json");
        let mut ours = Store::new(&path);
        ours.save(&AppState::seed("ours")).unwrap();

        let mut theirs = Store::new(&path);
        let mut other = theirs.load_or_seed("unused");
        other.apply(Command::NewList { title: "from elsewhere".into() });
        theirs.save(&other).unwrap();

        let raw = ours.poll_external_change().expect("change should be seen");
        let lists = parse_lists(&raw).unwrap();
        assert_eq!(lists[0].title, "from elsewhere");
        assert_eq!(ours.poll_external_change(), None);
    }

    #[test]
    fn test_same_size_rewrite_within_one_mtime_tick_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todo-lists.json");
        let mut lists = vec![TodoList::new(0, "aa"), TodoList::new(1, "bb")];

        let mut ours = Store::new(&path);
        ours.save(&AppState::from_lists(lists.clone()).unwrap()).unwrap();
        let saved_at = fs::metadata(&path).unwrap().modified().unwrap();
        let saved_len = fs::metadata(&path).unwrap().len();

        lists.swap(0, 1);
        Store::new(&path).save(&AppState::from_lists(lists).unwrap()).unwrap();
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(saved_at)
            .unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), saved_len);

        let raw = ours.poll_external_change().expect("swap should be seen");
        assert_eq!(parse_lists(&raw).unwrap()[0].title, "bb");
        assert_eq!(ours.poll_external_change(), None);
    }

    #[test]
    fn test_create_backup_copies_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todo-lists.json");
        Store::new(&path).save(&populated_state()).unwrap();

        let backup = create_backup(&path).unwrap();
        assert!(backup.starts_with(dir.path().join("backup")));
        assert_eq!(fs::read_to_string(&backup).unwrap(), fs::read_to_string(&path).unwrap());
        assert!(create_backup(&dir.path().join("missing.json")).is_err());
    }
}
