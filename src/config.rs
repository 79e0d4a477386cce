//! # Configuration
//!
//! Settings resolve in this order: defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.todolists/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use serde::{Deserialize, Serialize};
use simplelog::LevelFilter;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TodoConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub poll_interval_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LogConfig {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DATA_FILE_NAME: &str = "todo-lists.json";
pub const LOG_FILE_NAME: &str = "todolists.log";
pub const DB_ENV_VAR: &str = "TODOLISTS_DB";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub db_path: PathBuf,
    pub poll_interval: Duration,
    pub log_level: LevelFilter,
    pub log_path: PathBuf,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where the loaded settings came from. Loading runs before the logger is
/// set up, so this is reported to the caller instead of logged.
#[derive(Debug)]
pub enum ConfigSource {
    /// Read from an existing file.
    File,
    /// No file existed; a commented-out default was written.
    Generated,
    /// No file existed and writing the default failed.
    GenerateFailed(io::Error),
}

// ============================================================================
// Loading
// ============================================================================

/// Directory holding the config, data and log files: `~/.todolists`.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".todolists")
}

/// Returns the path to `~/.todolists/config.toml`.
pub fn config_path() -> PathBuf {
    app_dir().join("config.toml")
}

/// Load config from `path`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `TodoConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config(path: &Path) -> Result<(TodoConfig, ConfigSource), ConfigError> {
    if !path.exists() {
        let source = match generate_default_config(path) {
            Ok(()) => ConfigSource::Generated,
            Err(e) => ConfigSource::GenerateFailed(e),
        };
        return Ok((TodoConfig::default(), source));
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config = parse_config(&contents)?;
    Ok((config, ConfigSource::File))
}

pub fn parse_config(contents: &str) -> Result<TodoConfig, ConfigError> {
    toml::from_str(contents).map_err(ConfigError::Parse)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) -> io::Result<()> {
    let default_content = r#"# todolists configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults -> this file -> env vars -> CLI flags.

# [storage]
# path = "~/.todolists/todo-lists.json"   # Or set TODOLISTS_DB, or pass --db

# [ui]
# poll_interval_ms = 500                  # How often to look for changes made by other instances

# [log]
# level = "info"                          # "off", "error", "warn", "info", "debug", "trace"
# file = "~/.todolists/todolists.log"
"#;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, default_content)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_db` is the `--db` flag and `env_db` the value of `TODOLISTS_DB`.
pub fn resolve(config: &TodoConfig, env_db: Option<PathBuf>, cli_db: Option<PathBuf>) -> ResolvedConfig {
    let dir = app_dir();

    let db_path = cli_db
        .or(env_db)
        .or_else(|| config.storage.path.as_deref().map(expand_home))
        .unwrap_or_else(|| dir.join(DATA_FILE_NAME));

    let poll_interval = Duration::from_millis(
        config
            .ui
            .poll_interval_ms
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS)
            .max(50),
    );

    let log_level = config
        .log
        .level
        .as_deref()
        .and_then(parse_level)
        .unwrap_or(LevelFilter::Info);

    let log_path = config
        .log
        .file
        .as_deref()
        .map(expand_home)
        .unwrap_or_else(|| dir.join(LOG_FILE_NAME));

    ResolvedConfig {
        db_path,
        poll_interval,
        log_level,
        log_path,
    }
}

/// Parse a log level name, case-insensitively.
pub fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.trim().to_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Replace a leading `~` with the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().map(|h| h.join(rest)).unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let resolved = resolve(&TodoConfig::default(), None, None);
        assert!(resolved.db_path.ends_with(".todolists/todo-lists.json"));
        assert_eq!(resolved.poll_interval, Duration::from_millis(DEFAULT_POLL_INTERVAL_MS));
        assert_eq!(resolved.log_level, LevelFilter::Info);
    }

    #[test]
    fn test_sparse_toml_parses() {
        let config = parse_config("[ui]\npoll_interval_ms = 1000\n").unwrap();
        assert_eq!(config.ui.poll_interval_ms, Some(1000));
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        assert!(matches!(parse_config("[ui\n"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_cli_beats_env_beats_file() {
        let config = parse_config(
            "[storage]\npath = \"/from/file.json\"\n[log]\nlevel = \"DEBUG\"\n",
        )
        .unwrap();

        let file_only = resolve(&config, None, None);
        assert_eq!(file_only.db_path, PathBuf::from("/from/file.json"));
        assert_eq!(file_only.log_level, LevelFilter::Debug);

        let env = resolve(&config, Some(PathBuf::from("/from/env.json")), None);
        assert_eq!(env.db_path, PathBuf::from("/from/env.json"));

        let cli = resolve(
            &config,
            Some(PathBuf::from("/from/env.json")),
            Some(PathBuf::from("/from/cli.json")),
        );
        assert_eq!(cli.db_path, PathBuf::from("/from/cli.json"));
    }

    #[test]
    fn test_poll_interval_has_a_floor() {
        let config = parse_config("[ui]\npoll_interval_ms = 1\n").unwrap();
        assert_eq!(resolve(&config, None, None).poll_interval, Duration::from_millis(50));
    }

    #[test]
    fn test_load_config_reports_its_source() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let (config, source) = load_config(&path).unwrap();
        assert!(matches!(source, ConfigSource::Generated));
        assert!(config.storage.path.is_none());
        assert!(fs::read_to_string(&path).unwrap().starts_with("# todolists configuration"));

        fs::write(&path, "[ui]\npoll_interval_ms = 750\n").unwrap();
        let (config, source) = load_config(&path).unwrap();
        assert!(matches!(source, ConfigSource::File));
        assert_eq!(config.ui.poll_interval_ms, Some(750));

        fs::write(&path, "[ui").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("Warn"), Some(LevelFilter::Warn));
        assert_eq!(parse_level("loud"), None);
    }
}
