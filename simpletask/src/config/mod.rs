//! Configuration system for the `SimpleTask` client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/simpletask/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::store::http::{DEFAULT_TIMEOUT, HttpStore};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// The configured store base URL is not a valid URL.
    #[error("invalid store base URL {url:?}: {source}")]
    InvalidBaseUrl {
        /// The offending URL string.
        url: String,
        /// Underlying parse error.
        source: url::ParseError,
    },
}

/// How repository mutations respond to store failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Surface the failure to the caller.
    #[default]
    Propagate,
    /// Log the failure and report success anyway.
    LogAndContinue,
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    store: StoreFileConfig,
    collections: CollectionsFileConfig,
    repository: RepositoryFileConfig,
}

/// `[store]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StoreFileConfig {
    base_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// `[collections]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct CollectionsFileConfig {
    tasks: Option<String>,
    users: Option<String>,
}

/// `[repository]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct RepositoryFileConfig {
    on_update_failure: Option<ErrorPolicy>,
    on_delete_failure: Option<ErrorPolicy>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -- Store --
    /// Base URL of the document store API. `None` means no remote store is
    /// configured (in-memory mode).
    pub base_url: Option<String>,
    /// Per-request timeout for store calls.
    pub request_timeout: Duration,

    // -- Collections --
    /// Collection holding task documents.
    pub tasks_collection: String,
    /// Collection holding user profile documents.
    pub users_collection: String,

    // -- Repository --
    /// Failure handling for task updates.
    pub on_update_failure: ErrorPolicy,
    /// Failure handling for task deletes.
    pub on_delete_failure: ErrorPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout: DEFAULT_TIMEOUT,
            tasks_collection: "tasks".to_string(),
            users_collection: "users".to_string(),
            on_update_failure: ErrorPolicy::Propagate,
            on_delete_failure: ErrorPolicy::Propagate,
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// CLI args and env vars are parsed via `clap`. If `--config` is given
    /// and the file does not exist, returns an error. If no `--config` is
    /// given, the default path (`~/.config/simpletask/config.toml`) is
    /// tried and silently ignored if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read
    /// or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Resolve a `ClientConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default. This is separated from `load()` to
    /// enable unit testing without CLI parsing.
    #[must_use]
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            base_url: cli
                .store_url
                .clone()
                .or_else(|| file.store.base_url.clone()),
            request_timeout: file
                .store
                .request_timeout_secs
                .map_or(defaults.request_timeout, Duration::from_secs),
            tasks_collection: file
                .collections
                .tasks
                .clone()
                .unwrap_or(defaults.tasks_collection),
            users_collection: file
                .collections
                .users
                .clone()
                .unwrap_or(defaults.users_collection),
            on_update_failure: file
                .repository
                .on_update_failure
                .unwrap_or(defaults.on_update_failure),
            on_delete_failure: file
                .repository
                .on_delete_failure
                .unwrap_or(defaults.on_delete_failure),
        }
    }

    /// Build an [`HttpStore`] from this configuration, if a base URL is
    /// present.
    ///
    /// Returns `Ok(None)` when no base URL is configured (in-memory mode).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the configured URL does
    /// not parse.
    pub fn to_http_store(&self) -> Result<Option<HttpStore>, ConfigError> {
        let Some(url) = &self.base_url else {
            return Ok(None);
        };
        let base = Url::parse(url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: url.clone(),
            source,
        })?;
        Ok(Some(HttpStore::with_timeout(base, self.request_timeout)))
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Offline-friendly task sync client")]
pub struct CliArgs {
    /// Base URL of the document store API.
    #[arg(long, env = "SIMPLETASK_STORE_URL")]
    pub store_url: Option<String>,

    /// User id to sign in as.
    #[arg(long, env = "SIMPLETASK_OWNER")]
    pub owner: Option<String>,

    /// Path to config file (default: `~/.config/simpletask/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "SIMPLETASK_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/simpletask.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// What to do; defaults to listing tasks.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands.
#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Add a new task.
    Add {
        /// Task title.
        title: String,
        /// Free-form description.
        #[arg(long)]
        description: Option<String>,
        /// Priority: high, medium, or low.
        #[arg(long)]
        priority: Option<String>,
        /// Due date, `YYYY-MM-DD`.
        #[arg(long)]
        date: Option<String>,
        /// Due time, `HH:MM`.
        #[arg(long)]
        time: Option<String>,
    },
    /// List tasks, with optional status filter and search.
    List {
        /// Status filter: all, pending, or completed.
        #[arg(long, default_value = "all")]
        filter: String,
        /// Case-insensitive substring search over title and description.
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Toggle a task's completion state.
    Toggle {
        /// Id of the task to toggle.
        id: String,
    },
    /// Delete a task.
    Delete {
        /// Id of the task to delete.
        id: String,
    },
    /// Show tasks grouped by calendar day.
    Calendar,
    /// Show task stats for a period.
    Stats {
        /// Period to chart: week, month, or year.
        #[arg(long, default_value = "week")]
        period: String,
    },
    /// Show the signed-in user's profile.
    Profile,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            // No config dir available — use defaults.
            return Ok(ConfigFile::default());
        };
        config_dir.join("simpletask").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
