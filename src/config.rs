//! Gate Director configuration.
//!
//! Loaded from `~/.gate-director/config.toml`. Created with defaults if missing.
//! Every component receives the slice of settings it needs at construction;
//! nothing reads configuration from global state.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;
use crate::storage::Storage;

/// Errors that can occur while loading or writing the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine home directory")]
    NoHome,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Gate Director configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Candidate locations of the addon's menu snapshot file.
    /// The first one that exists is used.
    pub menu_file_paths: Vec<PathBuf>,

    /// Directory holding raw and interpreted inventory files.
    /// Defaults to `~/.gate-director/inventories/`.
    pub inventory_dir: Option<PathBuf>,

    /// Telemetry feed written by the ATC client.
    pub flight_json_path: Option<PathBuf>,

    /// Operator chosen on the airline page when a request names none.
    pub default_airline: String,

    /// Words that introduce a terminal name in telemetry gate strings.
    pub terminal_keywords: Vec<String>,

    /// Default tracing filter directive, overridden by `RUST_LOG`.
    pub log_level: String,

    pub timing: Timing,
    pub attempts: Attempts,
    pub matching: MatchingWeights,
    pub api: Api,
}

/// Sleep and poll intervals, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Timing {
    /// Pause around each menu selection.
    pub sleep_short_ms: u64,
    /// Pause after returning to a root page during mapping.
    pub sleep_long_ms: u64,
    /// Interval between menu-change polls.
    pub change_poll_ms: u64,
    /// Interval between empty-read retries of the menu file.
    pub read_retry_ms: u64,
    /// Interval between ground-contact polls.
    pub ground_check_ms: u64,
    /// How long the director blocks on an empty queue.
    pub queue_timeout_ms: u64,
    /// Telemetry feed polling interval.
    pub telemetry_poll_ms: u64,
    /// Pause before retrying a failed assignment.
    pub assignment_retry_ms: u64,
}

/// Attempt budgets for the bounded waits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Attempts {
    /// Reads of an empty menu file before giving up.
    pub menu_read: u32,
    /// Polls for a visible change after a selection.
    pub menu_change: u32,
    /// Selections of a pagination marker before giving up.
    pub click_next: u32,
    /// Pages searched by a keyword lookup.
    pub search: u32,
    /// Full assignment attempts, including the first.
    pub assignment: u32,
    /// Offset subtracted from the index of a matched menu action.
    pub menu_action_offset: usize,
}

/// Weights of the fuzzy gate score components. Expected to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MatchingWeights {
    pub gate_number: f64,
    pub gate_prefix: f64,
    pub terminal: f64,
}

/// Remote gate-confirmation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Api {
    pub confirm_url: String,
    pub api_key: String,
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            menu_file_paths: vec![
                PathBuf::from(
                    r"C:\Program Files (x86)\Addon Manager\MSFS\fsdreamteam-gsx-pro\html_ui\InGamePanels\FSDT_GSX_Panel\menu",
                ),
                PathBuf::from(
                    r"C:\Program Files\Addon Manager\MSFS\fsdreamteam-gsx-pro\html_ui\InGamePanels\FSDT_GSX_Panel\menu",
                ),
            ],
            inventory_dir: None,
            flight_json_path: None,
            default_airline: "GSX".to_string(),
            terminal_keywords: [
                "Terminal",
                "International",
                "Parking",
                "Domestic",
                "Main",
                "Central",
                "Pier",
                "Concourse",
                "Level",
                "Apron",
                "Stand",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            log_level: "info".to_string(),
            timing: Timing::default(),
            attempts: Attempts::default(),
            matching: MatchingWeights::default(),
            api: Api::default(),
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            sleep_short_ms: 100,
            sleep_long_ms: 300,
            change_poll_ms: 100,
            read_retry_ms: 5,
            ground_check_ms: 1000,
            queue_timeout_ms: 1000,
            telemetry_poll_ms: 5000,
            assignment_retry_ms: 500,
        }
    }
}

impl Default for Attempts {
    fn default() -> Self {
        Self {
            menu_read: 100,
            menu_change: 4,
            click_next: 3,
            search: 20,
            assignment: 2,
            menu_action_offset: 2,
        }
    }
}

impl Default for MatchingWeights {
    fn default() -> Self {
        Self {
            gate_number: 0.6,
            gate_prefix: 0.3,
            terminal: 0.1,
        }
    }
}

impl Default for Api {
    fn default() -> Self {
        Self {
            confirm_url: "https://apipri.sayintentions.ai/sapi/assignGate".to_string(),
            api_key: String::new(),
            timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Load config from `~/.gate-director/config.toml`, writing the defaults
    /// there first if the file does not exist yet.
    pub fn load_or_create() -> Result<Self, ConfigError> {
        let path = Self::path().ok_or(ConfigError::NoHome)?;
        Self::load_or_create_at(&path)
    }

    /// Load config from `path`, writing the defaults there if it is missing.
    pub fn load_or_create_at(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            tracing::info!("created default config at {}", path.display());
            return Ok(config);
        }
        Self::load(path)
    }

    /// Load config from an existing file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write this config to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, contents).map_err(write_err)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The config file path: `~/.gate-director/config.toml`.
    pub fn path() -> Option<PathBuf> {
        Self::home_dir().map(|h| h.join("config.toml"))
    }

    /// The resolved inventory directory.
    pub fn inventory_root(&self) -> Option<PathBuf> {
        self.inventory_dir.clone().or_else(Storage::default_root)
    }

    /// The resolved telemetry feed path:
    /// `%LOCALAPPDATA%\SayIntentionsAI\flight.json` unless configured.
    pub fn flight_json(&self) -> Option<PathBuf> {
        self.flight_json_path.clone().or_else(|| {
            dirs::data_local_dir().map(|d| d.join("SayIntentionsAI").join("flight.json"))
        })
    }

    fn home_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".gate-director"))
    }
}

impl Timing {
    pub fn sleep_short(&self) -> Duration {
        Duration::from_millis(self.sleep_short_ms)
    }

    pub fn sleep_long(&self) -> Duration {
        Duration::from_millis(self.sleep_long_ms)
    }

    pub fn ground_check(&self) -> Duration {
        Duration::from_millis(self.ground_check_ms)
    }

    pub fn queue_timeout(&self) -> Duration {
        Duration::from_millis(self.queue_timeout_ms)
    }

    pub fn telemetry_poll(&self) -> Duration {
        Duration::from_millis(self.telemetry_poll_ms)
    }
}

impl Config {
    /// Policy for rereading an empty or unreadable menu file.
    pub fn read_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.attempts.menu_read,
            Duration::from_millis(self.timing.read_retry_ms),
        )
    }

    /// Policy for confirming that a selection changed the menu.
    pub fn change_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.attempts.menu_change,
            Duration::from_millis(self.timing.change_poll_ms),
        )
    }

    /// Policy for selecting a pagination marker.
    pub fn next_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.attempts.click_next, self.timing.sleep_short())
    }

    /// Policy for paging through a keyword search.
    pub fn search_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.attempts.search, Duration::ZERO)
    }

    /// Policy for whole assignment attempts.
    pub fn assignment_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.attempts.assignment,
            Duration::from_millis(self.timing.assignment_retry_ms),
        )
    }
}
