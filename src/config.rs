//! Configuration for stockboard.
//!
//! Settings are read from `.stockboard/stockboard.toml` and layered
//! file → environment → CLI:
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8080"
//! timeout_secs = 15
//! token = "..."                 # or STOCKBOARD_TOKEN
//!
//! [board]
//! terminal_columns = { order = "purchased", receive = "stored" }
//!
//! [logging]
//! format = "pretty"             # or "json"
//!
//! [presets.open-cables]
//! columns = ["identified", "ordered"]
//! text = "cable"
//! ```
//!
//! A terminal column of `"none"` disables transfers for that board type.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::board::filter::ProductFilter;
use crate::board::models::{BoardType, ColumnStatus};
use crate::logging::LogFormat;
use crate::sync::ControllerSettings;
use crate::transfer::TerminalColumns;

pub const CONFIG_DIR: &str = ".stockboard";
pub const CONFIG_FILE: &str = "stockboard.toml";
pub const TOKEN_ENV: &str = "STOCKBOARD_TOKEN";
pub const API_URL_ENV: &str = "STOCKBOARD_API_URL";

const DISABLED: &str = "none";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardSection {
    /// Board type name → column name (or `"none"`).
    #[serde(default)]
    pub terminal_columns: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub format: LogFormat,
}

/// The complete stockboard.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockboardToml {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub board: BoardSection,
    #[serde(default)]
    pub logging: LoggingSection,
    /// Saved filters, by name.
    #[serde(default)]
    pub presets: BTreeMap<String, ProductFilter>,
}

/// A parsed `[board] terminal_columns` entry.
fn parse_terminal_entry(board_type: &str, column: &str) -> Result<(BoardType, Option<ColumnStatus>), String> {
    let board_type = BoardType::from_str(board_type)?;
    if column == DISABLED {
        return Ok((board_type, None));
    }
    let column = ColumnStatus::from_str(column)?;
    if !board_type.has_column(column) {
        return Err(format!(
            "Column '{}' does not exist on {} boards",
            column, board_type
        ));
    }
    Ok((board_type, Some(column)))
}

impl StockboardToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse stockboard.toml")
    }

    /// Load `<config_dir>/stockboard.toml`, or defaults when it is missing.
    pub fn load_or_default(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize stockboard.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Base URL: environment overrides the file.
    pub fn base_url(&self) -> String {
        std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.api.base_url.clone())
    }

    /// Bearer token: environment overrides the file.
    pub fn token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api.token.clone())
    }

    /// Terminal columns with file overrides applied. Invalid entries are
    /// skipped here and reported by `validate`.
    pub fn terminal_columns(&self) -> TerminalColumns {
        self.board
            .terminal_columns
            .iter()
            .filter_map(|(bt, col)| parse_terminal_entry(bt, col).ok())
            .fold(TerminalColumns::default(), |acc, (bt, col)| {
                acc.with_override(bt, col)
            })
    }

    pub fn preset(&self, name: &str) -> Option<&ProductFilter> {
        self.presets.get(name)
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.api.timeout_secs == 0 {
            warnings.push("api.timeout_secs is 0: every request would time out".to_string());
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            warnings.push(format!(
                "api.base_url '{}' should start with http:// or https://",
                self.api.base_url
            ));
        }

        for (board_type, column) in &self.board.terminal_columns {
            if let Err(e) = parse_terminal_entry(board_type, column) {
                warnings.push(format!(
                    "Invalid terminal column '{}' for '{}': {}",
                    column, board_type, e
                ));
            }
        }

        for (name, preset) in &self.presets {
            if preset.is_empty() {
                warnings.push(format!("Preset '{}' has no criteria and matches everything", name));
            }
        }

        warnings
    }
}

/// Runtime configuration: the file plus environment and CLI overrides.
#[derive(Debug, Clone)]
pub struct StockboardConfig {
    pub project_dir: PathBuf,
    pub config_dir: PathBuf,
    pub toml: StockboardToml,
    pub verbose: bool,
    pub cli_base_url: Option<String>,
    pub cli_timeout_secs: Option<u64>,
}

impl StockboardConfig {
    pub fn new(project_dir: PathBuf) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;
        let config_dir = project_dir.join(CONFIG_DIR);
        let toml = StockboardToml::load_or_default(&config_dir)?;

        Ok(Self {
            project_dir,
            config_dir,
            toml,
            verbose: false,
            cli_base_url: None,
            cli_timeout_secs: None,
        })
    }

    pub fn with_cli_args(
        project_dir: PathBuf,
        verbose: bool,
        base_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        let mut config = Self::new(project_dir)?;
        config.verbose = verbose;
        config.cli_base_url = base_url;
        config.cli_timeout_secs = timeout_secs;
        Ok(config)
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// CLI → env → file → default.
    pub fn base_url(&self) -> String {
        self.cli_base_url
            .clone()
            .unwrap_or_else(|| self.toml.base_url())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.cli_timeout_secs.unwrap_or(self.toml.api.timeout_secs))
    }

    pub fn token(&self) -> Option<String> {
        self.toml.token()
    }

    pub fn log_format(&self) -> LogFormat {
        self.toml.logging.format
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            timeout: self.timeout(),
            terminal_columns: self.toml.terminal_columns(),
        }
    }

    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}
