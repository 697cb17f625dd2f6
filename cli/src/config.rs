//! Configuration file management
//!
//! `CLIConfiguration` is read from `~/.bsql/config.toml`; command-line flags
//! override its values. The batch machinery itself only ever sees the
//! resolved, immutable [`RunConfig`].
//!
//! # Configuration Format
//!
//! ```toml
//! [server]
//! url = "http://localhost:8080"  # SQL endpoint
//! database = "master"
//! timeout = 0                    # command timeout in seconds, 0 = none
//! login_timeout = 0              # connect timeout in seconds, 0 = client default
//!
//! [ui]
//! theme = "UtfCompact"           # ASCIICompact, UtfCompact
//! page_size = 3000
//! column_separator = " "
//! history_size = 1000
//! terminator = ";|^go"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CLIError, Result};
use crate::formatter::Theme;
use crate::terminator::{Terminator, DEFAULT_TERMINATOR};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
pub const DEFAULT_DATABASE: &str = "master";
pub const DEFAULT_CONFIG_PATH: &str = "~/.bsql/config.toml";

/// CLI configuration loaded from TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CLIConfiguration {
    pub server: Option<ServerConfig>,
    pub ui: Option<UIConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub url: Option<String>,

    pub database: Option<String>,

    /// Command timeout in seconds (0 = wait forever)
    #[serde(default)]
    pub timeout: u64,

    /// Login timeout in seconds (0 = client default)
    #[serde(default)]
    pub login_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UIConfig {
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Rows per rendered table page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_column_separator")]
    pub column_separator: String,

    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Regex marking the end of a batch
    #[serde(default = "default_terminator")]
    pub terminator: String,
}

fn default_theme() -> String {
    Theme::default().to_string()
}

fn default_page_size() -> usize {
    3000
}

fn default_column_separator() -> String {
    " ".to_string()
}

fn default_history_size() -> usize {
    1000
}

fn default_terminator() -> String {
    DEFAULT_TERMINATOR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: Some(DEFAULT_SERVER_URL.to_string()),
            database: Some(DEFAULT_DATABASE.to_string()),
            timeout: 0,
            login_timeout: 0,
        }
    }
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            page_size: default_page_size(),
            column_separator: default_column_separator(),
            history_size: default_history_size(),
            terminator: default_terminator(),
        }
    }
}

pub fn expand_config_path(path: &Path) -> PathBuf {
    let path_str = path.to_str().unwrap_or(DEFAULT_CONFIG_PATH);
    if let Some(rest) = path_str.strip_prefix("~/") {
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(rest);
        }
    }
    path.to_path_buf()
}

impl CLIConfiguration {
    /// Load configuration from file
    ///
    /// Returns default configuration if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        let path = expand_config_path(path);

        if !path.exists() {
            log::debug!("[CONFIG] {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| {
            CLIError::ConfigurationError(format!("Failed to read config file: {}", e))
        })?;

        let config: CLIConfiguration = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn resolved_server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    pub fn resolved_ui(&self) -> UIConfig {
        self.ui.clone().unwrap_or_default()
    }
}

/// How scripted input is echoed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EchoMode {
    #[default]
    Off,
    /// `<n>> line`
    Numbered,
    /// line only
    Plain,
}

impl EchoMode {
    pub fn from_flags(echo: bool, no_prompt: bool) -> Self {
        match (echo, no_prompt) {
            (false, _) => EchoMode::Off,
            (true, false) => EchoMode::Numbered,
            (true, true) => EchoMode::Plain,
        }
    }
}

/// Immutable runtime settings for the batch loop
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub terminator: Terminator,
    pub page_size: usize,
    pub column_separator: String,
    pub echo: EchoMode,
    pub show_header: bool,
    pub theme: Theme,
}

impl RunConfig {
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::from_ui(&UIConfig::default())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            terminator: Terminator::default(),
            page_size: default_page_size(),
            column_separator: default_column_separator(),
            echo: EchoMode::Off,
            show_header: true,
            theme: Theme::default(),
        }
    }
}

/// Collects config-file values and flag overrides, validated on `build`
#[derive(Debug, Clone)]
pub struct RunConfigBuilder {
    terminator: String,
    page_size: usize,
    column_separator: String,
    echo: EchoMode,
    show_header: bool,
    theme: String,
}

impl RunConfigBuilder {
    pub fn from_ui(ui: &UIConfig) -> Self {
        Self {
            terminator: ui.terminator.clone(),
            page_size: ui.page_size,
            column_separator: ui.column_separator.clone(),
            echo: EchoMode::Off,
            show_header: true,
            theme: ui.theme.clone(),
        }
    }

    pub fn terminator(mut self, pattern: impl Into<String>) -> Self {
        self.terminator = pattern.into();
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn column_separator(mut self, separator: impl Into<String>) -> Self {
        self.column_separator = separator.into();
        self
    }

    pub fn echo(mut self, echo: EchoMode) -> Self {
        self.echo = echo;
        self
    }

    pub fn show_header(mut self, show_header: bool) -> Self {
        self.show_header = show_header;
        self
    }

    pub fn theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    pub fn build(self) -> Result<RunConfig> {
        if self.page_size == 0 {
            return Err(CLIError::ConfigurationError(
                "page size must be at least 1".into(),
            ));
        }
        Ok(RunConfig {
            terminator: Terminator::new(&self.terminator)?,
            page_size: self.page_size,
            column_separator: self.column_separator,
            echo: self.echo,
            show_header: self.show_header,
            theme: self.theme.parse()?,
        })
    }
}
