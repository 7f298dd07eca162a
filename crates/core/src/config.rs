use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Default time the "copied" indicator stays visible
pub const DEFAULT_COPY_CONFIRMATION_MS: u64 = 1500;

/// When the transcript jumps to its newest content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutoscrollMode {
    /// Scroll on every growth or update, even if the reader scrolled away (default)
    #[default]
    Always,
    /// Scroll only if the view was already within `near_bottom_threshold` rows of the end
    NearBottom,
}

impl AutoscrollMode {
    pub const VALUES: &[AutoscrollMode] = &[AutoscrollMode::Always, AutoscrollMode::NearBottom];

    pub fn as_str(&self) -> &'static str {
        match self {
            AutoscrollMode::Always => "always",
            AutoscrollMode::NearBottom => "near-bottom",
        }
    }
}

impl std::fmt::Display for AutoscrollMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AutoscrollMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always" => Ok(AutoscrollMode::Always),
            "near-bottom" => Ok(AutoscrollMode::NearBottom),
            _ => Err(crate::Error::Config(ConfigError::InvalidAutoscrollMode(s.to_string()).to_string())),
        }
    }
}

/// File output for the logging system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileLoggingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_file_level")]
    pub level: String,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self { enabled: false, level: default_file_level() }
    }
}

fn default_file_level() -> String {
    "debug".to_string()
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default)]
    pub file: FileLoggingConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_level(), format: default_format(), file: FileLoggingConfig::default() }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

/// `[ui]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UiConfig {
    #[serde(default = "default_copy_confirmation_ms")]
    pub copy_confirmation_ms: u64,
    #[serde(default)]
    pub autoscroll: AutoscrollMode,
    #[serde(default = "default_near_bottom_threshold")]
    pub near_bottom_threshold: usize,
    /// Widest a message bubble may grow, as a fraction of the transcript pane
    #[serde(default = "default_max_bubble_ratio")]
    pub max_bubble_ratio: f32,
    #[serde(default = "default_true")]
    pub syntax_highlighting: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            copy_confirmation_ms: default_copy_confirmation_ms(),
            autoscroll: AutoscrollMode::default(),
            near_bottom_threshold: default_near_bottom_threshold(),
            max_bubble_ratio: default_max_bubble_ratio(),
            syntax_highlighting: true,
        }
    }
}

fn default_copy_confirmation_ms() -> u64 {
    DEFAULT_COPY_CONFIRMATION_MS
}

fn default_near_bottom_threshold() -> usize {
    2
}

fn default_max_bubble_ratio() -> f32 {
    0.8
}

fn default_true() -> bool {
    true
}

/// Root configuration structure for config.toml
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(toml_str).map_err(|e| crate::Error::Config(ConfigError::from(e).to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load from an explicit path, else the user config file, else defaults
    ///
    /// An explicit path must exist. The default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "loading user config");
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// `$XDG_CONFIG_HOME/murmur/config.toml` or the platform equivalent
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("murmur").join("config.toml"))
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        use crate::Error;

        if !(self.ui.max_bubble_ratio > 0.0 && self.ui.max_bubble_ratio <= 1.0) {
            return Err(Error::Config(
                ConfigError::OutOfRange(format!("ui.max_bubble_ratio = {}", self.ui.max_bubble_ratio)).to_string(),
            ));
        }

        if self.ui.copy_confirmation_ms == 0 {
            return Err(Error::Config(
                ConfigError::OutOfRange("ui.copy_confirmation_ms must be positive".to_string()).to_string(),
            ));
        }

        Ok(())
    }

    /// Get example configuration (as a string)
    pub fn example() -> &'static str {
        r#"# murmur configuration

[logging]
# Default level for stderr output (overridden by MURMUR_LOG / RUST_LOG)
level = "warn"
# Output format: "pretty", "json", or "compact"
format = "pretty"

[logging.file]
# Daily-rotated log files under MURMUR_LOG_DIR or the platform data dir.
# This is the only log output while the interactive view owns the terminal.
enabled = false
level = "debug"

[ui]
# How long the "Copied!" indicator stays visible
copy_confirmation_ms = 1500
# "always" jumps to new content even when you scrolled up;
# "near-bottom" only follows when you were already at the end
autoscroll = "always"
near_bottom_threshold = 2
# Widest a message bubble may grow, as a fraction of the transcript width
max_bubble_ratio = 0.8
syntax_highlighting = true
"#
    }
}

/// Configuration-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid autoscroll mode
    #[error("invalid autoscroll mode: {0}")]
    InvalidAutoscrollMode(String),

    /// Value outside its permitted range
    #[error("value out of range: {0}")]
    OutOfRange(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlParse(err.to_string())
    }
}
