//! Configuration management for reflow.
//!
//! Parses `reflow.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [echo]
//! link_prefix = "guide-"
//!
//! [text]
//! maximum_line_length = 72
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `echo.link_prefix` supports environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Bare `$VAR` without braces is kept as written.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "reflow.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Markdown echo renderer configuration.
    pub echo: EchoConfig,
    /// Plain-text renderer configuration.
    pub text: TextConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Markdown echo renderer configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EchoConfig {
    /// Prefix of reference link labels.
    ///
    /// When unset every render session generates a unique prefix. Set it
    /// explicitly only when each rendered document gets its own value.
    pub link_prefix: Option<String>,
}

/// Plain-text renderer configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Soft wrap paragraphs at this many bytes; zero or less disables wrapping.
    pub maximum_line_length: i64,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`echo.link_prefix`").
        field: String,
        /// Error message (e.g., "${`DOC_PREFIX`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `reflow.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }

        let cwd = std::env::current_dir()?;
        match discover_config(&cwd) {
            Some(discovered) => Self::load_from_file(&discovered),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns error if parsing, expansion, or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(prefix) = &self.echo.link_prefix {
            validate_link_prefix(prefix)?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref prefix) = self.echo.link_prefix {
            self.echo.link_prefix = Some(expand::expand_env(prefix, "echo.link_prefix")?);
        }
        Ok(())
    }
}

/// Search for config file in `start` and its parents.
fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Link prefixes end up inside `[label]` references.
fn validate_link_prefix(prefix: &str) -> Result<(), ConfigError> {
    if prefix.is_empty() {
        return Err(ConfigError::Validation(
            "echo.link_prefix cannot be empty".to_owned(),
        ));
    }
    if prefix
        .chars()
        .any(|c| c.is_whitespace() || c == '[' || c == ']')
    {
        return Err(ConfigError::Validation(
            "echo.link_prefix cannot contain whitespace or brackets".to_owned(),
        ));
    }
    Ok(())
}
