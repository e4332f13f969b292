//! Configuration loading and resolution
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `ROLODEX_CONFIG` environment variable
//! 3. Platform config file (`<config_dir>/rolodex/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing platform config file is not an error: defaults are used and the
//! caller warns about it. A file named on the command line or in the environment
//! must be readable, and any file that is found must parse.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "ROLODEX_CONFIG";

/// Configuration loaded from TOML
///
/// Every field has a built-in default, so an empty file is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Source table discovery (optional)
    #[serde(default)]
    pub input: InputConfig,

    /// Merge behavior (optional)
    #[serde(default)]
    pub merge: MergeConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Source table discovery configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// File extension of source tables, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
        }
    }
}

/// Merge behavior configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Drop records that hold nothing but a name once all tables are merged
    #[serde(default = "default_drop_name_only")]
    pub drop_name_only: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            drop_name_only: default_drop_name_only(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_extension() -> String {
    "csv".to_string()
}

fn default_drop_name_only() -> bool {
    true
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` argument
    CommandLine(PathBuf),
    /// `ROLODEX_CONFIG` environment variable
    Environment(PathBuf),
    /// Platform config directory
    PlatformFile(PathBuf),
    /// No file found, compiled defaults
    Defaults,
}

impl ConfigSource {
    /// Path of the file backing this source, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::CommandLine(p)
            | ConfigSource::Environment(p)
            | ConfigSource::PlatformFile(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }

    /// True when no file was found
    pub fn is_defaults(&self) -> bool {
        matches!(self, ConfigSource::Defaults)
    }

    /// One-line description for the startup log
    pub fn describe(&self) -> String {
        match self.path() {
            Some(path) => format!("Loaded configuration from {}", path.display()),
            None => "No config file found, using built-in defaults".to_string(),
        }
    }
}

/// Resolves and loads the configuration file for one application
pub struct ConfigResolver {
    app_name: String,
}

impl ConfigResolver {
    /// Create resolver for the given application directory name
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
        }
    }

    /// Decide which config file applies, without reading it
    pub fn locate(&self, cli_arg: Option<&Path>) -> ConfigSource {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            return ConfigSource::CommandLine(path.to_path_buf());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return ConfigSource::Environment(PathBuf::from(path));
            }
        }

        // Priority 3: Platform config file
        if let Some(path) = self.platform_config_path() {
            if path.exists() {
                return ConfigSource::PlatformFile(path);
            }
        }

        // Priority 4: Compiled defaults
        ConfigSource::Defaults
    }

    /// Locate and load the effective configuration
    ///
    /// Nothing is logged here: configuration is resolved before logging is
    /// set up. Callers report the returned source with
    /// [`ConfigSource::describe`].
    pub fn resolve(&self, cli_arg: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
        let source = self.locate(cli_arg);
        let config = match source.path() {
            Some(path) => load_toml_config(path)?,
            None => TomlConfig::default(),
        };

        Ok((config, source))
    }

    /// `<config_dir>/<app_name>/config.toml` for the current platform
    pub fn platform_config_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(&self.app_name).join("config.toml"))
    }
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    if config.input.extension.trim().is_empty() {
        return Err(Error::Config(format!(
            "{}: input.extension must not be empty",
            path.display()
        )));
    }

    Ok(config)
}
