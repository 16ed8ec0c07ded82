//! Bootstrap configuration loading and config-file resolution
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Built-in defaults
//!
//! This module covers tiers 3 and 4 and the lookup of the TOML file itself.
//! A missing TOML file is never fatal: the service starts on defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File name looked up in the per-user config directory
pub const CONFIG_FILE_NAME: &str = "casefuse.toml";

/// Default HTTP port for casefuse-engine
pub const DEFAULT_PORT: u16 = 5780;

/// Bootstrap configuration loaded from TOML
///
/// Every field has a default so that partial files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Outbound HTTP settings for URL and REST sources
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Pipeline tuning
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            logging: LoggingConfig::default(),
            fetch: FetchConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
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

/// Outbound fetch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent sent on every outbound request (None = crate default)
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds (0 = default)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Pipeline tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Upper bound on sources normalized concurrently
    #[serde(default = "default_max_concurrent_sources")]
    pub max_concurrent_sources: usize,

    /// Characters of normalized text quoted in each evidence entry
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,

    /// Tag vocabulary override (None = built-in vocabulary)
    #[serde(default)]
    pub tag_vocabulary: Option<Vec<String>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sources: default_max_concurrent_sources(),
            excerpt_chars: default_excerpt_chars(),
            tag_vocabulary: None,
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_max_concurrent_sources() -> usize {
    8
}

fn default_excerpt_chars() -> usize {
    200
}

/// Resolve the TOML config path
///
/// Order: command-line argument, then `env_var_name`, then
/// `<config_dir>/casefuse/casefuse.toml` if that file exists.
/// Returns None when no candidate applies.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path().filter(|p| p.exists())
}

/// Per-user config file location (`~/.config/casefuse/casefuse.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("casefuse").join(CONFIG_FILE_NAME))
}

/// Parse a TOML config file
///
/// Errors if the file cannot be read or is not valid TOML.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Where the loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// No config path applied
    Defaults,
    /// A path was given but no file exists there
    Missing(PathBuf),
    /// Parsed from this file
    File(PathBuf),
}

impl ConfigOrigin {
    /// Report the outcome; call once tracing is initialized
    pub fn log(&self) {
        match self {
            ConfigOrigin::Defaults => info!("No config file found, using built-in defaults"),
            ConfigOrigin::Missing(path) => warn!(
                "Config file {} does not exist, using built-in defaults",
                path.display()
            ),
            ConfigOrigin::File(path) => info!("Loaded config from {}", path.display()),
        }
    }
}

/// Configuration together with its origin
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    pub origin: ConfigOrigin,
}

/// Load config with graceful degradation
///
/// - No path: defaults
/// - Path given but file missing: defaults, origin `Missing`
/// - File present but malformed: error (a typo should not silently run on defaults)
///
/// Nothing is logged here since this runs before the subscriber exists; see
/// `ConfigOrigin::log`.
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig> {
    let Some(path) = path else {
        return Ok(LoadedConfig {
            config: TomlConfig::default(),
            origin: ConfigOrigin::Defaults,
        });
    };

    if !path.exists() {
        return Ok(LoadedConfig {
            config: TomlConfig::default(),
            origin: ConfigOrigin::Missing(path.to_path_buf()),
        });
    }

    Ok(LoadedConfig {
        config: load_toml_config(path)?,
        origin: ConfigOrigin::File(path.to_path_buf()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.fetch.timeout_secs, 5);
        assert!(config.fetch.user_agent.is_none());
        assert_eq!(config.pipeline.max_concurrent_sources, 8);
        assert_eq!(config.pipeline.excerpt_chars, 200);
        assert!(config.pipeline.tag_vocabulary.is_none());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config: TomlConfig = toml::from_str(
            r#"
            port = 9000

            [fetch]
            timeout_secs = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.fetch.timeout_secs, 2);
        assert_eq!(config.pipeline.excerpt_chars, 200);
    }
}
