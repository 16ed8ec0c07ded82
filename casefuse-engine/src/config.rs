//! Engine configuration
//!
//! Plain data resolved once at startup from the bootstrap `TomlConfig`.

use crate::fusion::DEFAULT_EXCERPT_CHARS;
use crate::scoring::DEFAULT_TAG_VOCABULARY;
use casefuse_common::config::TomlConfig;
use std::time::Duration;

/// User-Agent used when none is configured
pub const DEFAULT_USER_AGENT: &str = concat!("casefuse-engine/", env!("CARGO_PKG_VERSION"));

/// Fetch timeout used when none (or zero) is configured
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub user_agent: String,
    /// Never zero
    pub fetch_timeout: Duration,
    /// At least 1
    pub max_concurrent_sources: usize,
    pub excerpt_chars: usize,
    pub tag_vocabulary: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_concurrent_sources: 8,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
            tag_vocabulary: DEFAULT_TAG_VOCABULARY.clone(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml(config: &TomlConfig) -> Self {
        Self {
            user_agent: config
                .fetch
                .user_agent
                .clone()
                .filter(|ua| !ua.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            fetch_timeout: match config.fetch.timeout_secs {
                0 => DEFAULT_FETCH_TIMEOUT,
                secs => Duration::from_secs(secs),
            },
            max_concurrent_sources: config.pipeline.max_concurrent_sources.max(1),
            excerpt_chars: config.pipeline.excerpt_chars,
            tag_vocabulary: config
                .pipeline
                .tag_vocabulary
                .clone()
                .unwrap_or_else(|| DEFAULT_TAG_VOCABULARY.clone()),
        }
    }
}
