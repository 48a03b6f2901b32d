//! Configuration loading and management.
//!
//! Configuration is loaded from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Environment variables
//! 2. `.rule-engine.toml` in current directory
//! 3. `~/.config/rule-engine/config.toml`
//! 4. Default values
//!
//! # Configuration File Format
//!
//! ```toml
//! [runtime]
//! max_workers = 4
//! timeout_seconds = 30.0
//! memory_limit_mb = 1024.0
//! enable_cache = true
//! enable_vectorization = true
//! cache_capacity = 1024
//! parallel_batch_size = 4
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `RULE_ENGINE_MAX_WORKERS` | Bounded worker pool size |
//! | `RULE_ENGINE_TIMEOUT_SECONDS` | Soft execution deadline |

use std::{env, fs, path::PathBuf};

use serde::Deserialize;

use crate::error::{AppResult, config_error};

/// Application configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub runtime: RuntimeConfig
}

/// Runtime execution knobs (spec.md §5 and §9's "knobs, not guarantees").
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    /// Bounded worker pool size for `parallel` rule groups.
    pub max_workers:          usize,
    /// Soft deadline, checked between rule groups.
    pub timeout_seconds:      f64,
    /// Advisory memory cap; exceeding it is recorded, not enforced.
    pub memory_limit_mb:      f64,
    /// Whether the condition-result cache persists across the invocation.
    pub enable_cache:         bool,
    /// Whether vectorized column evaluation is attempted before falling
    /// back to row-wise evaluation.
    pub enable_vectorization: bool,
    /// Maximum entries retained in the condition cache (LRU eviction).
    pub cache_capacity:       usize,
    /// Batch size used when grouping independent row-scoped rules for
    /// `parallel_groups`.
    pub parallel_batch_size:  usize
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_workers:          4,
            timeout_seconds:      30.0,
            memory_limit_mb:      1024.0,
            enable_cache:         true,
            enable_vectorization: true,
            cache_capacity:       1024,
            parallel_batch_size:  4
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file in current directory (`.rule-engine.toml`)
    /// 3. Config file in home directory (`~/.config/rule-engine/config.toml`)
    /// 4. Default values
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("rule-engine")
                .join("config.toml");

            if home_config.exists() {
                let content = fs::read_to_string(&home_config)
                    .map_err(|e| config_error(format!("Failed to read config file: {}", e)))?;
                config = toml::from_str(&content)
                    .map_err(|e| config_error(format!("Invalid config file: {}", e)))?;
            }
        }

        let local_config = PathBuf::from(".rule-engine.toml");
        if local_config.exists() {
            let content = fs::read_to_string(&local_config)
                .map_err(|e| config_error(format!("Failed to read config file: {}", e)))?;
            config = toml::from_str(&content)
                .map_err(|e| config_error(format!("Invalid config file: {}", e)))?;
        }

        if let Ok(workers) = env::var("RULE_ENGINE_MAX_WORKERS")
            && let Ok(workers) = workers.parse()
        {
            config.runtime.max_workers = workers;
        }

        if let Ok(timeout) = env::var("RULE_ENGINE_TIMEOUT_SECONDS")
            && let Ok(timeout) = timeout.parse()
        {
            config.runtime.timeout_seconds = timeout;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_runtime_config_matches_spec_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.max_workers, 4);
        assert_eq!(config.parallel_batch_size, 4);
        assert_eq!(config.cache_capacity, 1024);
        assert!(config.enable_cache);
        assert!(config.enable_vectorization);
    }
}
