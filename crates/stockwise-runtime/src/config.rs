//! # Stockwise Configuration
//!
//! Retry, pagination, validation, and logging settings.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKWISE_RETRY_ATTEMPTS=5                                         │
//! │     STOCKWISE_PAGE_SIZE=250                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/inventory/stockwise.toml (Linux)                         │
//! │     ~/Library/Application Support/com.stockwise.inventory/ (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     3 attempts, 1s base delay, x2, 100 rows per page                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # stockwise.toml
//! [retry]
//! max_attempts = 3
//! base_delay_ms = 1000
//! multiplier = 2.0
//!
//! [pagination]
//! page_size = 100
//!
//! [validation]
//! allowed_statuses = ["Pending", "Completed", "Cancelled"]
//!
//! [logging]
//! filter = "info,stockwise=debug"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stockwise_core::edge_cases::DEFAULT_PAGE_SIZE;
use stockwise_core::{EntryStatus, ValidationContext, DEFAULT_STATUSES};
use tracing::{debug, info, warn};

use crate::error::{RuntimeError, RuntimeResult};
use crate::retry::RetryPolicy;
use crate::telemetry::DEFAULT_LOG_FILTER;

// =============================================================================
// Sections
// =============================================================================

/// Retry schedule for stock updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt (milliseconds).
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,

    /// Growth factor between consecutive delays.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_base_delay() -> u64 {
    1_000
}
fn default_multiplier() -> f64 {
    2.0
}

impl Default for RetrySettings {
    fn default() -> Self {
        RetrySettings {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
            multiplier: default_multiplier(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationSettings {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationSettings {
    fn default() -> Self {
        PaginationSettings {
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSettings {
    /// Statuses a record may carry.
    #[serde(default = "default_statuses")]
    pub allowed_statuses: Vec<EntryStatus>,
}

fn default_statuses() -> Vec<EntryStatus> {
    DEFAULT_STATUSES.to_vec()
}

impl Default for ValidationSettings {
    fn default() -> Self {
        ValidationSettings {
            allowed_statuses: default_statuses(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_filter(),
        }
    }
}

// =============================================================================
// Stockwise Config
// =============================================================================

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockwiseConfig {
    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub pagination: PaginationSettings,

    #[serde(default)]
    pub validation: ValidationSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl StockwiseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (stockwise.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> RuntimeResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading stockwise config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load stockwise config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> RuntimeResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| RuntimeError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RuntimeError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| RuntimeError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Stockwise config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> RuntimeResult<()> {
        if self.retry.max_attempts == 0 {
            return Err(RuntimeError::InvalidConfig(
                "retry.max_attempts must be greater than 0".into(),
            ));
        }

        if self.retry.multiplier.is_nan() || self.retry.multiplier < 1.0 {
            return Err(RuntimeError::InvalidConfig(format!(
                "retry.multiplier must be at least 1.0, got {}",
                self.retry.multiplier
            )));
        }

        if self.pagination.page_size == 0 {
            return Err(RuntimeError::InvalidConfig(
                "pagination.page_size must be greater than 0".into(),
            ));
        }

        if self.validation.allowed_statuses.is_empty() {
            return Err(RuntimeError::InvalidConfig(
                "validation.allowed_statuses must not be empty".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from a key lookup. Unparseable values are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(attempts) = lookup("STOCKWISE_RETRY_ATTEMPTS") {
            match attempts.parse::<u32>() {
                Ok(n) => {
                    debug!(max_attempts = n, "Overriding retry attempts from environment");
                    self.retry.max_attempts = n;
                }
                Err(_) => warn!(value = %attempts, "Ignoring invalid STOCKWISE_RETRY_ATTEMPTS"),
            }
        }

        if let Some(delay) = lookup("STOCKWISE_RETRY_BASE_DELAY_MS") {
            if let Ok(ms) = delay.parse::<u64>() {
                debug!(base_delay_ms = ms, "Overriding retry base delay from environment");
                self.retry.base_delay_ms = ms;
            }
        }

        if let Some(size) = lookup("STOCKWISE_PAGE_SIZE") {
            if let Ok(n) = size.parse::<usize>() {
                self.pagination.page_size = n;
            }
        }

        if let Some(filter) = lookup("STOCKWISE_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockwise", "inventory")
            .map(|dirs| dirs.config_dir().join("stockwise.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The retry schedule as a policy object.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            base_delay: Duration::from_millis(self.retry.base_delay_ms),
            multiplier: self.retry.multiplier,
        }
    }

    /// A validation context using today's date and the configured statuses.
    pub fn validation_context(&self) -> ValidationContext {
        ValidationContext::default().with_statuses(self.validation.allowed_statuses.clone())
    }

    pub fn page_size(&self) -> usize {
        self.pagination.page_size
    }

    pub fn log_filter(&self) -> &str {
        &self.logging.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("stockwise-{}", uuid::Uuid::new_v4()))
            .join("stockwise.toml")
    }

    #[test]
    fn test_default_config() {
        let config = StockwiseConfig::default();
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 1_000);
        assert_eq!(config.page_size(), 100);
        assert_eq!(config.validation.allowed_statuses.len(), 3);
        assert_eq!(config.log_filter(), "info,stockwise=debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = StockwiseConfig::default();

        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
        config.retry.max_attempts = 3;

        config.retry.multiplier = 0.5;
        assert!(config.validate().is_err());
        config.retry.multiplier = f64::NAN;
        assert!(config.validate().is_err());
        config.retry.multiplier = 1.0;

        config.pagination.page_size = 0;
        assert!(config.validate().is_err());
        config.pagination.page_size = 10;

        config.validation.allowed_statuses.clear();
        assert!(config.validate().unwrap_err().is_config_error());
    }

    #[test]
    fn test_overrides() {
        let mut config = StockwiseConfig::default();
        config.apply_overrides(lookup(&[
            ("STOCKWISE_RETRY_ATTEMPTS", "5"),
            ("STOCKWISE_RETRY_BASE_DELAY_MS", "250"),
            ("STOCKWISE_PAGE_SIZE", "not-a-number"),
            ("STOCKWISE_LOG", "warn"),
        ]));

        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 250);
        assert_eq!(config.page_size(), 100);
        assert_eq!(config.log_filter(), "warn");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: StockwiseConfig = toml::from_str(
            r#"
            [retry]
            max_attempts = 4

            [validation]
            allowed_statuses = ["Pending", "Completed"]
            "#,
        )
        .unwrap();

        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.retry.multiplier, 2.0);
        assert_eq!(config.page_size(), 100);
        assert_eq!(
            config.validation.allowed_statuses,
            vec![EntryStatus::Pending, EntryStatus::Completed]
        );
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_path();
        let mut config = StockwiseConfig::default();
        config.pagination.page_size = 42;

        config.save(Some(path.clone())).unwrap();
        let loaded = StockwiseConfig::load(Some(path.clone())).unwrap();
        assert_eq!(loaded.pagination.page_size, 42);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let path = temp_path();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).unwrap();
        }
        std::fs::write(&path, "[pagination]\npage_size = 0\n").unwrap();

        assert!(StockwiseConfig::load(Some(path.clone())).is_err());
        assert_eq!(StockwiseConfig::load_or_default(Some(path.clone())).page_size(), 100);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_retry_policy_from_config() {
        let policy = StockwiseConfig::default().retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_validation_context_from_config() {
        let mut config = StockwiseConfig::default();
        config.validation.allowed_statuses = vec![EntryStatus::Completed];
        assert_eq!(
            config.validation_context().allowed_statuses,
            vec![EntryStatus::Completed]
        );
    }
}
