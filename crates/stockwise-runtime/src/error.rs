//! # Runtime Error Types
//!
//! Failures of the runtime itself: configuration loading, saving, and
//! validation. Failures of the wrapped operations never show up here; they
//! are classified into [`ClassifiedError`](stockwise_core::ClassifiedError).
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Runtime Error Categories                          │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   File System   │  │     Encoding            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  ConfigLoad     │  │  ConfigLoad (toml)      │ │
//! │  │                 │  │  ConfigSave     │  │  ConfigSave (toml)      │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A loaded configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to write the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for RuntimeError {
    fn from(err: std::io::Error) -> Self {
        RuntimeError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for RuntimeError {
    fn from(err: toml::de::Error) -> Self {
        RuntimeError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for RuntimeError {
    fn from(err: toml::ser::Error) -> Self {
        RuntimeError::ConfigSaveFailed(err.to_string())
    }
}

impl RuntimeError {
    /// Returns true if this error came from `validate()` rather than I/O.
    pub fn is_config_error(&self) -> bool {
        matches!(self, RuntimeError::InvalidConfig(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RuntimeError::InvalidConfig("page_size must be greater than 0".into());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: page_size must be greater than 0"
        );
        assert!(err.is_config_error());
    }

    #[test]
    fn test_toml_error_converts_to_load_failure() {
        let err: RuntimeError = toml::from_str::<toml::Value>("not = [valid")
            .unwrap_err()
            .into();
        assert!(matches!(err, RuntimeError::ConfigLoadFailed(_)));
        assert!(!err.is_config_error());
    }
}
