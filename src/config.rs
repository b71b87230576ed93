//! Compiler configuration
//!
//! A JSON document with every field optional. Missing fields take the
//! defaults below; unknown fields and unknown enum values are rejected.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compiler::{Dialect, UnknownOperatorPolicy};
use crate::observability::{log_event_with_fields, Event, Severity};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "GRIDSQL_CONFIG_READ",
            ConfigError::Parse(_) => "GRIDSQL_CONFIG_PARSE",
            ConfigError::Invalid(_) => "GRIDSQL_CONFIG_INVALID",
        }
    }
}

/// Compiler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerConfig {
    /// Placeholder style (default: "ansi")
    #[serde(default)]
    pub dialect: Dialect,

    /// Handling of unknown filter operators (default: "ignore")
    #[serde(default)]
    pub unknown_operator: UnknownOperatorPolicy,

    /// Largest allowed `endRow - startRow + 1` (default: 10000)
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,

    /// Attach the compiled statement to shaped responses (default: false)
    #[serde(default)]
    pub include_sql_in_response: bool,

    /// Attach error messages to failed responses (default: false)
    #[serde(default)]
    pub include_error_in_response: bool,

    /// Minimum logged severity (default: "warn")
    #[serde(default)]
    pub log_level: Severity,
}

fn default_max_page_size() -> u64 {
    10_000
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            unknown_operator: UnknownOperatorPolicy::default(),
            max_page_size: default_max_page_size(),
            include_sql_in_response: false,
            include_error_in_response: false,
            log_level: Severity::default(),
        }
    }
}

impl CompilerConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_json(&content)?;

        let path = path.display().to_string();
        log_event_with_fields(
            Event::ConfigLoaded,
            &[("dialect", config.dialect.as_str()), ("path", path.as_str())],
        );

        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: CompilerConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_page_size == 0 {
            return Err(ConfigError::Invalid("max_page_size must be > 0".into()));
        }

        if self.max_page_size > i64::MAX as u64 {
            return Err(ConfigError::Invalid(format!(
                "max_page_size must be <= {}",
                i64::MAX
            )));
        }

        Ok(())
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_unknown_operator(mut self, policy: UnknownOperatorPolicy) -> Self {
        self.unknown_operator = policy;
        self
    }

    pub fn with_max_page_size(mut self, max_page_size: u64) -> Self {
        self.max_page_size = max_page_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompilerConfig::default();
        assert_eq!(config.dialect, Dialect::Ansi);
        assert_eq!(config.unknown_operator, UnknownOperatorPolicy::Ignore);
        assert_eq!(config.max_page_size, 10_000);
        assert!(!config.include_sql_in_response);
        assert!(!config.include_error_in_response);
        assert_eq!(config.log_level, Severity::Warn);
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = CompilerConfig::from_json("{}").unwrap();
        assert_eq!(config, CompilerConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config =
            CompilerConfig::from_json(r#"{"dialect": "postgres", "unknown_operator": "reject"}"#)
                .unwrap();
        assert_eq!(config.dialect, Dialect::Postgres);
        assert_eq!(config.unknown_operator, UnknownOperatorPolicy::Reject);
        assert_eq!(config.max_page_size, 10_000);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = CompilerConfig::from_json(r#"{"max_page_size": 0}"#).unwrap_err();
        assert_eq!(err.code(), "GRIDSQL_CONFIG_INVALID");
    }

    #[test]
    fn test_unknown_values_rejected() {
        let err = CompilerConfig::from_json(r#"{"dialect": "oracle"}"#).unwrap_err();
        assert_eq!(err.code(), "GRIDSQL_CONFIG_PARSE");

        let err = CompilerConfig::from_json(r#"{"dialect_name": "ansi"}"#).unwrap_err();
        assert_eq!(err.code(), "GRIDSQL_CONFIG_PARSE");
    }
}
