//! Configuration types for Quill.
//!
//! Configuration is loaded from a single YAML file (`quill.yaml`) into a
//! `QuillConfig`. Every section has defaults, so an empty file is valid.

pub mod audit;
pub mod upstream;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use audit::{AuditConfig, SinkBackend, SinkConfig};
pub use upstream::{ConnectionPoolConfig, UpstreamConfig};

/// Complete Quill configuration loaded from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuillConfig {
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,

    /// Upstream Postgres connection (database sink only).
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl QuillConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // serde_yaml reads an empty document as unit, not as an empty map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audit.table.trim().is_empty() {
            return Err(ConfigError::Config("audit.table must not be empty".to_string()));
        }
        if self.audit.sink.backend == SinkBackend::File && self.audit.sink.file_path.is_none() {
            return Err(ConfigError::Config(
                "audit.sink.file_path is required for the file backend".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = QuillConfig::from_yaml("").unwrap();
        assert!(config.audit.enabled);
        assert_eq!(config.upstream.port, 5432);
    }

    #[test]
    fn test_full_document() {
        let yaml = r#"
audit:
  enabled: true
  table: audit_rows
  sink:
    backend: database
upstream:
  database_url: postgresql://quill@localhost:5432/quill
  pool:
    max_connections: 2
"#;
        let config = QuillConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.audit.table, "audit_rows");
        assert_eq!(config.audit.sink.backend, SinkBackend::Database);
        assert_eq!(config.upstream.pool.max_connections, 2);
        assert_eq!(config.upstream.pool.acquire_timeout_seconds, 30);
    }

    #[test]
    fn test_file_backend_requires_path() {
        let yaml = r#"
audit:
  sink:
    backend: file
"#;
        let err = QuillConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Config(_)));
    }

    #[test]
    fn test_blank_table_rejected() {
        let err = QuillConfig::from_yaml("audit:\n  table: \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("audit.table"));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = QuillConfig::from_yaml("audit: [").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}
