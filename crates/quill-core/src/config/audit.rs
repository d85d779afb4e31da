//! Audit logging configuration.

use serde::{Deserialize, Serialize};

/// Configuration for audit logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Whether audit logging is enabled.
    ///
    /// Gates the direct script-execution path. Accumulated change sets are
    /// always flushed once a unit of work collects them.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Table receiving audit rows.
    #[serde(default = "default_table")]
    pub table: String,

    /// Sink configuration.
    #[serde(default)]
    pub sink: SinkConfig,
}

/// Where flushed audit rows are written.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SinkConfig {
    /// Sink backend type.
    #[serde(default)]
    pub backend: SinkBackend,

    /// File path (for file backend).
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Sink backend type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SinkBackend {
    /// Print rows to stdout as JSON lines.
    #[default]
    Console,
    /// Append rows to a JSON Lines file.
    File,
    /// Insert rows into the upstream database.
    Database,
    /// Keep rows in memory.
    Memory,
    /// Discard rows.
    None,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            table: default_table(),
            sink: SinkConfig::default(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_table() -> String {
    "auditlog".to_string()
}
