//! CLI command implementations.

pub mod check;
pub mod replay;
pub mod script;

use anyhow::{Context, Result};
use quill_adapter_pg::PostgresAuditSink;
use quill_audit::{AuditLogger, AuditSink, create_sink};
use quill_core::{QuillConfig, SinkBackend};
use std::path::Path;
use std::sync::Arc;

/// Load the configuration, falling back to defaults when the file is absent.
pub fn load_config(path: &Path) -> Result<QuillConfig> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "No configuration file, using defaults");
        return Ok(QuillConfig::default());
    }
    QuillConfig::from_file(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

/// Build the logger for the configured sink backend.
pub async fn build_logger(config: &QuillConfig) -> Result<AuditLogger> {
    let sink: Arc<dyn AuditSink> = match config.audit.sink.backend {
        SinkBackend::Database => {
            let sink = PostgresAuditSink::connect(&config.upstream)
                .await
                .context("failed to connect to the upstream database")?;
            sink.ensure_table(&config.audit.table).await?;
            Arc::new(sink)
        }
        _ => Arc::from(create_sink(&config.audit)?),
    };

    Ok(AuditLogger::with_sink(config.audit.clone(), sink))
}
