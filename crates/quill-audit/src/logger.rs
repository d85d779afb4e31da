//! Audit logger implementation.
//!
//! `AuditLogger` ties a configuration to a sink. It hands out registries for
//! units of work and flushes them, and records script executions directly.

use quill_core::AuditConfig;
use std::sync::Arc;

use crate::entry::ActorContext;
use crate::error::AuditError;
use crate::flush::FlushSummary;
use crate::registry::AuditRegistry;
use crate::script::{ScriptExecution, log_global_script};
use crate::sink::{AuditSink, ConsoleSink, NullSink, create_sink};

/// The main audit logger.
pub struct AuditLogger {
    config: AuditConfig,
    sink: Arc<dyn AuditSink>,
}

impl AuditLogger {
    /// Create a new audit logger with the sink named in the configuration.
    pub fn new(config: AuditConfig) -> Result<Self, AuditError> {
        let sink: Arc<dyn AuditSink> = Arc::from(create_sink(&config)?);
        Ok(Self { config, sink })
    }

    /// Create a logger with a custom sink.
    pub fn with_sink(config: AuditConfig, sink: Arc<dyn AuditSink>) -> Self {
        Self { config, sink }
    }

    /// Create a logger with auditing disabled and a discarding sink.
    pub fn disabled() -> Self {
        Self {
            config: AuditConfig {
                enabled: false,
                ..Default::default()
            },
            sink: Arc::new(NullSink::new()),
        }
    }

    /// Create a console-only logger (useful for development).
    pub fn console_only() -> Self {
        Self {
            config: AuditConfig::default(),
            sink: Arc::new(ConsoleSink::new()),
        }
    }

    /// Check if logging is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Start a unit of work on behalf of `actor`.
    pub fn begin(&self, actor: ActorContext) -> AuditRegistry {
        AuditRegistry::with_actor(actor)
    }

    /// Flush a unit of work and drop its registry.
    pub async fn flush(&self, mut registry: AuditRegistry) -> Result<FlushSummary, AuditError> {
        registry
            .flush_to_table(self.sink.as_ref(), &self.config.table)
            .await
    }

    /// Record a global script execution.
    pub async fn log_global_script(
        &self,
        actor: &ActorContext,
        execution: &ScriptExecution,
    ) -> Result<(), AuditError> {
        log_global_script(&self.config, self.sink.as_ref(), actor, execution).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::AuditAction;
    use crate::script::{ExecuteOn, ScriptType};
    use crate::sink::MemorySink;

    fn execution() -> ScriptExecution {
        ScriptExecution {
            script_type: ScriptType::Ssh,
            execute_on: ExecuteOn::Agent,
            command: "uptime".to_string(),
            hostid: 1,
            hostname: "h1".to_string(),
            eventid: None,
            proxy_hostid: None,
            output: None,
            error: None,
        }
    }

    #[tokio::test]
    async fn test_disabled_logger() {
        let logger = AuditLogger::disabled();
        assert!(!logger.is_enabled());

        logger
            .log_global_script(&ActorContext::system(), &execution())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_console_only_logger() {
        let logger = AuditLogger::console_only();
        assert!(logger.is_enabled());

        let mut registry = logger.begin(ActorContext::system());
        registry
            .create_host_entry(AuditAction::Create, 1, "h1")
            .unwrap();
        let summary = logger.flush(registry).await.unwrap();
        assert_eq!(summary.persisted, 1);
    }

    #[tokio::test]
    async fn test_flush_uses_configured_table() {
        let sink = Arc::new(MemorySink::new());
        let config = AuditConfig {
            table: "audit_rows".to_string(),
            ..Default::default()
        };
        let logger = AuditLogger::with_sink(config, sink.clone());

        let mut registry = logger.begin(ActorContext::new(4, "ops", "198.51.100.4"));
        registry.delete_host(9, "host9").unwrap();
        logger.flush(registry).await.unwrap();

        let batches = sink.batches();
        assert_eq!(batches[0].0, "audit_rows");
        assert_eq!(batches[0].1[0].user_id, 4);
        assert_eq!(batches[0].1[0].ip, "198.51.100.4");
    }

    #[tokio::test]
    async fn test_flush_is_not_gated_by_enabled_flag() {
        let sink = Arc::new(MemorySink::new());
        let config = AuditConfig {
            enabled: false,
            ..Default::default()
        };
        let logger = AuditLogger::with_sink(config, sink.clone());

        let mut registry = logger.begin(ActorContext::system());
        registry
            .create_host_entry(AuditAction::Create, 1, "h1")
            .unwrap();
        logger.flush(registry).await.unwrap();
        assert_eq!(sink.records().len(), 1);

        logger
            .log_global_script(&ActorContext::system(), &execution())
            .await
            .unwrap();
        assert_eq!(sink.records().len(), 1);
    }

    #[test]
    fn test_new_rejects_database_backend() {
        let mut config = AuditConfig::default();
        config.sink.backend = quill_core::SinkBackend::Database;
        assert!(AuditLogger::new(config).is_err());
    }
}
