//! Audit sinks.
//!
//! A sink receives finished batches of [`AuditRecord`]s and persists them.
//! Every record in one `insert_batch` call belongs to the same flush.

use async_trait::async_trait;
use quill_core::config::{AuditConfig, SinkBackend};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use crate::error::AuditError;
use crate::record::AuditRecord;

/// Trait for audit storage backends.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Persist `records` into `table` as one batch.
    ///
    /// An empty batch must succeed without side effects.
    async fn insert_batch(&self, table: &str, records: &[AuditRecord]) -> Result<(), AuditError>;
}

/// Create a sink based on configuration.
///
/// The database backend lives in `quill-adapter-pg`; callers that configure
/// it must construct that sink themselves.
pub fn create_sink(config: &AuditConfig) -> Result<Box<dyn AuditSink>, AuditError> {
    match config.sink.backend {
        SinkBackend::Console => Ok(Box::new(ConsoleSink::new())),
        SinkBackend::File => {
            let path = config.sink.file_path.as_deref().unwrap_or("audit.jsonl");
            Ok(Box::new(FileSink::new(path)))
        }
        SinkBackend::Memory => Ok(Box::new(MemorySink::new())),
        SinkBackend::None => Ok(Box::new(NullSink::new())),
        SinkBackend::Database => Err(AuditError::StorageError(
            "database sink must be created by the postgres adapter".to_string(),
        )),
    }
}

/// Console sink (one JSON line per record on stdout).
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditSink for ConsoleSink {
    async fn insert_batch(&self, _table: &str, records: &[AuditRecord]) -> Result<(), AuditError> {
        for record in records {
            println!("{}", serde_json::to_string(record)?);
        }
        Ok(())
    }
}

/// File sink (appends JSON Lines to a file).
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    // serializes appends from concurrent flushes
    lock: Mutex<()>,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditSink for FileSink {
    async fn insert_batch(&self, _table: &str, records: &[AuditRecord]) -> Result<(), AuditError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut buffer = String::new();
        for record in records {
            buffer.push_str(&serde_json::to_string(record)?);
            buffer.push('\n');
        }

        let _guard = self
            .lock
            .lock()
            .map_err(|e| AuditError::StorageError(format!("Failed to acquire file lock: {}", e)))?;

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(buffer.as_bytes())?;
        file.flush()?;

        Ok(())
    }
}

/// In-memory sink. Keeps every batch it receives; can be switched into a
/// failing mode to simulate a storage outage.
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: RwLock<Vec<(String, Vec<AuditRecord>)>>,
    fail_with: RwLock<Option<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose inserts always fail with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            batches: RwLock::new(Vec::new()),
            fail_with: RwLock::new(Some(message.into())),
        }
    }

    /// Make subsequent inserts fail (`Some`) or succeed (`None`).
    pub fn set_failure(&self, message: Option<String>) {
        if let Ok(mut fail_with) = self.fail_with.write() {
            *fail_with = message;
        }
    }

    /// Every batch received so far, with its target table.
    pub fn batches(&self) -> Vec<(String, Vec<AuditRecord>)> {
        self.batches.read().map(|b| b.clone()).unwrap_or_default()
    }

    /// Every record received so far, in insertion order.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.batches()
            .into_iter()
            .flat_map(|(_, records)| records)
            .collect()
    }
}

#[async_trait]
impl AuditSink for MemorySink {
    async fn insert_batch(&self, table: &str, records: &[AuditRecord]) -> Result<(), AuditError> {
        let failure = self
            .fail_with
            .read()
            .map_err(|e| AuditError::StorageError(format!("Failed to acquire read lock: {}", e)))?
            .clone();
        if let Some(message) = failure {
            return Err(AuditError::StorageError(message));
        }

        let mut batches = self
            .batches
            .write()
            .map_err(|e| AuditError::StorageError(format!("Failed to acquire write lock: {}", e)))?;
        batches.push((table.to_string(), records.to_vec()));
        Ok(())
    }
}

/// Sink that accepts and discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl NullSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditSink for NullSink {
    async fn insert_batch(&self, _table: &str, _records: &[AuditRecord]) -> Result<(), AuditError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AUDITLOG_TABLE, new_id};

    fn record(resource_id: u64) -> AuditRecord {
        AuditRecord {
            audit_id: new_id(),
            user_id: 0,
            username: String::new(),
            clock: 1_700_000_000,
            action: 0,
            ip: String::new(),
            resource_id,
            resource_name: format!("host{}", resource_id),
            resource_type: 4,
            recordset_id: "set".to_string(),
            details: "{}".to_string(),
        }
    }

    #[tokio::test]
    async fn test_console_sink() {
        let sink = ConsoleSink::new();
        sink.insert_batch(AUDITLOG_TABLE, &[record(1)]).await.unwrap();
        sink.insert_batch(AUDITLOG_TABLE, &[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_sink_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let sink = FileSink::new(&path);

        sink.insert_batch(AUDITLOG_TABLE, &[record(1), record(2)])
            .await
            .unwrap();
        sink.insert_batch(AUDITLOG_TABLE, &[record(3)]).await.unwrap();
        sink.insert_batch(AUDITLOG_TABLE, &[]).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<AuditRecord> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[2].resource_id, 3);
    }

    #[tokio::test]
    async fn test_file_sink_empty_batch_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let sink = FileSink::new(&path);

        sink.insert_batch(AUDITLOG_TABLE, &[]).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_memory_sink_failure_toggle() {
        let sink = MemorySink::failing("database is down");
        let err = sink
            .insert_batch(AUDITLOG_TABLE, &[record(1)])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("database is down"));
        assert!(sink.records().is_empty());

        sink.set_failure(None);
        sink.insert_batch("custom_table", &[record(1)]).await.unwrap();

        let batches = sink.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].0, "custom_table");
        assert_eq!(sink.records().len(), 1);
    }

    #[test]
    fn test_create_sink_from_config() {
        let mut config = AuditConfig::default();
        assert!(create_sink(&config).is_ok());

        config.sink.backend = SinkBackend::None;
        assert!(create_sink(&config).is_ok());

        config.sink.backend = SinkBackend::Database;
        assert!(matches!(
            create_sink(&config),
            Err(AuditError::StorageError(_))
        ));
    }
}
