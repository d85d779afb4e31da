//! # quill-audit
//!
//! Audit change-log accumulation for one unit of work.
//!
//! Call sites spread across a request record what they change on an
//! [`AuditRegistry`], one entry per entity id. When the work is done the
//! registry is flushed: every entry's change document is finished, UPDATE
//! entries that recorded nothing are dropped, and the rest are written to
//! an [`AuditSink`] as one batch sharing a record-set id.
//!
//! ## Change format
//!
//! Each entry's `details` payload is a JSON object of
//! `"<key>": ["add", <value>]` tuples in append order, for example
//! `{"host.tls_connect":["add",1],"host.psk_identity":["add","abc"]}`.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use quill_audit::{ActorContext, AuditAction, AuditLogger};
//! use quill_core::AuditConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let logger = AuditLogger::new(AuditConfig::default())?;
//!
//! let mut registry = logger.begin(ActorContext::new(1, "Admin", "192.0.2.1"));
//! registry.create_host_entry(AuditAction::Update, 5, "host5")?;
//! registry.add_uint64(5, "host.tls_connect", 1)?;
//! registry.add_string(5, "host.psk_identity", "abc")?;
//!
//! let summary = logger.flush(registry).await?;
//! println!("persisted {} rows in {}", summary.persisted, summary.recordset_id);
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod entry;
pub mod error;
pub mod flush;
pub mod host;
pub mod key;
pub mod logger;
pub mod record;
pub mod registry;
pub mod script;
pub mod sink;

pub use document::{ChangeDocument, ChangeValue, FinishedDocument};
pub use entry::{ActorContext, AuditAction, AuditEntry, ResourceType};
pub use error::AuditError;
pub use flush::{FlushSummary, PreparedBatch};
pub use host::{GroupChange, HostInterface, SnmpDetails};
pub use key::ChangeKey;
pub use logger::AuditLogger;
pub use record::{AUDITLOG_COLUMNS, AUDITLOG_TABLE, AuditRecord, new_id};
pub use registry::AuditRegistry;
pub use script::{ExecuteOn, ScriptExecution, ScriptType, log_global_script};
pub use sink::{AuditSink, ConsoleSink, FileSink, MemorySink, NullSink, create_sink};
