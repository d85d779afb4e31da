//! Draining a registry into persisted audit rows.
//!
//! A flush:
//! 1. generates one record-set id shared by every row it produces
//! 2. finishes each entry's change document
//! 3. drops UPDATE entries whose document is the empty object
//! 4. stages one [`AuditRecord`] per remaining entry
//! 5. hands the whole batch to the sink in one `insert_batch` call
//!
//! The registry is empty once a flush returns, whether the sink accepted
//! the batch or not. Failed batches are not retried or requeued here.

use chrono::Utc;

use crate::entry::{AuditAction, AuditEntry};
use crate::error::AuditError;
use crate::record::{AUDITLOG_TABLE, AuditRecord, new_id};
use crate::registry::AuditRegistry;
use crate::sink::AuditSink;

/// Rows staged from one registry, not yet persisted.
#[derive(Debug, Clone)]
pub struct PreparedBatch {
    /// Id shared by every record in the batch.
    pub recordset_id: String,
    /// Staged rows.
    pub records: Vec<AuditRecord>,
    /// UPDATE entries dropped because nothing changed.
    pub suppressed: usize,
}

/// Outcome of a successful flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushSummary {
    pub recordset_id: String,
    pub persisted: usize,
    pub suppressed: usize,
}

impl AuditRegistry {
    /// Drain the registry into staged records without persisting them.
    pub fn prepare_batch(&mut self) -> PreparedBatch {
        let recordset_id = new_id();
        let actor = self.actor().clone();
        let clock = Utc::now().timestamp();

        let mut records = Vec::with_capacity(self.len());
        let mut suppressed = 0;

        for entry in self.drain() {
            match stage(entry, &recordset_id, actor.user_id, &actor.client_ip, clock) {
                Some(record) => records.push(record),
                None => suppressed += 1,
            }
        }

        PreparedBatch {
            recordset_id,
            records,
            suppressed,
        }
    }

    /// Flush into the default `auditlog` table.
    pub async fn flush(&mut self, sink: &dyn AuditSink) -> Result<FlushSummary, AuditError> {
        self.flush_to_table(sink, AUDITLOG_TABLE).await
    }

    /// Finish, filter and persist every entry, leaving the registry empty.
    pub async fn flush_to_table(
        &mut self,
        sink: &dyn AuditSink,
        table: &str,
    ) -> Result<FlushSummary, AuditError> {
        tracing::debug!(entries = self.len(), table, "Flushing audit registry");

        let batch = self.prepare_batch();

        if let Err(e) = sink.insert_batch(table, &batch.records).await {
            tracing::warn!(
                recordset_id = %batch.recordset_id,
                records = batch.records.len(),
                error = %e,
                "Audit batch insert failed, records dropped"
            );
            return Err(e);
        }

        tracing::info!(
            recordset_id = %batch.recordset_id,
            persisted = batch.records.len(),
            suppressed = batch.suppressed,
            "Audit batch flushed"
        );

        Ok(FlushSummary {
            recordset_id: batch.recordset_id,
            persisted: batch.records.len(),
            suppressed: batch.suppressed,
        })
    }
}

/// Turn one entry into a row, or `None` for an UPDATE with nothing in it.
fn stage(
    entry: AuditEntry,
    recordset_id: &str,
    user_id: u64,
    ip: &str,
    clock: i64,
) -> Option<AuditRecord> {
    let (header, changes) = entry.into_parts();
    let details = changes.finish();

    if header.action == AuditAction::Update && details.is_empty_object() {
        tracing::debug!(resource_id = header.id, "Suppressing no-op update");
        return None;
    }

    Some(AuditRecord {
        audit_id: new_id(),
        user_id,
        username: String::new(),
        clock,
        action: header.action.code(),
        ip: ip.to_string(),
        resource_id: header.id,
        resource_name: header.name,
        resource_type: header.resource_type.code(),
        recordset_id: recordset_id.to_string(),
        details: details.into_string(),
    })
}
