//! Integration tests for registry accumulation and flush.
//!
//! Run with: cargo test --package quill-audit --test flush_tests

use std::collections::HashSet;
use std::sync::Arc;

use quill_audit::{
    ActorContext, AuditAction, AuditError, AuditLogger, AuditRegistry, MemorySink, ResourceType,
};
use quill_core::AuditConfig;
use serde_json::json;

/// Appends land in the document once each, in call order.
#[tokio::test]
async fn test_update_scenario_produces_one_row() {
    let sink = MemorySink::new();
    let mut registry = AuditRegistry::new();

    registry
        .create_entry(AuditAction::Update, 5, "host5", ResourceType::Host)
        .unwrap();
    registry.add_uint64(5, "host.tls_connect", 1).unwrap();
    registry.add_string(5, "host.psk_identity", "abc").unwrap();

    let summary = registry.flush(&sink).await.unwrap();
    assert_eq!(summary.persisted, 1);
    assert!(registry.is_empty());

    let records = sink.records();
    assert_eq!(records.len(), 1);
    let row = &records[0];
    assert_eq!(row.resource_id, 5);
    assert_eq!(row.resource_name, "host5");
    assert_eq!(row.action, 1);
    assert_eq!(row.resource_type, ResourceType::Host.code());
    assert_eq!(
        row.details,
        r#"{"host.tls_connect":["add",1],"host.psk_identity":["add","abc"]}"#
    );
    assert_eq!(
        row.details_value().unwrap(),
        json!({"host.tls_connect": ["add", 1], "host.psk_identity": ["add", "abc"]})
    );
}

/// No-op suppression applies to UPDATE only.
#[tokio::test]
async fn test_empty_update_suppressed_but_empty_create_kept() {
    let sink = MemorySink::new();

    let mut registry = AuditRegistry::new();
    registry
        .create_entry(AuditAction::Update, 1, "h1", ResourceType::Host)
        .unwrap();
    let summary = registry.flush(&sink).await.unwrap();
    assert_eq!(summary.persisted, 0);
    assert_eq!(summary.suppressed, 1);

    registry
        .create_entry(AuditAction::Create, 1, "h1", ResourceType::Host)
        .unwrap();
    let summary = registry.flush(&sink).await.unwrap();
    assert_eq!(summary.persisted, 1);
    assert_eq!(summary.suppressed, 0);

    assert_eq!(sink.records().len(), 1);
    assert_eq!(sink.records()[0].action, AuditAction::Create.code());
}

#[tokio::test]
async fn test_delete_without_changes_has_empty_payload() {
    let sink = MemorySink::new();
    let mut registry = AuditRegistry::new();
    registry.delete_host(9, "host9").unwrap();

    registry.flush(&sink).await.unwrap();

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].resource_id, 9);
    assert_eq!(records[0].action, AuditAction::Delete.code());
    assert_eq!(records[0].details, "{}");
}

#[tokio::test]
async fn test_rows_share_batch_id_within_one_flush_only() {
    let sink = MemorySink::new();
    let mut registry = AuditRegistry::new();
    registry
        .create_entry(AuditAction::Create, 1, "a", ResourceType::Host)
        .unwrap();
    registry
        .create_entry(AuditAction::Create, 2, "b", ResourceType::Host)
        .unwrap();

    let first = registry.flush(&sink).await.unwrap();

    let rows = sink.records();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.recordset_id == first.recordset_id));
    assert_ne!(rows[0].audit_id, rows[1].audit_id);

    registry
        .create_entry(AuditAction::Create, 3, "c", ResourceType::Host)
        .unwrap();
    let second = registry.flush(&sink).await.unwrap();
    assert_ne!(first.recordset_id, second.recordset_id);

    let ids: HashSet<String> = sink.records().into_iter().map(|r| r.audit_id).collect();
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn test_only_noop_updates_submit_empty_batch() {
    let sink = MemorySink::new();
    let mut registry = AuditRegistry::new();
    for id in 1..=3 {
        registry
            .create_entry(AuditAction::Update, id, &format!("h{}", id), ResourceType::Host)
            .unwrap();
    }

    let summary = registry.flush(&sink).await.unwrap();
    assert_eq!(summary.persisted, 0);
    assert_eq!(summary.suppressed, 3);

    let batches = sink.batches();
    assert_eq!(batches.len(), 1);
    assert!(batches[0].1.is_empty());
}

#[tokio::test]
async fn test_duplicate_create_never_merges() {
    let sink = MemorySink::new();
    let mut registry = AuditRegistry::new();
    registry
        .create_entry(AuditAction::Create, 7, "original", ResourceType::Host)
        .unwrap();
    registry.add_string(7, "host.host", "original").unwrap();

    let err = registry
        .create_entry(AuditAction::Update, 7, "impostor", ResourceType::Host)
        .unwrap_err();
    assert!(matches!(err, AuditError::DuplicateEntry { id: 7 }));

    registry.flush(&sink).await.unwrap();
    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].resource_name, "original");
    assert_eq!(records[0].action, AuditAction::Create.code());
    assert_eq!(records[0].details, r#"{"host.host":["add","original"]}"#);
}

#[tokio::test]
async fn test_storage_failure_drops_batch_and_clears_registry() {
    let sink = MemorySink::failing("connection reset");
    let mut registry = AuditRegistry::new();
    registry
        .create_entry(AuditAction::Create, 1, "a", ResourceType::Host)
        .unwrap();

    let err = registry.flush(&sink).await.unwrap_err();
    assert!(matches!(err, AuditError::StorageError(_)));
    assert!(registry.is_empty());

    // the dropped batch is not replayed once storage recovers
    sink.set_failure(None);
    registry.flush(&sink).await.unwrap();
    assert!(sink.records().is_empty());
}

#[tokio::test]
async fn test_logger_unit_of_work() {
    let sink = Arc::new(MemorySink::new());
    let logger = AuditLogger::with_sink(AuditConfig::default(), sink.clone());

    let mut registry = logger.begin(ActorContext::new(2, "Admin", "203.0.113.9"));
    registry
        .create_host_entry(AuditAction::Update, 10, "web-01")
        .unwrap();
    registry
        .host_add_tls_and_psk(10, 2, 2, "psk-web", "secret")
        .unwrap();
    registry
        .create_host_entry(AuditAction::Update, 11, "web-02")
        .unwrap();

    let summary = logger.flush(registry).await.unwrap();
    assert_eq!(summary.persisted, 1);
    assert_eq!(summary.suppressed, 1);

    let records = sink.records();
    assert_eq!(records[0].resource_id, 10);
    assert_eq!(records[0].user_id, 2);
    assert_eq!(records[0].username, "");
    assert_eq!(records[0].ip, "203.0.113.9");
}
