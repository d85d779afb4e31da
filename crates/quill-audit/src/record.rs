//! Persisted audit rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default table receiving audit rows.
pub const AUDITLOG_TABLE: &str = "auditlog";

/// Column order used by every sink.
pub const AUDITLOG_COLUMNS: [&str; 11] = [
    "auditid",
    "userid",
    "username",
    "clock",
    "action",
    "ip",
    "resourceid",
    "resourcename",
    "resourcetype",
    "recordsetid",
    "details",
];

/// Generate a fresh opaque identifier for records and record sets.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// One persisted audit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique record id.
    #[serde(rename = "auditid")]
    pub audit_id: String,

    /// Acting user id.
    #[serde(rename = "userid")]
    pub user_id: u64,

    /// Acting user name.
    pub username: String,

    /// Epoch seconds.
    pub clock: i64,

    /// Action code (see [`crate::AuditAction::code`]).
    pub action: i32,

    /// Network origin of the request.
    pub ip: String,

    #[serde(rename = "resourceid")]
    pub resource_id: u64,

    #[serde(rename = "resourcename")]
    pub resource_name: String,

    /// Resource type code (see [`crate::ResourceType::code`]).
    #[serde(rename = "resourcetype")]
    pub resource_type: i32,

    /// Id shared by every record from one flush.
    #[serde(rename = "recordsetid")]
    pub recordset_id: String,

    /// Serialized change document.
    pub details: String,
}

impl AuditRecord {
    /// Timestamp as a UTC datetime.
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.clock, 0)
    }

    /// Parse the change payload.
    pub fn details_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.details)
    }

    /// Format the record as a human-readable log line.
    pub fn to_log_line(&self) -> String {
        let when = self
            .occurred_at()
            .map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string())
            .unwrap_or_else(|| self.clock.to_string());
        format!(
            "[{}] action={} resource={}:{} name={} recordset={} details={}",
            when,
            self.action,
            self.resource_type,
            self.resource_id,
            self.resource_name,
            self.recordset_id,
            self.details,
        )
    }
}
