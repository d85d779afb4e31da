//! Direct audit records for global script executions.
//!
//! Unlike registry flushes this path writes one record immediately and is
//! gated by `audit.enabled`: when auditing is off the call succeeds without
//! touching the sink.

use chrono::Utc;
use quill_core::config::AuditConfig;
use serde::{Deserialize, Serialize};

use crate::document::ChangeDocument;
use crate::entry::{ActorContext, AuditAction, ResourceType};
use crate::error::AuditError;
use crate::key::ChangeKey;
use crate::record::{AuditRecord, new_id};
use crate::sink::AuditSink;

/// Kind of script that was executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptType {
    CustomScript,
    Ipmi,
    Ssh,
    Telnet,
    Webhook,
}

/// Where a script ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteOn {
    Agent,
    Server,
    Proxy,
}

impl ExecuteOn {
    /// Numeric code recorded in `script.execute_on`.
    pub fn code(self) -> u8 {
        match self {
            Self::Agent => 0,
            Self::Server => 1,
            Self::Proxy => 2,
        }
    }
}

/// One finished script execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptExecution {
    pub script_type: ScriptType,
    pub execute_on: ExecuteOn,
    /// Command text as configured, before macro expansion.
    pub command: String,
    pub hostid: u64,
    pub hostname: String,
    /// Set when the script was run against an event.
    #[serde(default)]
    pub eventid: Option<u64>,
    /// Set when the host is monitored by a proxy.
    #[serde(default)]
    pub proxy_hostid: Option<u64>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ScriptExecution {
    /// Build the change document. All values are recorded as strings.
    pub fn details(&self) -> Result<String, AuditError> {
        let key = |field: &str| ChangeKey::new("script").field(field).to_string();
        let mut doc = ChangeDocument::new();

        doc.add_string(&key("execute_on"), &self.execute_on.code().to_string())?;

        if let Some(eventid) = self.eventid {
            doc.add_string(&key("eventid"), &eventid.to_string())?;
        }

        doc.add_string(&key("hostid"), &self.hostid.to_string())?;

        if let Some(proxy_hostid) = self.proxy_hostid {
            doc.add_string(&key("proxy_hostid"), &proxy_hostid.to_string())?;
        }

        if self.script_type != ScriptType::Webhook {
            doc.add_string(&key("command"), &self.command)?;
        }

        if let Some(output) = &self.output {
            doc.add_string(&key("output"), output)?;
        }

        if let Some(error) = &self.error {
            doc.add_string(&key("error"), error)?;
        }

        Ok(doc.finish().into_string())
    }

    /// Build the persisted record for this execution.
    pub fn to_record(&self, actor: &ActorContext) -> Result<AuditRecord, AuditError> {
        let audit_id = new_id();
        Ok(AuditRecord {
            recordset_id: audit_id.clone(),
            audit_id,
            user_id: actor.user_id,
            username: actor.username.clone(),
            clock: Utc::now().timestamp(),
            action: AuditAction::Execute.code(),
            ip: actor.client_ip.clone(),
            resource_id: self.hostid,
            resource_name: self.hostname.clone(),
            resource_type: ResourceType::Script.code(),
            details: self.details()?,
        })
    }
}

/// Record a global script execution, if audit logging is enabled.
pub async fn log_global_script(
    config: &AuditConfig,
    sink: &dyn AuditSink,
    actor: &ActorContext,
    execution: &ScriptExecution,
) -> Result<(), AuditError> {
    if !config.enabled {
        tracing::debug!(hostid = execution.hostid, "Audit logging disabled, skipping script record");
        return Ok(());
    }

    let record = execution.to_record(actor)?;
    tracing::debug!(
        audit_id = %record.audit_id,
        hostid = execution.hostid,
        "Recording global script execution"
    );

    sink.insert_batch(&config.table, std::slice::from_ref(&record))
        .await
}
