//! `quill replay` command implementation.
//!
//! Reads a change-set file describing one unit of work, accumulates it on a
//! registry and flushes it:
//!
//! ```yaml
//! actor: { user_id: 1, username: Admin, client_ip: 192.0.2.1 }
//! entries:
//!   - id: 5
//!     name: host5
//!     action: update
//!     resource: host
//!     changes:
//!       - { key: host.tls_connect, value: 1 }
//!       - { key: host.psk_identity, value: abc }
//!     interfaces:
//!       - { interface_id: 7, main: 1, type: 1, useip: 1, ip: 10.0.0.7, dns: "", port: 10050 }
//!     groups:
//!       - { groupid: 2, change: add }
//! ```

use anyhow::{Context, Result, bail};
use quill_audit::{
    ActorContext, AuditAction, AuditRegistry, GroupChange, HostInterface, ResourceType,
};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::{build_logger, load_config};

/// One unit of work.
#[derive(Debug, Deserialize)]
pub struct ChangeSet {
    #[serde(default)]
    pub actor: ActorContext,
    #[serde(default)]
    pub entries: Vec<EntrySpec>,
}

#[derive(Debug, Deserialize)]
pub struct EntrySpec {
    pub id: u64,
    pub name: String,
    pub action: AuditAction,
    pub resource: ResourceType,
    #[serde(default)]
    pub changes: Vec<ChangeSpec>,
    #[serde(default)]
    pub interfaces: Vec<HostInterface>,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
}

/// A single field append. Unsigned integers become `uint64` values,
/// strings stay strings.
#[derive(Debug, Deserialize)]
pub struct ChangeSpec {
    pub key: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct GroupSpec {
    pub groupid: u64,
    pub change: GroupChange,
}

impl ChangeSet {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse YAML or JSON.
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("invalid change-set document")
    }

    /// Accumulate every entry on `registry`.
    pub fn apply(&self, registry: &mut AuditRegistry) -> Result<()> {
        for entry in &self.entries {
            registry.create_entry(entry.action, entry.id, &entry.name, entry.resource)?;

            for change in &entry.changes {
                match &change.value {
                    serde_json::Value::String(s) => registry.add_string(entry.id, &change.key, s)?,
                    serde_json::Value::Number(n) => match n.as_u64() {
                        Some(v) => registry.add_uint64(entry.id, &change.key, v)?,
                        None => bail!(
                            "entry {}: value of '{}' must be an unsigned integer, got {}",
                            entry.id,
                            change.key,
                            n
                        ),
                    },
                    other => bail!(
                        "entry {}: value of '{}' must be a string or unsigned integer, got {}",
                        entry.id,
                        change.key,
                        other
                    ),
                }
            }

            if !entry.interfaces.is_empty() || !entry.groups.is_empty() {
                if entry.resource != ResourceType::Host {
                    bail!("entry {}: interfaces and groups apply to hosts only", entry.id);
                }
                for interface in &entry.interfaces {
                    registry.host_add_interface(entry.id, interface)?;
                }
                for group in &entry.groups {
                    registry.host_update_group(entry.id, group.groupid, group.change)?;
                }
            }
        }
        Ok(())
    }
}

pub async fn run_replay(config_path: &Path, file: &Path, dry_run: bool) -> Result<()> {
    let change_set = ChangeSet::from_file(file)?;

    if dry_run {
        let mut registry = AuditRegistry::with_actor(change_set.actor.clone());
        change_set.apply(&mut registry)?;
        let batch = registry.prepare_batch();
        for record in &batch.records {
            println!("{}", record.to_log_line());
        }
        println!(
            "recordset {}: {} rows staged, {} unchanged updates suppressed",
            batch.recordset_id,
            batch.records.len(),
            batch.suppressed
        );
        return Ok(());
    }

    let config = load_config(config_path)?;
    let logger = build_logger(&config).await?;

    let mut registry = logger.begin(change_set.actor.clone());
    change_set.apply(&mut registry)?;

    let summary = logger.flush(registry).await?;
    tracing::info!(
        recordset_id = %summary.recordset_id,
        persisted = summary.persisted,
        suppressed = summary.suppressed,
        "Replay complete"
    );
    Ok(())
}
