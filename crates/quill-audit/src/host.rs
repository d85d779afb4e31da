//! Host and script change manifests.
//!
//! Each helper is a fixed list of field appends for one domain object. Key
//! layout on the wire:
//!
//! | helper | keys |
//! |--------|------|
//! | `host_add_interface` | `host.interfaces[<id>].{main,type,useip,ip,dns,port}` |
//! | `host_update_snmp_interface` | `host.interfaces[<id>].details.{version,bulk,community,...}` |
//! | `host_add_tls_and_psk` | `host.tls_connect`, `host.tls_accept`, `host.psk_identity`, `host.psk` |
//! | `host_update_group` | `host.groups[<groupid>]` |

use serde::{Deserialize, Serialize};

use crate::entry::{AuditAction, ResourceType};
use crate::error::AuditError;
use crate::key::ChangeKey;
use crate::registry::AuditRegistry;

/// A host network interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInterface {
    pub interface_id: u64,
    pub main: u64,
    #[serde(rename = "type")]
    pub interface_type: u64,
    pub useip: u64,
    pub ip: String,
    pub dns: String,
    pub port: u64,
}

/// SNMP details of a host interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnmpDetails {
    pub version: u64,
    pub bulk: u64,
    pub community: String,
    pub securityname: String,
    pub securitylevel: u64,
    pub authpassphrase: String,
    pub privpassphrase: String,
    pub authprotocol: u64,
    pub privprotocol: u64,
    pub contextname: String,
}

/// Direction of a host group membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupChange {
    Add,
    Delete,
}

impl GroupChange {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Delete => "delete",
        }
    }
}

fn host_key() -> ChangeKey {
    ChangeKey::new("host")
}

fn interface_key(interface_id: u64) -> ChangeKey {
    host_key().field("interfaces").index(interface_id)
}

impl AuditRegistry {
    /// Start tracking a host.
    pub fn create_host_entry(
        &mut self,
        action: AuditAction,
        hostid: u64,
        name: &str,
    ) -> Result<(), AuditError> {
        self.create_entry(action, hostid, name, ResourceType::Host)
    }

    /// Record a host deletion.
    pub fn delete_host(&mut self, hostid: u64, name: &str) -> Result<(), AuditError> {
        self.create_host_entry(AuditAction::Delete, hostid, name)
    }

    /// Start tracking a script.
    pub fn create_script_entry(
        &mut self,
        action: AuditAction,
        scriptid: u64,
        name: &str,
    ) -> Result<(), AuditError> {
        self.create_entry(action, scriptid, name, ResourceType::Script)
    }

    pub fn host_add_interface(
        &mut self,
        hostid: u64,
        interface: &HostInterface,
    ) -> Result<(), AuditError> {
        let key = |field: &str| interface_key(interface.interface_id).field(field);

        self.add_uint64(hostid, key("main"), interface.main)?;
        self.add_uint64(hostid, key("type"), interface.interface_type)?;
        self.add_uint64(hostid, key("useip"), interface.useip)?;
        self.add_string(hostid, key("ip"), &interface.ip)?;
        self.add_string(hostid, key("dns"), &interface.dns)?;
        self.add_uint64(hostid, key("port"), interface.port)?;
        Ok(())
    }

    pub fn host_update_snmp_interface(
        &mut self,
        hostid: u64,
        interface_id: u64,
        snmp: &SnmpDetails,
    ) -> Result<(), AuditError> {
        let key = |field: &str| interface_key(interface_id).field("details").field(field);

        self.add_uint64(hostid, key("version"), snmp.version)?;
        self.add_uint64(hostid, key("bulk"), snmp.bulk)?;
        self.add_string(hostid, key("community"), &snmp.community)?;
        self.add_string(hostid, key("securityname"), &snmp.securityname)?;
        self.add_uint64(hostid, key("securitylevel"), snmp.securitylevel)?;
        self.add_string(hostid, key("authpassphrase"), &snmp.authpassphrase)?;
        self.add_string(hostid, key("privpassphrase"), &snmp.privpassphrase)?;
        self.add_uint64(hostid, key("authprotocol"), snmp.authprotocol)?;
        self.add_uint64(hostid, key("privprotocol"), snmp.privprotocol)?;
        self.add_string(hostid, key("contextname"), &snmp.contextname)?;
        Ok(())
    }

    pub fn host_add_tls_and_psk(
        &mut self,
        hostid: u64,
        tls_connect: u64,
        tls_accept: u64,
        psk_identity: &str,
        psk: &str,
    ) -> Result<(), AuditError> {
        self.add_uint64(hostid, host_key().field("tls_connect"), tls_connect)?;
        self.add_uint64(hostid, host_key().field("tls_accept"), tls_accept)?;
        self.add_string(hostid, host_key().field("psk_identity"), psk_identity)?;
        self.add_string(hostid, host_key().field("psk"), psk)?;
        Ok(())
    }

    /// Record a group membership change as `host.groups[<groupid>]: ["add", <change>]`.
    pub fn host_update_group(
        &mut self,
        hostid: u64,
        groupid: u64,
        change: GroupChange,
    ) -> Result<(), AuditError> {
        self.add_string(hostid, host_key().field("groups").index(groupid), change.as_str())
    }
}
