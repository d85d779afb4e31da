//! Audit entry types.
//!
//! An [`AuditEntry`] is one entity's pending audit record inside a unit of
//! work: identity, display name, action and resource kind are fixed at
//! creation; only the change document grows.

use serde::{Deserialize, Serialize};

use crate::document::{ChangeDocument, ChangeValue};
use crate::error::AuditError;

/// Action recorded for an audited entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Execute,
}

impl AuditAction {
    /// Numeric code stored in the `action` column.
    pub fn code(self) -> i32 {
        match self {
            Self::Create => 0,
            Self::Update => 1,
            Self::Delete => 2,
            Self::Execute => 7,
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "CREATE"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
            Self::Execute => write!(f, "EXECUTE"),
        }
    }
}

/// Domain tag of an audited entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Host,
    Script,
}

impl ResourceType {
    /// Numeric code stored in the `resourcetype` column.
    pub fn code(self) -> i32 {
        match self {
            Self::Host => 4,
            Self::Script => 25,
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Host => write!(f, "HOST"),
            Self::Script => write!(f, "SCRIPT"),
        }
    }
}

/// The user on whose behalf a unit of work runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    /// User id written to `userid`. Zero is the system actor.
    #[serde(default)]
    pub user_id: u64,

    /// User name written by the script-execution path.
    #[serde(default)]
    pub username: String,

    /// Network origin written to `ip`.
    #[serde(default)]
    pub client_ip: String,
}

impl ActorContext {
    pub fn new(user_id: u64, username: impl Into<String>, client_ip: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            client_ip: client_ip.into(),
        }
    }

    /// The system actor, used for background units of work.
    pub fn system() -> Self {
        Self::default()
    }
}

/// One entity's accumulation state.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    id: u64,
    name: String,
    action: AuditAction,
    resource_type: ResourceType,
    changes: ChangeDocument,
}

impl AuditEntry {
    pub(crate) fn new(
        action: AuditAction,
        id: u64,
        name: impl Into<String>,
        resource_type: ResourceType,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            action,
            resource_type,
            changes: ChangeDocument::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn action(&self) -> AuditAction {
        self.action
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Number of change tuples recorded so far.
    pub fn change_count(&self) -> usize {
        self.changes.len()
    }

    pub(crate) fn record(&mut self, key: &str, value: ChangeValue) -> Result<(), AuditError> {
        self.changes.add(key, value)
    }

    pub(crate) fn into_parts(self) -> (AuditEntryHeader, ChangeDocument) {
        (
            AuditEntryHeader {
                id: self.id,
                name: self.name,
                action: self.action,
                resource_type: self.resource_type,
            },
            self.changes,
        )
    }
}

/// The immutable part of an entry, split off at flush time.
#[derive(Debug, Clone)]
pub(crate) struct AuditEntryHeader {
    pub id: u64,
    pub name: String,
    pub action: AuditAction,
    pub resource_type: ResourceType,
}
