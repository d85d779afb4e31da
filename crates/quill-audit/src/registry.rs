//! The per-unit-of-work audit registry.
//!
//! An [`AuditRegistry`] is created at the start of a unit of work (one
//! request, one configuration sync pass), collects entries while the work
//! runs, and is emptied by a single flush. It is an explicit context
//! object, not a global; the embedding code owns it and must not share it
//! across concurrent units of work.
//!
//! Lifecycle rules:
//! - one entry per entity id; a second `create_entry` for the same id is
//!   rejected with [`AuditError::DuplicateEntry`] and leaves the first entry
//!   untouched
//! - appends require an existing entry, otherwise
//!   [`AuditError::EntryNotFound`]
//! - entries leave the registry only through flush

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::document::ChangeValue;
use crate::entry::{ActorContext, AuditAction, AuditEntry, ResourceType};
use crate::error::AuditError;

/// Keyed collection of pending audit entries.
#[derive(Debug, Default)]
pub struct AuditRegistry {
    actor: ActorContext,
    entries: BTreeMap<u64, AuditEntry>,
}

impl AuditRegistry {
    /// Create an empty registry acting as the system actor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry on behalf of `actor`.
    pub fn with_actor(actor: ActorContext) -> Self {
        Self {
            actor,
            entries: BTreeMap::new(),
        }
    }

    pub fn actor(&self) -> &ActorContext {
        &self.actor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    /// Look up the entry for `id`.
    pub fn find(&self, id: u64) -> Option<&AuditEntry> {
        self.entries.get(&id)
    }

    /// Iterate over pending entries. Order carries no meaning.
    pub fn entries(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries.values()
    }

    /// Start tracking an entity.
    pub fn create_entry(
        &mut self,
        action: AuditAction,
        id: u64,
        name: &str,
        resource_type: ResourceType,
    ) -> Result<(), AuditError> {
        if self.entries.contains_key(&id) {
            return Err(AuditError::DuplicateEntry { id });
        }

        tracing::debug!(
            resource_id = id,
            resource_name = name,
            action = %action,
            resource_type = %resource_type,
            "Audit entry created"
        );

        self.entries
            .insert(id, AuditEntry::new(action, id, name, resource_type));
        Ok(())
    }

    /// Record `key: ["add", value]` for a string value.
    pub fn add_string(&mut self, id: u64, key: impl Display, value: &str) -> Result<(), AuditError> {
        self.add(id, key, ChangeValue::from(value))
    }

    /// Record `key: ["add", value]` for an unsigned integer value.
    pub fn add_uint64(&mut self, id: u64, key: impl Display, value: u64) -> Result<(), AuditError> {
        self.add(id, key, ChangeValue::from(value))
    }

    fn add(&mut self, id: u64, key: impl Display, value: ChangeValue) -> Result<(), AuditError> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(AuditError::EntryNotFound { id })?;
        entry.record(&key.to_string(), value)
    }

    /// Move every entry out, leaving the registry empty. This is the only
    /// way entries leave the registry, and only flush calls it.
    pub(crate) fn drain(&mut self) -> Vec<AuditEntry> {
        std::mem::take(&mut self.entries).into_values().collect()
    }
}
