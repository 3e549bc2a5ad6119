//! Persisted ontology entities and their commit protocol.
//!
//! The ontology is stored as four homogeneous collections:
//!
//! - [`Term`]: controlled-vocabulary entries, identified by `namespace:local`
//! - [`Tag`]: field definitions, identified by their joined term path and
//!   numbered with a serial id at commit
//! - [`Node`]: graph vertices wrapping exactly one tag or term
//! - [`Edge`]: `subject -predicate-> object` relationships between nodes
//!
//! # Commit Protocol
//!
//! Every entity goes through the same two-phase commit implemented by
//! [`Committable::commit`]:
//!
//! 1. **Pre-commit**: the initialization invariant is checked, then identity is
//!    assigned. Tags and nodes draw a serial number from a per-collection counter;
//!    edges compute their `subject:predicate:object` identifier and refuse to
//!    overwrite an existing relationship.
//! 2. **Write**: new records are inserted (the store rejects duplicate keys
//!    atomically), committed records are upserted.
//! 3. **Post-commit**: tags write their definition through to the
//!    [`Dictionary`](crate::dictionary::Dictionary).
//!
//! Once committed, identity-bearing fields are locked and their setters return
//! [`OntologyError::ImmutableField`](crate::core::OntologyError::ImmutableField).

pub mod edge;
pub mod kinds;
pub mod node;
pub mod tag;
pub mod term;

pub use edge::Edge;
pub use kinds::{DataKind, DataType, NodeKind};
pub use node::{Node, NodeReference};
pub use tag::Tag;
pub use term::Term;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{OntologyError, Result};
use crate::dictionary::Dictionary;
use crate::store::{Collection, DocumentStore, StoredRecord};

/// Lifecycle state of an entity.
///
/// Records read back from a store are always [`EntityState::Committed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EntityState {
    /// Built in memory, never written
    #[default]
    New,
    /// Written to the store; identity fields are locked
    Committed,
}

impl EntityState {
    /// State of a record deserialized from a store.
    pub(crate) const fn persisted() -> Self {
        Self::Committed
    }

    /// Whether identity fields are locked.
    pub const fn is_committed(self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// Two-phase commit shared by every persisted entity.
pub trait Committable {
    /// Entity kind used in error messages.
    const ENTITY: &'static str;

    /// Collection the entity is stored in.
    const COLLECTION: Collection;

    /// Current lifecycle state.
    fn state(&self) -> EntityState;

    /// Record a lifecycle transition.
    fn set_state(&mut self, state: EntityState);

    /// Native identifier, once assigned.
    fn key(&self) -> Option<String>;

    /// Verify the initialization invariant.
    fn check_initialized(&self) -> Result<()>;

    /// Assign identity before the record is written.
    ///
    /// `created` is `true` for the first commit of the entity.
    fn assign_identity(&mut self, store: &dyn DocumentStore, created: bool) -> Result<()>;

    /// Snapshot the entity as a store record.
    fn to_record(&self) -> StoredRecord;

    /// Hook run after a successful write.
    fn after_commit(&self, _dictionary: &Dictionary) -> Result<()> {
        Ok(())
    }

    /// Hook run after a successful delete.
    fn after_delete(&self, _dictionary: &Dictionary) -> Result<()> {
        Ok(())
    }

    /// Commit the entity: check, assign identity, write, then run post-commit hooks.
    fn commit(&mut self, store: &dyn DocumentStore, dictionary: &Dictionary) -> Result<()> {
        self.check_initialized()?;

        let created = !self.state().is_committed();
        self.assign_identity(store, created)?;

        let mut record = self.to_record();
        record.mark_committed();
        if created {
            store.insert(record)?;
        } else {
            store.upsert(record)?;
        }
        self.set_state(EntityState::Committed);

        debug!(
            "Committed {} '{}' ({})",
            Self::ENTITY,
            self.key().unwrap_or_default(),
            if created { "created" } else { "updated" }
        );

        self.after_commit(dictionary)
    }

    /// Delete a committed entity from the store.
    ///
    /// Returns whether a record was removed. Deleting an entity that was never
    /// committed fails with [`OntologyError::NotFound`] when `assert` is set.
    fn delete(&mut self, store: &dyn DocumentStore, dictionary: &Dictionary, assert: bool) -> Result<bool> {
        let Some(key) = self.key() else {
            if assert {
                return Err(OntologyError::not_found(Self::ENTITY, "<uncommitted>"));
            }
            return Ok(false);
        };

        let removed = store.remove(Self::COLLECTION, &key)?;
        if !removed && assert {
            return Err(OntologyError::not_found(Self::ENTITY, &key));
        }

        if removed {
            self.set_state(EntityState::New);
            self.after_delete(dictionary)?;
            debug!("Deleted {} '{}'", Self::ENTITY, key);
        }
        Ok(removed)
    }
}

/// Fail with [`OntologyError::ImmutableField`] when `state` is committed.
pub(crate) fn ensure_mutable(
    state: EntityState,
    entity: &str,
    identifier: impl std::fmt::Display,
    field: &str,
) -> Result<()> {
    if state.is_committed() {
        Err(OntologyError::immutable(entity, identifier, field))
    } else {
        Ok(())
    }
}
