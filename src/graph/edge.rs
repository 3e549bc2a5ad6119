//! Relationships between nodes.

use serde::{Deserialize, Serialize};

use super::{Committable, EntityState, ensure_mutable};
use crate::core::{EdgeId, NodeId, OntologyError, Result, TermId};
use crate::store::{Collection, DocumentStore, StoredRecord};

/// A `subject -predicate-> object` relationship.
///
/// The edge identifier is derived from the full triple, so at most one edge
/// exists per (subject, predicate, object). The triple is locked once committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<EdgeId>,
    subject: NodeId,
    predicate: TermId,
    object: NodeId,
    #[serde(skip, default = "EntityState::persisted")]
    state: EntityState,
}

impl Edge {
    /// Create an uncommitted edge.
    pub fn new(subject: NodeId, predicate: impl Into<TermId>, object: NodeId) -> Self {
        Self {
            id: None,
            subject,
            predicate: predicate.into(),
            object,
            state: EntityState::New,
        }
    }

    /// Identifier, computed at commit.
    pub fn id(&self) -> Option<&EdgeId> {
        self.id.as_ref()
    }

    /// Identifier the current triple would receive.
    pub fn triple_id(&self) -> EdgeId {
        EdgeId::from_triple(self.subject, &self.predicate, self.object)
    }

    pub fn subject(&self) -> NodeId {
        self.subject
    }

    pub fn predicate(&self) -> &TermId {
        &self.predicate
    }

    pub fn object(&self) -> NodeId {
        self.object
    }

    pub fn set_subject(&mut self, subject: NodeId) -> Result<()> {
        ensure_mutable(self.state, Self::ENTITY, self.triple_id(), "subject")?;
        self.subject = subject;
        Ok(())
    }

    pub fn set_predicate(&mut self, predicate: impl Into<TermId>) -> Result<()> {
        ensure_mutable(self.state, Self::ENTITY, self.triple_id(), "predicate")?;
        self.predicate = predicate.into();
        Ok(())
    }

    pub fn set_object(&mut self, object: NodeId) -> Result<()> {
        ensure_mutable(self.state, Self::ENTITY, self.triple_id(), "object")?;
        self.object = object;
        Ok(())
    }
}

impl Committable for Edge {
    const ENTITY: &'static str = "edge";
    const COLLECTION: Collection = Collection::Edges;

    fn state(&self) -> EntityState {
        self.state
    }

    fn set_state(&mut self, state: EntityState) {
        self.state = state;
    }

    fn key(&self) -> Option<String> {
        self.id.as_ref().map(ToString::to_string)
    }

    fn check_initialized(&self) -> Result<()> {
        if self.predicate.as_str().is_empty() {
            return Err(OntologyError::NotInitialized {
                entity: Self::ENTITY.to_string(),
                reason: "missing predicate".to_string(),
            });
        }
        Ok(())
    }

    fn assign_identity(&mut self, store: &dyn DocumentStore, created: bool) -> Result<()> {
        let id = self.triple_id();
        if created {
            for endpoint in [self.subject, self.object] {
                if !store.contains(Collection::Nodes, &endpoint.to_string())? {
                    return Err(OntologyError::not_found("node", endpoint));
                }
            }
            if !store.contains(Collection::Terms, self.predicate.as_str())? {
                return Err(OntologyError::not_found("term", &self.predicate));
            }
            if store.contains(Collection::Edges, id.as_str())? {
                return Err(OntologyError::Duplicate {
                    collection: Collection::Edges.to_string(),
                    identifier: id.to_string(),
                });
            }
        }
        self.id = Some(id);
        Ok(())
    }

    fn to_record(&self) -> StoredRecord {
        StoredRecord::Edge(self.clone())
    }
}
