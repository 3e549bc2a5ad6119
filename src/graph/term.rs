//! Controlled-vocabulary terms.

use serde::{Deserialize, Serialize};

use super::{Committable, EntityState, ensure_mutable};
use crate::core::{LanguageString, OntologyError, Result, TermId};
use crate::store::{Collection, DocumentStore, StoredRecord};

/// A term of the controlled vocabulary.
///
/// Terms are identified by `namespace:local`. Predicates of edges are terms too,
/// see the `predicate:*` constants in [`crate::constants`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    id: TermId,
    #[serde(default)]
    namespace: String,
    local: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    label: Vec<LanguageString>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    definition: Vec<LanguageString>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    description: Vec<LanguageString>,
    #[serde(skip, default = "EntityState::persisted")]
    state: EntityState,
}

impl Term {
    /// Create an uncommitted term.
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let local = local.into();
        Self {
            id: TermId::from_parts(&namespace, &local),
            namespace,
            local,
            label: Vec::new(),
            definition: Vec::new(),
            description: Vec::new(),
            state: EntityState::New,
        }
    }

    /// Builder form of [`Term::add_label`].
    #[must_use]
    pub fn with_label(mut self, label: LanguageString) -> Self {
        self.label.push(label);
        self
    }

    /// Builder form of [`Term::add_definition`].
    #[must_use]
    pub fn with_definition(mut self, definition: LanguageString) -> Self {
        self.definition.push(definition);
        self
    }

    pub fn id(&self) -> &TermId {
        &self.id
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    pub fn label(&self) -> &[LanguageString] {
        &self.label
    }

    pub fn definition(&self) -> &[LanguageString] {
        &self.definition
    }

    pub fn description(&self) -> &[LanguageString] {
        &self.description
    }

    /// Change the namespace; locked once committed.
    pub fn set_namespace(&mut self, namespace: impl Into<String>) -> Result<()> {
        ensure_mutable(self.state, Self::ENTITY, &self.id, "namespace")?;
        self.namespace = namespace.into();
        self.id = TermId::from_parts(&self.namespace, &self.local);
        Ok(())
    }

    /// Change the local identifier; locked once committed.
    pub fn set_local(&mut self, local: impl Into<String>) -> Result<()> {
        ensure_mutable(self.state, Self::ENTITY, &self.id, "local")?;
        self.local = local.into();
        self.id = TermId::from_parts(&self.namespace, &self.local);
        Ok(())
    }

    pub fn add_label(&mut self, label: LanguageString) {
        self.label.push(label);
    }

    pub fn add_definition(&mut self, definition: LanguageString) {
        self.definition.push(definition);
    }

    pub fn add_description(&mut self, description: LanguageString) {
        self.description.push(description);
    }

    /// Whether the term can be committed.
    pub fn is_initialized(&self) -> bool {
        !self.local.is_empty()
    }
}

impl Committable for Term {
    const ENTITY: &'static str = "term";
    const COLLECTION: Collection = Collection::Terms;

    fn state(&self) -> EntityState {
        self.state
    }

    fn set_state(&mut self, state: EntityState) {
        self.state = state;
    }

    fn key(&self) -> Option<String> {
        Some(self.id.to_string())
    }

    fn check_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(OntologyError::NotInitialized {
                entity: Self::ENTITY.to_string(),
                reason: "missing local identifier".to_string(),
            })
        }
    }

    fn assign_identity(&mut self, _store: &dyn DocumentStore, _created: bool) -> Result<()> {
        Ok(())
    }

    fn to_record(&self) -> StoredRecord {
        StoredRecord::Term(self.clone())
    }
}
