//! Graph vertices.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::{Committable, DataKind, EntityState, NodeKind, ensure_mutable};
use crate::constants::SEQUENCE_NODES;
use crate::core::{LanguageString, NodeId, OntologyError, Result, TagId, TermId};
use crate::store::{Collection, DocumentStore, StoredRecord};

/// The single tag or term a node stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeReference {
    Tag(TagId),
    Term(TermId),
}

impl NodeReference {
    /// Collection holding the referenced record.
    pub const fn collection(&self) -> Collection {
        match self {
            Self::Tag(_) => Collection::Tags,
            Self::Term(_) => Collection::Terms,
        }
    }

    /// Identifier of the referenced record.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Tag(id) => id.as_str(),
            Self::Term(id) => id.as_str(),
        }
    }
}

impl fmt::Display for NodeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(id) => write!(f, "tag '{id}'"),
            Self::Term(id) => write!(f, "term '{id}'"),
        }
    }
}

/// A vertex of the ontology graph.
///
/// The node id is a serial number drawn at first commit. Symbol and row fields
/// only matter for nodes that are part of a template: the symbol names the
/// worksheet or column header, the rows locate headers and data in a workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<NodeId>,
    reference: NodeReference,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    kind: BTreeSet<NodeKind>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    data_kind: BTreeSet<DataKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    symbol_row: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_row: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    label: Vec<LanguageString>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    definition: Vec<LanguageString>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    description: Vec<LanguageString>,
    #[serde(skip, default = "EntityState::persisted")]
    state: EntityState,
}

impl Node {
    fn with_reference(reference: NodeReference) -> Self {
        Self {
            id: None,
            reference,
            kind: BTreeSet::new(),
            data_kind: BTreeSet::new(),
            symbol: None,
            symbol_row: None,
            data_row: None,
            label: Vec::new(),
            definition: Vec::new(),
            description: Vec::new(),
            state: EntityState::New,
        }
    }

    /// Create an uncommitted node standing for a tag.
    pub fn tag(tag: impl Into<TagId>) -> Self {
        Self::with_reference(NodeReference::Tag(tag.into()))
    }

    /// Create an uncommitted node standing for a term.
    pub fn term(term: impl Into<TermId>) -> Self {
        Self::with_reference(NodeReference::Term(term.into()))
    }

    #[must_use]
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind.insert(kind);
        self
    }

    #[must_use]
    pub fn with_data_kind(mut self, kind: DataKind) -> Self {
        self.data_kind.insert(kind);
        self
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    #[must_use]
    pub fn with_rows(mut self, symbol_row: u32, data_row: u32) -> Self {
        self.symbol_row = Some(symbol_row);
        self.data_row = Some(data_row);
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: LanguageString) -> Self {
        self.label.push(label);
        self
    }

    /// Serial id, assigned at first commit.
    pub fn id(&self) -> Option<NodeId> {
        self.id
    }

    pub fn reference(&self) -> &NodeReference {
        &self.reference
    }

    pub fn kind(&self) -> &BTreeSet<NodeKind> {
        &self.kind
    }

    pub fn has_kind(&self, kind: NodeKind) -> bool {
        self.kind.contains(&kind)
    }

    pub fn data_kind(&self) -> &BTreeSet<DataKind> {
        &self.data_kind
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    pub fn symbol_row(&self) -> Option<u32> {
        self.symbol_row
    }

    pub fn data_row(&self) -> Option<u32> {
        self.data_row
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

    /// Point the node at another tag or term; locked once committed.
    pub fn set_reference(&mut self, reference: NodeReference) -> Result<()> {
        ensure_mutable(self.state, Self::ENTITY, self.display_id(), "reference")?;
        self.reference = reference;
        Ok(())
    }

    /// Force the node id; locked once committed.
    pub fn set_id(&mut self, id: NodeId) -> Result<()> {
        ensure_mutable(self.state, Self::ENTITY, self.display_id(), "id")?;
        self.id = Some(id);
        Ok(())
    }

    pub fn add_kind(&mut self, kind: NodeKind) {
        self.kind.insert(kind);
    }

    pub fn add_data_kind(&mut self, kind: DataKind) {
        self.data_kind.insert(kind);
    }

    pub fn set_symbol(&mut self, symbol: Option<String>) {
        self.symbol = symbol;
    }

    pub fn set_rows(&mut self, symbol_row: Option<u32>, data_row: Option<u32>) {
        self.symbol_row = symbol_row;
        self.data_row = data_row;
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

    fn display_id(&self) -> String {
        self.id.map(|id| id.to_string()).unwrap_or_default()
    }
}

impl Committable for Node {
    const ENTITY: &'static str = "node";
    const COLLECTION: Collection = Collection::Nodes;

    fn state(&self) -> EntityState {
        self.state
    }

    fn set_state(&mut self, state: EntityState) {
        self.state = state;
    }

    fn key(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }

    fn check_initialized(&self) -> Result<()> {
        if self.reference.as_str().is_empty() {
            return Err(OntologyError::NotInitialized {
                entity: Self::ENTITY.to_string(),
                reason: "reference identifier is empty".to_string(),
            });
        }
        Ok(())
    }

    fn assign_identity(&mut self, store: &dyn DocumentStore, created: bool) -> Result<()> {
        if !created {
            return Ok(());
        }

        let target = self.reference.collection();
        if !store.contains(target, self.reference.as_str())? {
            return Err(OntologyError::not_found(
                target.entity_name(),
                self.reference.as_str(),
            ));
        }

        match self.id {
            None => self.id = Some(NodeId::new(store.next_sequence(SEQUENCE_NODES)?)),
            Some(id) => store.raise_sequence(SEQUENCE_NODES, id.get())?,
        }
        Ok(())
    }

    fn to_record(&self) -> StoredRecord {
        StoredRecord::Node(self.clone())
    }
}
