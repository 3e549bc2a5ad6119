//! Field definitions.
//!
//! A tag is identified by a path of terms: the path always has an odd length,
//! alternating subject terms and the predicates linking them, and its joined form
//! is the persistent identifier (`crop:wheat:variety`). At commit time each tag
//! also receives a numeric serial id, and its definition is written through to the
//! [`Dictionary`] so lookups by either identifier never touch the store.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Committable, DataKind, DataType, EntityState, ensure_mutable};
use crate::constants::SEQUENCE_TAGS;
use crate::core::{LanguageString, OntologyError, Result, TagId, TermId};
use crate::dictionary::{Dictionary, TagIdentifier};
use crate::store::{Collection, DocumentStore, Filter, IndexedField, StoredRecord};

/// A field definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Tag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<TagId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    serial: Option<u64>,
    #[serde(default)]
    path: Vec<TermId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_type: Option<DataType>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    kind: BTreeSet<DataKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    label: Vec<LanguageString>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    definition: Vec<LanguageString>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    description: Vec<LanguageString>,
    #[serde(skip, default = "EntityState::persisted")]
    state: EntityState,
}

impl Tag {
    /// Create an uncommitted tag from its term path.
    pub fn new<I, T>(path: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TermId>,
    {
        let mut tag = Self {
            path: path.into_iter().map(Into::into).collect(),
            ..Self::default()
        };
        tag.refresh_id();
        tag
    }

    #[must_use]
    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: DataKind) -> Self {
        self.kind.insert(kind);
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: LanguageString) -> Self {
        self.label.push(label);
        self
    }

    #[must_use]
    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Persistent identifier; `None` while the path is empty.
    pub fn id(&self) -> Option<&TagId> {
        self.id.as_ref()
    }

    /// Serial id, assigned at first commit.
    pub fn serial(&self) -> Option<u64> {
        self.serial
    }

    pub fn path(&self) -> &[TermId] {
        &self.path
    }

    pub fn data_type(&self) -> Option<DataType> {
        self.data_type
    }

    pub fn kind(&self) -> &BTreeSet<DataKind> {
        &self.kind
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
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

    /// Replace the term path; locked once committed.
    pub fn set_path(&mut self, path: Vec<TermId>) -> Result<()> {
        ensure_mutable(self.state, Self::ENTITY, self.display_id(), "path")?;
        self.path = path;
        self.refresh_id();
        Ok(())
    }

    /// Append a term to the path; locked once committed.
    pub fn push_term(&mut self, term: impl Into<TermId>) -> Result<()> {
        ensure_mutable(self.state, Self::ENTITY, self.display_id(), "path")?;
        self.path.push(term.into());
        self.refresh_id();
        Ok(())
    }

    /// Force the serial id; locked once committed.
    pub fn set_serial(&mut self, serial: u64) -> Result<()> {
        ensure_mutable(self.state, Self::ENTITY, self.display_id(), "serial")?;
        self.serial = Some(serial);
        Ok(())
    }

    pub fn set_data_type(&mut self, data_type: DataType) {
        self.data_type = Some(data_type);
    }

    pub fn add_kind(&mut self, kind: DataKind) {
        self.kind.insert(kind);
    }

    pub fn remove_kind(&mut self, kind: DataKind) -> bool {
        self.kind.remove(&kind)
    }

    pub fn set_range(&mut self, min: Option<f64>, max: Option<f64>) {
        self.min = min;
        self.max = max;
    }

    pub fn set_pattern(&mut self, pattern: Option<String>) {
        self.pattern = pattern;
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

    /// Whether the tag meets its initialization invariant.
    pub fn is_initialized(&self) -> bool {
        self.missing_requirement().is_none()
    }

    fn missing_requirement(&self) -> Option<&'static str> {
        if self.path.is_empty() {
            Some("missing term path")
        } else if self.path.len() % 2 == 0 {
            Some("term path must have an odd number of elements")
        } else if self.data_type.is_none() {
            Some("missing data type")
        } else if self.label.is_empty() {
            Some("missing label")
        } else {
            None
        }
    }

    fn refresh_id(&mut self) {
        self.id = (!self.path.is_empty()).then(|| TagId::from_path(&self.path));
    }

    fn display_id(&self) -> String {
        self.id.as_ref().map(ToString::to_string).unwrap_or_default()
    }

    fn not_initialized(reason: impl Into<String>) -> OntologyError {
        OntologyError::NotInitialized {
            entity: Self::ENTITY.to_string(),
            reason: reason.into(),
        }
    }
}

impl Committable for Tag {
    const ENTITY: &'static str = "tag";
    const COLLECTION: Collection = Collection::Tags;

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
        if let Some(reason) = self.missing_requirement() {
            return Err(Self::not_initialized(reason));
        }

        if let Some(pattern) = &self.pattern {
            Regex::new(pattern)
                .map_err(|e| Self::not_initialized(format!("invalid pattern '{pattern}': {e}")))?;
        }

        if let (Some(min), Some(max)) = (self.min, self.max)
            && min > max
        {
            return Err(Self::not_initialized(format!("range minimum {min} exceeds maximum {max}")));
        }

        Ok(())
    }

    fn assign_identity(&mut self, store: &dyn DocumentStore, created: bool) -> Result<()> {
        if !created {
            return Ok(());
        }

        match self.serial {
            None => self.serial = Some(store.next_sequence(SEQUENCE_TAGS)?),
            Some(serial) => {
                // Tags are keyed by persistent id, so serial uniqueness is checked here
                let key = self.key();
                let taken = store
                    .find(Collection::Tags, &Filter::new().eq(IndexedField::Serial, serial))?
                    .iter()
                    .any(|record| record.key() != key);
                if taken {
                    return Err(OntologyError::Duplicate {
                        collection: Collection::Tags.to_string(),
                        identifier: format!("serial {serial}"),
                    });
                }
                store.raise_sequence(SEQUENCE_TAGS, serial)?;
            }
        }
        Ok(())
    }

    fn to_record(&self) -> StoredRecord {
        StoredRecord::Tag(self.clone())
    }

    fn after_commit(&self, dictionary: &Dictionary) -> Result<()> {
        dictionary.set_tag(self, None)
    }

    fn after_delete(&self, dictionary: &Dictionary) -> Result<()> {
        if let Some(id) = &self.id {
            dictionary.delete_tag(TagIdentifier::from(id), false)?;
        }
        Ok(())
    }
}
