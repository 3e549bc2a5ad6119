//! Document store abstraction.
//!
//! The ontology lives in four homogeneous collections ([`Collection`]). Records
//! carry a `record` discriminator when serialized so a snapshot can be checked
//! for misplaced entries on load. Lookups go through [`DocumentStore::find`] with a
//! [`Filter`] of equality and membership clauses over a fixed set of indexed
//! fields; everything above this module stays unaware of how records are held.
//!
//! [`MemoryStore`] is the bundled implementation: a set of in-process tables that
//! can be saved to and loaded from a JSON snapshot.

pub mod memory;

pub use memory::{MemoryStore, StoreSnapshot};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::core::{NodeId, OntologyError, Result, TagId, TermId};
use crate::graph::{Committable, Edge, EntityState, Node, Tag, Term};

/// One of the four collections of the ontology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Terms,
    Tags,
    Nodes,
    Edges,
}

impl Collection {
    /// All collections, in load order.
    pub const ALL: [Self; 4] = [Self::Terms, Self::Tags, Self::Nodes, Self::Edges];

    /// Collection name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Terms => "terms",
            Self::Tags => "tags",
            Self::Nodes => "nodes",
            Self::Edges => "edges",
        }
    }

    /// Singular name of the entities held.
    pub const fn entity_name(self) -> &'static str {
        match self {
            Self::Terms => "term",
            Self::Tags => "tag",
            Self::Nodes => "node",
            Self::Edges => "edge",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = OntologyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "terms" | "term" => Ok(Self::Terms),
            "tags" | "tag" => Ok(Self::Tags),
            "nodes" | "node" => Ok(Self::Nodes),
            "edges" | "edge" => Ok(Self::Edges),
            _ => Err(OntologyError::InvalidCollection {
                collection: s.to_string(),
            }),
        }
    }
}

/// A record of any collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "lowercase")]
pub enum StoredRecord {
    Term(Term),
    Tag(Tag),
    Node(Node),
    Edge(Edge),
}

impl StoredRecord {
    /// Collection the record belongs to.
    pub const fn collection(&self) -> Collection {
        match self {
            Self::Term(_) => Collection::Terms,
            Self::Tag(_) => Collection::Tags,
            Self::Node(_) => Collection::Nodes,
            Self::Edge(_) => Collection::Edges,
        }
    }

    /// Native identifier of the record.
    pub fn key(&self) -> Option<String> {
        match self {
            Self::Term(term) => term.key(),
            Self::Tag(tag) => tag.key(),
            Self::Node(node) => node.key(),
            Self::Edge(edge) => edge.key(),
        }
    }

    pub(crate) fn mark_committed(&mut self) {
        match self {
            Self::Term(term) => term.set_state(EntityState::Committed),
            Self::Tag(tag) => tag.set_state(EntityState::Committed),
            Self::Node(node) => node.set_state(EntityState::Committed),
            Self::Edge(edge) => edge.set_state(EntityState::Committed),
        }
    }

    /// Values the record holds for an indexed field.
    ///
    /// Multi-valued fields (a tag's term path) yield one value per element; fields
    /// that do not apply to the record's collection yield nothing.
    pub fn field_values(&self, field: IndexedField) -> Vec<Value> {
        match (field, self) {
            (IndexedField::Id, record) => record.key().map(Value::from).into_iter().collect(),
            (IndexedField::Subject, Self::Edge(edge)) => vec![Value::from(edge.subject().get())],
            (IndexedField::Predicate, Self::Edge(edge)) => {
                vec![Value::from(edge.predicate().as_str())]
            }
            (IndexedField::Object, Self::Edge(edge)) => vec![Value::from(edge.object().get())],
            (IndexedField::Serial, Self::Tag(tag)) => tag.serial().map(Value::from).into_iter().collect(),
            (IndexedField::Serial, Self::Node(node)) => {
                node.id().map(|id| Value::from(id.get())).into_iter().collect()
            }
            (IndexedField::TermPath, Self::Tag(tag)) => {
                tag.path().iter().map(|term| Value::from(term.as_str())).collect()
            }
            (IndexedField::Reference, Self::Node(node)) => {
                vec![Value::from(node.reference().as_str())]
            }
            _ => Vec::new(),
        }
    }
}

macro_rules! record_conversions {
    ($($variant:ident => $entity:ty),* $(,)?) => {
        $(
            impl From<$entity> for StoredRecord {
                fn from(entity: $entity) -> Self {
                    Self::$variant(entity)
                }
            }

            impl TryFrom<StoredRecord> for $entity {
                type Error = OntologyError;

                fn try_from(record: StoredRecord) -> Result<Self> {
                    match record {
                        StoredRecord::$variant(entity) => Ok(entity),
                        other => Err(OntologyError::InvalidCollection {
                            collection: other.collection().to_string(),
                        }),
                    }
                }
            }
        )*
    };
}

record_conversions!(Term => Term, Tag => Tag, Node => Node, Edge => Edge);

/// Fields a [`Filter`] can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexedField {
    /// Native identifier of any record
    Id,
    /// Edge subject node
    Subject,
    /// Edge predicate term
    Predicate,
    /// Edge object node
    Object,
    /// Tag serial or node id
    Serial,
    /// Any element of a tag's term path
    TermPath,
    /// Identifier referenced by a node
    Reference,
}

/// A single filter clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// The field holds exactly this value
    Eq(IndexedField, Value),
    /// The field holds one of these values
    In(IndexedField, Vec<Value>),
}

impl Clause {
    fn matches(&self, record: &StoredRecord) -> bool {
        match self {
            Self::Eq(field, value) => record.field_values(*field).iter().any(|v| v == value),
            Self::In(field, values) => record
                .field_values(*field)
                .iter()
                .any(|v| values.contains(v)),
        }
    }
}

/// Conjunction of clauses; an empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality clause.
    #[must_use]
    pub fn eq(mut self, field: IndexedField, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause::Eq(field, value.into()));
        self
    }

    /// Add a membership clause.
    #[must_use]
    pub fn is_in<I, V>(mut self, field: IndexedField, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.clauses
            .push(Clause::In(field, values.into_iter().map(Into::into).collect()));
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn matches(&self, record: &StoredRecord) -> bool {
        self.clauses.iter().all(|clause| clause.matches(record))
    }
}

/// Storage backend for the ontology collections.
///
/// Implementations must make [`DocumentStore::insert`] atomic with respect to key
/// uniqueness, and must return records of [`DocumentStore::find`] in insertion order.
pub trait DocumentStore: Send + Sync {
    /// Fetch one record by native identifier.
    fn get(&self, collection: Collection, key: &str) -> Result<Option<StoredRecord>>;

    /// All records of `collection` matching `filter`, in insertion order.
    fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<StoredRecord>>;

    /// Insert a new record; fails with [`OntologyError::Duplicate`] if the key exists.
    fn insert(&self, record: StoredRecord) -> Result<()>;

    /// Insert or replace a record.
    fn upsert(&self, record: StoredRecord) -> Result<()>;

    /// Remove a record, returning whether it existed.
    fn remove(&self, collection: Collection, key: &str) -> Result<bool>;

    /// Draw the next value of a named counter, starting at 1.
    fn next_sequence(&self, counter: &str) -> Result<u64>;

    /// Raise a counter so later draws never return `at_least` or anything below.
    fn raise_sequence(&self, counter: &str, at_least: u64) -> Result<()>;

    /// Whether a record exists.
    fn contains(&self, collection: Collection, key: &str) -> Result<bool> {
        Ok(self.get(collection, key)?.is_some())
    }

    /// Number of records in a collection.
    fn count(&self, collection: Collection) -> Result<usize> {
        Ok(self.find(collection, &Filter::new())?.len())
    }
}

/// Typed accessors layered over any [`DocumentStore`].
pub trait DocumentStoreExt {
    fn get_term(&self, id: &TermId) -> Result<Option<Term>>;
    fn get_tag(&self, id: &TagId) -> Result<Option<Tag>>;
    fn get_node(&self, id: NodeId) -> Result<Option<Node>>;
    fn find_tags(&self, filter: &Filter) -> Result<Vec<Tag>>;
    fn find_edges(&self, filter: &Filter) -> Result<Vec<Edge>>;
}

fn typed<T>(record: Option<StoredRecord>) -> Result<Option<T>>
where
    T: TryFrom<StoredRecord, Error = OntologyError>,
{
    record.map(T::try_from).transpose()
}

fn typed_all<T>(records: Vec<StoredRecord>) -> Result<Vec<T>>
where
    T: TryFrom<StoredRecord, Error = OntologyError>,
{
    records.into_iter().map(T::try_from).collect()
}

impl<S: DocumentStore + ?Sized> DocumentStoreExt for S {
    fn get_term(&self, id: &TermId) -> Result<Option<Term>> {
        typed(self.get(Collection::Terms, id.as_str())?)
    }

    fn get_tag(&self, id: &TagId) -> Result<Option<Tag>> {
        typed(self.get(Collection::Tags, id.as_str())?)
    }

    fn get_node(&self, id: NodeId) -> Result<Option<Node>> {
        typed(self.get(Collection::Nodes, &id.to_string())?)
    }

    fn find_tags(&self, filter: &Filter) -> Result<Vec<Tag>> {
        typed_all(self.find(Collection::Tags, filter)?)
    }

    fn find_edges(&self, filter: &Filter) -> Result<Vec<Edge>> {
        typed_all(self.find(Collection::Edges, filter)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_parsing() {
        assert_eq!("tags".parse::<Collection>().unwrap(), Collection::Tags);
        assert_eq!("Edge".parse::<Collection>().unwrap(), Collection::Edges);
        assert!(matches!(
            "shapes".parse::<Collection>().unwrap_err(),
            OntologyError::InvalidCollection { .. }
        ));
    }

    #[test]
    fn test_filter_matches_edge_fields() {
        let record = StoredRecord::from(Edge::new(NodeId::new(3), "predicate:index", NodeId::new(7)));

        assert!(Filter::new().matches(&record));
        assert!(
            Filter::new()
                .eq(IndexedField::Predicate, "predicate:index")
                .is_in(IndexedField::Object, [5u64, 7])
                .matches(&record)
        );
        assert!(!Filter::new().eq(IndexedField::Subject, 7u64).matches(&record));
        // Fields foreign to the collection never match
        assert!(!Filter::new().eq(IndexedField::TermPath, "crop").matches(&record));
    }

    #[test]
    fn test_record_carries_discriminator() {
        let record = StoredRecord::from(Term::new("crop", "wheat"));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["record"], "term");
        assert_eq!(json["id"], "crop:wheat");

        let back: StoredRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.collection(), Collection::Terms);
    }

    #[test]
    fn test_wrong_variant_conversion_fails() {
        let record = StoredRecord::from(Term::new("crop", "wheat"));
        let err = Tag::try_from(record).unwrap_err();
        assert!(matches!(err, OntologyError::InvalidCollection { .. }));
    }
}
