//! Memoizing graph traversal session.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::constants::PREDICATE_SUBCLASS_OF;
use crate::core::{NodeId, OntologyError, Result, TagId, TermId, select_language};
use crate::dictionary::Dictionary;
use crate::graph::{DataKind, DataType, NodeKind, NodeReference};
use crate::store::{Collection, DocumentStore, DocumentStoreExt, Filter, IndexedField};

/// Which end of an edge a traversal starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Edges pointing at the node; the far end is the subject
    Incoming,
    /// Edges leaving the node; the far end is the object
    Outgoing,
}

impl Direction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = OntologyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "in" | "incoming" => Ok(Self::Incoming),
            "out" | "outgoing" => Ok(Self::Outgoing),
            _ => Err(OntologyError::template(format!(
                "unsupported traversal direction '{s}'"
            ))),
        }
    }
}

/// Cached copy of a term.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedTerm {
    pub id: TermId,
    pub label: Option<String>,
    pub definition: Option<String>,
}

/// Cached copy of a tag.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedTag {
    pub id: TagId,
    pub serial: Option<u64>,
    pub data_type: Option<DataType>,
    pub kind: BTreeSet<DataKind>,
    pub label: Option<String>,
    pub definition: Option<String>,
}

/// Cached copy of a node.
///
/// `data_kind` merges the node's own flags with those of its tag, and `label`
/// falls back to the term or tag label when the node has none.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedNode {
    pub id: NodeId,
    pub reference: NodeReference,
    pub kind: BTreeSet<NodeKind>,
    pub data_kind: BTreeSet<DataKind>,
    pub symbol: Option<String>,
    pub symbol_row: Option<u32>,
    pub data_row: Option<u32>,
    pub label: Option<String>,
    pub definition: Option<String>,
}

impl CachedNode {
    pub fn has_kind(&self, kind: NodeKind) -> bool {
        self.kind.contains(&kind)
    }

    pub fn is_mandatory(&self) -> bool {
        self.data_kind.contains(&DataKind::Mandatory)
    }
}

/// Traversal session rooted at one node.
///
/// Every node, tag and term reached is memoized for the lifetime of the session,
/// with language-tagged fields collapsed to the session language.
pub struct CachedStructure {
    store: Arc<dyn DocumentStore>,
    dictionary: Dictionary,
    root: NodeId,
    language: String,
    tags: HashMap<TagId, CachedTag>,
    terms: HashMap<TermId, CachedTerm>,
    nodes: HashMap<NodeId, CachedNode>,
}

impl fmt::Debug for CachedStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedStructure")
            .field("root", &self.root)
            .field("language", &self.language)
            .field("nodes", &self.nodes.len())
            .field("tags", &self.tags.len())
            .field("terms", &self.terms.len())
            .finish_non_exhaustive()
    }
}

impl CachedStructure {
    /// Open a session on `root`, caching the root node.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        dictionary: Dictionary,
        root: NodeId,
        language: impl Into<String>,
    ) -> Result<Self> {
        let mut structure = Self {
            store,
            dictionary,
            root,
            language: language.into(),
            tags: HashMap::new(),
            terms: HashMap::new(),
            nodes: HashMap::new(),
        };
        structure.cache_node(root)?;
        Ok(structure)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn node(&self, id: NodeId) -> Option<&CachedNode> {
        self.nodes.get(&id)
    }

    pub fn tag(&self, id: &TagId) -> Option<&CachedTag> {
        self.tags.get(id)
    }

    pub fn term(&self, id: &TermId) -> Option<&CachedTerm> {
        self.terms.get(id)
    }

    pub fn nodes(&self) -> &HashMap<NodeId, CachedNode> {
        &self.nodes
    }

    /// Display label of a cached node, or its id when it has none.
    pub fn display_name(&self, id: NodeId) -> String {
        self.nodes
            .get(&id)
            .and_then(|node| node.symbol.clone().or_else(|| node.label.clone()))
            .unwrap_or_else(|| id.to_string())
    }

    /// Drop all memoized records except the root.
    pub fn clear(&mut self) -> Result<()> {
        self.tags.clear();
        self.terms.clear();
        self.nodes.clear();
        self.cache_node(self.root)?;
        Ok(())
    }

    /// Cache one record of `collection` by native identifier.
    ///
    /// Caching a node also caches its tag or term. Edges are never cached.
    pub fn cache_object(&mut self, collection: Collection, key: &str) -> Result<()> {
        match collection {
            Collection::Terms => self.cache_term(&TermId::new(key)).map(|_| ()),
            Collection::Tags => self.cache_tag(&TagId::new(key)).map(|_| ()),
            Collection::Nodes => {
                let id: NodeId = key.parse().map_err(|_| OntologyError::InvalidInput {
                    reason: format!("'{key}' is not a node id"),
                })?;
                self.cache_node(id).map(|_| ())
            }
            Collection::Edges => Err(OntologyError::InvalidCollection {
                collection: collection.to_string(),
            }),
        }
    }

    /// Cache a term, returning the cached copy.
    pub fn cache_term(&mut self, id: &TermId) -> Result<&CachedTerm> {
        if !self.terms.contains_key(id) {
            let term = self
                .store
                .get_term(id)?
                .ok_or_else(|| OntologyError::not_found("term", id))?;
            let cached = CachedTerm {
                id: id.clone(),
                label: select_language(term.label(), &self.language).map(str::to_string),
                definition: select_language(term.definition(), &self.language).map(str::to_string),
            };
            trace!("Cached term '{}'", id);
            self.terms.insert(id.clone(), cached);
        }
        self.terms.get(id).ok_or_else(|| OntologyError::not_found("term", id))
    }

    /// Cache a tag, returning the cached copy.
    ///
    /// A committed tag unknown to the dictionary is written through to it.
    pub fn cache_tag(&mut self, id: &TagId) -> Result<&CachedTag> {
        if !self.tags.contains_key(id) {
            let tag = self
                .store
                .get_tag(id)?
                .ok_or_else(|| OntologyError::not_found("tag", id))?;

            if tag.serial().is_some() && self.dictionary.resolve_serial(id.as_str(), false)?.is_none() {
                debug!("Warming dictionary with tag '{}'", id);
                self.dictionary.set_tag(&tag, None)?;
            }

            let cached = CachedTag {
                id: id.clone(),
                serial: tag.serial(),
                data_type: tag.data_type(),
                kind: tag.kind().clone(),
                label: select_language(tag.label(), &self.language).map(str::to_string),
                definition: select_language(tag.definition(), &self.language).map(str::to_string),
            };
            trace!("Cached tag '{}'", id);
            self.tags.insert(id.clone(), cached);
        }
        self.tags.get(id).ok_or_else(|| OntologyError::not_found("tag", id))
    }

    /// Cache a node and the tag or term it references, returning the cached node.
    pub fn cache_node(&mut self, id: NodeId) -> Result<&CachedNode> {
        if !self.nodes.contains_key(&id) {
            let node = self
                .store
                .get_node(id)?
                .ok_or_else(|| OntologyError::not_found("node", id))?;

            let mut data_kind = node.data_kind().clone();
            let (fallback_label, fallback_definition) = match node.reference() {
                NodeReference::Term(term_id) => {
                    let term = self.cache_term(term_id)?;
                    (term.label.clone(), term.definition.clone())
                }
                NodeReference::Tag(tag_id) => {
                    let tag = self.cache_tag(tag_id)?;
                    data_kind.extend(tag.kind.iter().copied());
                    (tag.label.clone(), tag.definition.clone())
                }
            };

            let cached = CachedNode {
                id,
                reference: node.reference().clone(),
                kind: node.kind().clone(),
                data_kind,
                symbol: node.symbol().map(str::to_string),
                symbol_row: node.symbol_row(),
                data_row: node.data_row(),
                label: select_language(node.label(), &self.language)
                    .map(str::to_string)
                    .or(fallback_label),
                definition: select_language(node.definition(), &self.language)
                    .map(str::to_string)
                    .or(fallback_definition),
            };
            trace!("Cached node {} ({})", id, cached.reference);
            self.nodes.insert(id, cached);
        }
        self.nodes.get(&id).ok_or_else(|| OntologyError::not_found("node", id))
    }

    /// Collect the nodes related to `origins`, grouped by predicate.
    ///
    /// With a non-empty `predicates` filter only those predicates are followed;
    /// an empty filter follows every predicate. `subclass-of` edges are always
    /// followed and never reported: their far end joins the traversal, so a
    /// subclass inherits the relationships of its superclass (or the reverse,
    /// depending on `direction`). Each far end appears once per predicate and is
    /// cached along with its tag or term.
    pub fn get_relationships(
        &mut self,
        origins: &[NodeId],
        direction: Direction,
        predicates: &[&str],
    ) -> Result<BTreeMap<String, Vec<NodeId>>> {
        let filter: Option<BTreeSet<&str>> = (!predicates.is_empty()).then(|| {
            predicates
                .iter()
                .copied()
                .chain(std::iter::once(PREDICATE_SUBCLASS_OF))
                .collect()
        });

        let near_field = match direction {
            Direction::Outgoing => IndexedField::Subject,
            Direction::Incoming => IndexedField::Object,
        };

        let mut worklist: VecDeque<NodeId> = origins.iter().copied().collect();
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut relationships: BTreeMap<String, Vec<NodeId>> = BTreeMap::new();

        while let Some(node) = worklist.pop_front() {
            if !visited.insert(node) {
                continue;
            }

            let mut query = Filter::new().eq(near_field, node.get());
            if let Some(filter) = &filter {
                query = query.is_in(IndexedField::Predicate, filter.iter().copied());
            }

            for edge in self.store.find_edges(&query)? {
                let far = match direction {
                    Direction::Outgoing => edge.object(),
                    Direction::Incoming => edge.subject(),
                };

                if edge.predicate().as_str() == PREDICATE_SUBCLASS_OF {
                    trace!("Following subclass edge {} -> {}", node, far);
                    worklist.push_back(far);
                    continue;
                }

                let bucket = relationships.entry(edge.predicate().to_string()).or_default();
                if !bucket.contains(&far) {
                    bucket.push(far);
                }
                self.cache_node(far)?;
            }
        }

        debug!(
            "Relationships of {:?} ({}): {} predicate(s), {} node(s) visited",
            origins,
            direction,
            relationships.len(),
            visited.len()
        );
        Ok(relationships)
    }

    /// Far ends of one predicate, in discovery order.
    pub fn related(
        &mut self,
        origin: NodeId,
        direction: Direction,
        predicate: &str,
    ) -> Result<Vec<NodeId>> {
        Ok(self
            .get_relationships(&[origin], direction, &[predicate])?
            .remove(predicate)
            .unwrap_or_default())
    }
}
