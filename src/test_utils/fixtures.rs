//! Graph fixtures for tests.
//!
//! Fixture methods panic on failure: a broken fixture is a broken test.

use std::sync::Arc;

use crate::constants::{
    PREDICATE_COLLECTION_OF, PREDICATE_INDEX, PREDICATE_PROPERTY_OF, PREDICATE_UNIT,
};
use crate::core::{LanguageString, NodeId, Result, TermId};
use crate::dictionary::Dictionary;
use crate::graph::{Committable, DataKind, DataType, Edge, Node, NodeKind, NodeReference, Tag, Term};
use crate::store::{Collection, DocumentStore, MemoryStore};
use crate::structure::{CachedStructure, TemplateStructure};

/// Builder for small graphs in a fresh [`MemoryStore`].
///
/// Terms referenced by nodes and edge predicates are created on demand.
pub struct GraphFixture {
    store: Arc<MemoryStore>,
    dictionary: Dictionary,
}

impl Default for GraphFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphFixture {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            dictionary: Dictionary::in_memory(),
        }
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// The store as a shared trait object.
    pub fn shared_store(&self) -> Arc<dyn DocumentStore> {
        self.store.clone()
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    fn new_term(id: &str) -> Term {
        match id.split_once(':') {
            Some((namespace, local)) => Term::new(namespace, local),
            None => Term::new("", id),
        }
    }

    /// Ensure a term exists.
    pub fn term(&mut self, id: &str) -> TermId {
        let term_id = TermId::new(id);
        let exists = self
            .store
            .contains(Collection::Terms, id)
            .expect("store lookup");
        if !exists {
            Self::new_term(id)
                .commit(self.store.as_ref(), &self.dictionary)
                .expect("commit term");
        }
        term_id
    }

    /// Create a labelled term.
    pub fn term_with_label(&mut self, id: &str, label: LanguageString) -> TermId {
        let mut term = Self::new_term(id).with_label(label);
        term.commit(self.store.as_ref(), &self.dictionary)
            .expect("commit term");
        term.id().clone()
    }

    /// Commit a tag with persistent identifier `path`, labelled with its last
    /// `:` segment.
    ///
    /// An odd number of segments becomes the term path; otherwise the whole
    /// identifier is a single-term path.
    pub fn tag(&mut self, path: &str, data_type: DataType) -> Tag {
        let parts: Vec<&str> = path.split(':').collect();
        let label = parts.last().copied().unwrap_or(path);
        let terms = if parts.len() % 2 == 1 { parts } else { vec![path] };
        let mut tag = Tag::new(terms)
            .with_data_type(data_type)
            .with_label(LanguageString::neutral(label));
        tag.commit(self.store.as_ref(), &self.dictionary)
            .expect("commit tag");
        tag
    }

    /// Commit a node, creating its term if needed.
    pub fn node(&mut self, mut node: Node) -> NodeId {
        if let NodeReference::Term(term) = node.reference().clone() {
            self.term(term.as_str());
        }
        node.commit(self.store.as_ref(), &self.dictionary)
            .expect("commit node");
        node.id().expect("committed node has an id")
    }

    pub fn term_node(&mut self, term: &str) -> NodeId {
        self.node(Node::term(term))
    }

    pub fn tag_node(&mut self, path: &str, data_type: DataType) -> NodeId {
        let tag = self.tag(path, data_type);
        let id = tag.id().expect("committed tag has an id").clone();
        self.node(Node::tag(id))
    }

    /// Commit an edge, creating the predicate term if needed.
    pub fn edge(&mut self, subject: NodeId, predicate: &str, object: NodeId) {
        self.term(predicate);
        Edge::new(subject, predicate, object)
            .commit(self.store.as_ref(), &self.dictionary)
            .expect("commit edge");
    }

    /// A node flagged root and template.
    pub fn template_root(&mut self, term: &str) -> NodeId {
        self.node(
            Node::term(term)
                .with_kind(NodeKind::Root)
                .with_kind(NodeKind::Template),
        )
    }

    /// A worksheet of `parent`, with symbol row 1 and data row 2.
    pub fn worksheet(&mut self, parent: NodeId, symbol: &str, required: bool) -> NodeId {
        let mut node = Node::term(format!("sheet:{}", symbol.to_lowercase()))
            .with_symbol(symbol)
            .with_rows(1, 2)
            .with_label(LanguageString::neutral(symbol));
        if required {
            node.add_data_kind(DataKind::Mandatory);
        }
        let worksheet = self.node(node);
        self.edge(worksheet, PREDICATE_COLLECTION_OF, parent);
        worksheet
    }

    /// A field of `worksheet`.
    pub fn field(&mut self, worksheet: NodeId, symbol: &str, mandatory: bool) -> NodeId {
        let mut node = Node::term(format!("field:{}", symbol.to_lowercase())).with_symbol(symbol);
        if mandatory {
            node.add_data_kind(DataKind::Mandatory);
        }
        let field = self.node(node);
        self.edge(field, PREDICATE_PROPERTY_OF, worksheet);
        field
    }

    /// The key field of `worksheet`.
    pub fn key(&mut self, worksheet: NodeId, symbol: &str) -> NodeId {
        let key = self.field(worksheet, symbol, true);
        self.edge(worksheet, PREDICATE_INDEX, key);
        key
    }

    /// A field of `worksheet` holding the key `target` of another worksheet.
    pub fn link(&mut self, worksheet: NodeId, symbol: &str, target: NodeId) -> NodeId {
        let field = self.field(worksheet, symbol, true);
        self.edge(field, PREDICATE_INDEX, target);
        field
    }

    /// Declare `worksheet` a unit of `root`.
    pub fn unit(&mut self, root: NodeId, worksheet: NodeId) {
        self.edge(root, PREDICATE_UNIT, worksheet);
    }

    /// Open a traversal session on `root`.
    pub fn structure(&self, root: NodeId) -> CachedStructure {
        CachedStructure::new(self.shared_store(), self.dictionary.clone(), root, "en")
            .expect("open structure")
    }

    /// Load the template rooted at `root`.
    pub fn template(&self, root: NodeId) -> Result<TemplateStructure> {
        TemplateStructure::new(self.shared_store(), self.dictionary.clone(), root, "en")
    }
}

/// Three-worksheet template: `PLOT` references the `UNIT` key, `SAMPLE`
/// references the `PLOT` key.
///
/// ```text
/// UNIT   (unit, required)  key UNIT_ID
/// PLOT                     key PLOT_ID, PLOT_UNIT -> UNIT_ID, PLOT_AREA (mandatory)
/// SAMPLE                   SAMPLE_PLOT -> PLOT_ID
/// ```
pub struct TemplateFixture {
    pub fixture: GraphFixture,
    pub root: NodeId,
    pub unit: NodeId,
    pub unit_key: NodeId,
    pub plot: NodeId,
    pub plot_key: NodeId,
    pub plot_unit_link: NodeId,
    pub sample: NodeId,
    pub sample_plot_link: NodeId,
}

impl TemplateFixture {
    pub fn build() -> Self {
        let mut fixture = GraphFixture::new();
        let root = fixture.template_root("template:trial");

        let unit = fixture.worksheet(root, "UNIT", true);
        let plot = fixture.worksheet(root, "PLOT", false);
        let sample = fixture.worksheet(root, "SAMPLE", false);
        fixture.unit(root, unit);

        let unit_key = fixture.key(unit, "UNIT_ID");
        let plot_key = fixture.key(plot, "PLOT_ID");
        let plot_unit_link = fixture.link(plot, "PLOT_UNIT", unit_key);
        fixture.field(plot, "PLOT_AREA", true);
        let sample_plot_link = fixture.link(sample, "SAMPLE_PLOT", plot_key);

        Self {
            fixture,
            root,
            unit,
            unit_key,
            plot,
            plot_key,
            plot_unit_link,
            sample,
            sample_plot_link,
        }
    }
}
