//! Data-entry templates.
//!
//! A template is a root node flagged both `root` and `template`. Its worksheets
//! are the nodes that are (recursively) a `collection-of` the root; the fields
//! of a worksheet are its `property-of` nodes, and its key is the node it points
//! to with an `index` edge:
//!
//! ```text
//!   W ──collection-of──► root          worksheet of the template
//!   F ──property-of────► W             field (column) of W
//!   W ──index──────────► K             K is the key of W
//!   F ──index──────────► K             F links rows of its worksheet to W
//!   root ──unit────────► U             U is a top-level worksheet
//! ```
//!
//! A field carrying an `index` edge to the key of another worksheet is a
//! *linking field*: every worksheet owning that field references the key's
//! worksheet, whose rows must therefore be loaded first. These references form
//! the graph consumed by [`TemplateWorksheetsIterator`](super::TemplateWorksheetsIterator).

use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{CachedStructure, Direction};
use crate::constants::{
    PREDICATE_COLLECTION_OF, PREDICATE_INDEX, PREDICATE_PROPERTY_OF, PREDICATE_UNIT,
};
use crate::core::{NodeId, OntologyError, Result};
use crate::dictionary::Dictionary;
use crate::graph::NodeKind;
use crate::store::DocumentStore;

/// A worksheet reaching another worksheet's key through one of its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WorksheetLink {
    pub worksheet: NodeId,
    pub field: NodeId,
}

/// Edge of the reference graph: `child` rows point at `parent` rows via `field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WorksheetReference {
    pub parent: NodeId,
    pub child: NodeId,
    /// Key field of the child worksheet
    pub key: Option<NodeId>,
    /// Linking field of the child worksheet
    pub field: NodeId,
}

/// Template structure derived from a root node.
#[derive(Debug)]
pub struct TemplateStructure {
    structure: CachedStructure,
    worksheets: Vec<NodeId>,
    properties: HashMap<NodeId, Vec<NodeId>>,
    required: BTreeSet<NodeId>,
    worksheet_index: HashMap<NodeId, NodeId>,
    index_references: HashMap<NodeId, Vec<WorksheetLink>>,
    symbol_nodes: HashMap<String, NodeId>,
    node_symbols: HashMap<NodeId, String>,
    worksheet_symbols: HashMap<String, NodeId>,
    units: Vec<NodeId>,
    references: Vec<WorksheetReference>,
}

impl TemplateStructure {
    /// Load the template rooted at `root`.
    ///
    /// Fails with [`OntologyError::InvalidTemplate`] when the root is not a
    /// template, or when a worksheet or field lacks a symbol, a unit is not one
    /// of the worksheets, a symbol names two nodes, or a linking field belongs to
    /// no other worksheet.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        dictionary: Dictionary,
        root: NodeId,
        language: impl Into<String>,
    ) -> Result<Self> {
        let structure = CachedStructure::new(store, dictionary, root, language)?;
        Self::from_structure(structure)
    }

    /// Interpret the root of an open session as a template.
    pub fn from_structure(structure: CachedStructure) -> Result<Self> {
        let root = structure.root();
        let root_node = structure
            .node(root)
            .ok_or_else(|| OntologyError::not_found("node", root))?;
        if !(root_node.has_kind(NodeKind::Root) && root_node.has_kind(NodeKind::Template)) {
            return Err(OntologyError::template_at(
                structure.display_name(root),
                "root node must be flagged both root and template",
            ));
        }

        let mut template = Self {
            structure,
            worksheets: Vec::new(),
            properties: HashMap::new(),
            required: BTreeSet::new(),
            worksheet_index: HashMap::new(),
            index_references: HashMap::new(),
            symbol_nodes: HashMap::new(),
            node_symbols: HashMap::new(),
            worksheet_symbols: HashMap::new(),
            units: Vec::new(),
            references: Vec::new(),
        };

        template.load_worksheets()?;
        template.load_unit_worksheets()?;
        template.load_property_symbols()?;
        template.load_references()?;

        info!(
            "Loaded template {}: {} worksheet(s), {} unit(s), {} reference(s)",
            root,
            template.worksheets.len(),
            template.units.len(),
            template.references.len()
        );
        Ok(template)
    }

    fn load_worksheets(&mut self) -> Result<()> {
        let root = self.structure.root();
        let mut queue = VecDeque::from([root]);
        let mut seen = HashSet::from([root]);

        while let Some(parent) = queue.pop_front() {
            for worksheet in self
                .structure
                .related(parent, Direction::Incoming, PREDICATE_COLLECTION_OF)?
            {
                if seen.insert(worksheet) {
                    self.load_worksheet(worksheet)?;
                    queue.push_back(worksheet);
                }
            }
        }
        Ok(())
    }

    fn load_worksheet(&mut self, worksheet: NodeId) -> Result<()> {
        let node = self.structure.cache_node(worksheet)?;
        let mandatory = node.is_mandatory();
        let Some(symbol) = node.symbol.clone() else {
            return Err(OntologyError::template_at(
                self.structure.display_name(worksheet),
                "worksheet has no symbol",
            ));
        };

        if let Some(&other) = self.worksheet_symbols.get(&symbol)
            && other != worksheet
        {
            return Err(OntologyError::template_at(
                worksheet,
                format!("worksheet symbol '{symbol}' is already used by node {other}"),
            ));
        }
        self.worksheet_symbols.insert(symbol.clone(), worksheet);

        if mandatory {
            self.required.insert(worksheet);
        }

        let properties = self
            .structure
            .related(worksheet, Direction::Incoming, PREDICATE_PROPERTY_OF)?;

        let indexes = self
            .structure
            .related(worksheet, Direction::Outgoing, PREDICATE_INDEX)?;
        if indexes.len() > 1 {
            warn!(
                "Worksheet '{}' has {} index fields, using the first",
                symbol,
                indexes.len()
            );
        }
        if let Some(&index) = indexes.first() {
            self.worksheet_index.insert(worksheet, index);
        }

        debug!(
            "Worksheet '{}' ({}): {} field(s), index {:?}, required: {}",
            symbol,
            worksheet,
            properties.len(),
            indexes.first(),
            mandatory
        );
        self.properties.insert(worksheet, properties);
        self.worksheets.push(worksheet);
        Ok(())
    }

    fn load_unit_worksheets(&mut self) -> Result<()> {
        let root = self.structure.root();
        for unit in self.structure.related(root, Direction::Outgoing, PREDICATE_UNIT)? {
            if !self.properties.contains_key(&unit) {
                return Err(OntologyError::template_at(
                    self.structure.display_name(unit),
                    "unit is not a worksheet of the template",
                ));
            }
            self.units.push(unit);
        }
        Ok(())
    }

    fn load_property_symbols(&mut self) -> Result<()> {
        for worksheet in self.worksheets.clone() {
            let mut fields = self.properties.get(&worksheet).cloned().unwrap_or_default();
            fields.extend(self.worksheet_index.get(&worksheet).copied());

            for field in fields {
                let node = self.structure.cache_node(field)?;
                let Some(symbol) = node.symbol.clone() else {
                    return Err(OntologyError::template_at(
                        self.structure.display_name(field),
                        format!(
                            "field of worksheet '{}' has no symbol",
                            self.structure.display_name(worksheet)
                        ),
                    ));
                };

                if let Some(&other) = self.symbol_nodes.get(&symbol)
                    && other != field
                {
                    return Err(OntologyError::template_at(
                        field,
                        format!("field symbol '{symbol}' is already used by node {other}"),
                    ));
                }
                self.symbol_nodes.insert(symbol.clone(), field);
                self.node_symbols.insert(field, symbol);
            }
        }
        Ok(())
    }

    fn load_references(&mut self) -> Result<()> {
        for owner in self.worksheets.clone() {
            let Some(key) = self.worksheet_index.get(&owner).copied() else {
                continue;
            };

            for field in self.structure.related(key, Direction::Incoming, PREDICATE_INDEX)? {
                if field == owner {
                    continue;
                }

                let referencing: Vec<NodeId> = self
                    .worksheets
                    .iter()
                    .copied()
                    .filter(|&worksheet| {
                        worksheet != owner
                            && self
                                .properties
                                .get(&worksheet)
                                .is_some_and(|fields| fields.contains(&field))
                    })
                    .collect();

                if referencing.is_empty() {
                    return Err(OntologyError::template_at(
                        self.structure.display_name(field),
                        format!(
                            "field indexes the key of worksheet '{}' but belongs to no other worksheet",
                            self.structure.display_name(owner)
                        ),
                    ));
                }

                for child in referencing {
                    self.index_references
                        .entry(key)
                        .or_default()
                        .push(WorksheetLink { worksheet: child, field });
                    self.references.push(WorksheetReference {
                        parent: owner,
                        child,
                        key: self.worksheet_index.get(&child).copied(),
                        field,
                    });
                }
            }
        }
        Ok(())
    }

    /// Underlying traversal session.
    pub fn structure(&self) -> &CachedStructure {
        &self.structure
    }

    pub fn structure_mut(&mut self) -> &mut CachedStructure {
        &mut self.structure
    }

    pub fn root(&self) -> NodeId {
        self.structure.root()
    }

    /// Worksheets in discovery order.
    pub fn worksheets(&self) -> &[NodeId] {
        &self.worksheets
    }

    /// Fields of a worksheet.
    pub fn properties(&self, worksheet: NodeId) -> &[NodeId] {
        self.properties.get(&worksheet).map_or(&[], Vec::as_slice)
    }

    pub fn required(&self) -> &BTreeSet<NodeId> {
        &self.required
    }

    pub fn is_required(&self, worksheet: NodeId) -> bool {
        self.required.contains(&worksheet)
    }

    /// Key field of a worksheet.
    pub fn index(&self, worksheet: NodeId) -> Option<NodeId> {
        self.worksheet_index.get(&worksheet).copied()
    }

    /// Worksheets referencing the owner of key `index`, with their linking field.
    pub fn referencing(&self, index: NodeId) -> &[WorksheetLink] {
        self.index_references.get(&index).map_or(&[], Vec::as_slice)
    }

    pub fn index_references(&self) -> &HashMap<NodeId, Vec<WorksheetLink>> {
        &self.index_references
    }

    /// Key referenced by a linking field.
    pub fn linked_index(&self, field: NodeId) -> Option<NodeId> {
        self.index_references
            .iter()
            .find(|(_, links)| links.iter().any(|link| link.field == field))
            .map(|(&index, _)| index)
    }

    /// Field node bound to a column symbol.
    pub fn symbol_node(&self, symbol: &str) -> Option<NodeId> {
        self.symbol_nodes.get(symbol).copied()
    }

    /// Column symbol of a field node.
    pub fn node_symbol(&self, node: NodeId) -> Option<&str> {
        self.node_symbols.get(&node).map(String::as_str)
    }

    /// Worksheet bound to a worksheet symbol.
    pub fn worksheet_by_symbol(&self, symbol: &str) -> Option<NodeId> {
        self.worksheet_symbols.get(symbol).copied()
    }

    /// Symbol of a worksheet.
    pub fn worksheet_symbol(&self, worksheet: NodeId) -> Option<&str> {
        self.structure.node(worksheet).and_then(|node| node.symbol.as_deref())
    }

    /// Unit worksheets, in edge order.
    pub fn units(&self) -> &[NodeId] {
        &self.units
    }

    /// Flat reference list, parents in worksheet discovery order.
    pub fn references(&self) -> &[WorksheetReference] {
        &self.references
    }

    /// Serializable overview of the template.
    pub fn summary(&self) -> TemplateSummary {
        let label = |id: NodeId| self.structure.node(id).and_then(|node| node.label.clone());

        let worksheets = self
            .worksheets
            .iter()
            .map(|&worksheet| WorksheetSummary {
                id: worksheet,
                symbol: self.worksheet_symbol(worksheet).unwrap_or_default().to_string(),
                label: label(worksheet),
                required: self.is_required(worksheet),
                unit: self.units.contains(&worksheet),
                index: self
                    .index(worksheet)
                    .and_then(|index| self.node_symbol(index))
                    .map(str::to_string),
                fields: self
                    .properties(worksheet)
                    .iter()
                    .map(|&field| FieldSummary {
                        id: field,
                        symbol: self.node_symbol(field).unwrap_or_default().to_string(),
                        label: label(field),
                        mandatory: self.structure.node(field).is_some_and(|node| node.is_mandatory()),
                    })
                    .collect(),
            })
            .collect();

        TemplateSummary {
            root: self.root(),
            label: label(self.root()),
            worksheets,
            references: self.references.clone(),
        }
    }
}

/// Overview of a template, as printed by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateSummary {
    pub root: NodeId,
    pub label: Option<String>,
    pub worksheets: Vec<WorksheetSummary>,
    pub references: Vec<WorksheetReference>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorksheetSummary {
    pub id: NodeId,
    pub symbol: String,
    pub label: Option<String>,
    pub required: bool,
    pub unit: bool,
    pub index: Option<String>,
    pub fields: Vec<FieldSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    pub id: NodeId,
    pub symbol: String,
    pub label: Option<String>,
    pub mandatory: bool,
}
