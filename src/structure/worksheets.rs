//! Worksheet processing order.
//!
//! Rows of a referenced worksheet must be loaded before the rows pointing at
//! them. The reference list of a [`TemplateStructure`] is turned into a tree
//! anchored at the unit worksheet and walked depth-first, so every worksheet is
//! visited after the worksheet it references.

use petgraph::Direction as GraphDirection;
use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::{TemplateStructure, WorksheetReference};
use crate::core::{NodeId, OntologyError, Result};

/// One step of the processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WorksheetEntry {
    /// Worksheet referenced by this one
    pub parent: NodeId,
    pub worksheet: NodeId,
    /// Key field of the worksheet
    pub key: Option<NodeId>,
    /// Field of the worksheet holding the parent's key
    pub field: NodeId,
}

/// Restartable parent-before-child walk over the worksheets of a template.
///
/// The root (unit) worksheet is never yielded; iteration starts at its first
/// child. [`TemplateWorksheetsIterator::rewind`] restarts the walk, including
/// after exhaustion.
#[derive(Debug, Clone)]
pub struct TemplateWorksheetsIterator {
    root: NodeId,
    entries: Vec<WorksheetEntry>,
    position: usize,
}

impl TemplateWorksheetsIterator {
    /// Order the worksheets of `template`.
    pub fn new(template: &TemplateStructure) -> Result<Self> {
        Self::from_references(template.references(), template.units())
    }

    /// Order worksheets from a reference list anchored at one of `units`.
    ///
    /// A worksheet referencing several worksheets keeps only the nearest ones:
    /// a referenced worksheet that is an ancestor of another referenced
    /// worksheet is dropped. Several remaining parents, several roots, a root
    /// that is not a unit, or a reference cycle fail with
    /// [`OntologyError::InvalidTemplate`].
    pub fn from_references(references: &[WorksheetReference], units: &[NodeId]) -> Result<Self> {
        let mut graph: DiGraph<NodeId, WorksheetReference> = DiGraph::new();
        let mut node_map: HashMap<NodeId, NodeIndex> = HashMap::new();

        let mut ensure_node = |graph: &mut DiGraph<NodeId, WorksheetReference>, id: NodeId| {
            *node_map.entry(id).or_insert_with(|| graph.add_node(id))
        };

        for &unit in units {
            ensure_node(&mut graph, unit);
        }
        for reference in references {
            let parent = ensure_node(&mut graph, reference.parent);
            let child = ensure_node(&mut graph, reference.child);
            if graph.contains_edge(parent, child) {
                debug!(
                    "Worksheet {} already references {}, ignoring field {}",
                    reference.child, reference.parent, reference.field
                );
                continue;
            }
            graph.add_edge(parent, child, *reference);
        }

        if graph.node_count() == 0 {
            return Err(OntologyError::template("template has no unit worksheet"));
        }

        toposort(&graph, None).map_err(|cycle| {
            OntologyError::template_at(graph[cycle.node_id()], "worksheet references form a cycle")
        })?;

        let kept = Self::nearest_parents(&graph)?;

        let roots: Vec<NodeIndex> = graph
            .node_indices()
            .filter(|&node| {
                !graph
                    .edges_directed(node, GraphDirection::Incoming)
                    .any(|edge| kept.contains(&edge.id()))
            })
            .collect();

        let root = match roots.as_slice() {
            [root] => *root,
            [] => return Err(OntologyError::template("worksheet references have no root")),
            several => {
                let names: Vec<String> = several.iter().map(|&n| graph[n].to_string()).collect();
                return Err(OntologyError::template(format!(
                    "worksheet references have several roots: {}",
                    names.join(", ")
                )));
            }
        };

        if !units.is_empty() && !units.contains(&graph[root]) {
            return Err(OntologyError::template_at(
                graph[root],
                "root of the worksheet references is not a unit worksheet",
            ));
        }

        let entries = Self::walk(&graph, root, &kept);
        debug!(
            "Worksheet order from {}: {:?}",
            graph[root],
            entries.iter().map(|entry| entry.worksheet).collect::<Vec<_>>()
        );

        Ok(Self {
            root: graph[root],
            entries,
            position: 0,
        })
    }

    /// Keep, for each worksheet, the edge from its single nearest parent.
    fn nearest_parents(graph: &DiGraph<NodeId, WorksheetReference>) -> Result<HashSet<EdgeIndex>> {
        let mut kept = HashSet::new();

        for node in graph.node_indices() {
            let incoming: Vec<_> = graph.edges_directed(node, GraphDirection::Incoming).collect();
            if incoming.len() <= 1 {
                kept.extend(incoming.iter().map(|edge| edge.id()));
                continue;
            }

            let nearest: Vec<_> = incoming
                .iter()
                .filter(|edge| {
                    !incoming.iter().any(|other| {
                        other.source() != edge.source()
                            && has_path_connecting(graph, edge.source(), other.source(), None)
                    })
                })
                .collect();

            match nearest.as_slice() {
                [edge] => {
                    kept.insert(edge.id());
                }
                _ => {
                    let parents: Vec<String> =
                        nearest.iter().map(|edge| graph[edge.source()].to_string()).collect();
                    return Err(OntologyError::template_at(
                        graph[node],
                        format!("worksheet references unrelated worksheets {}", parents.join(", ")),
                    ));
                }
            }
        }

        Ok(kept)
    }

    /// Pre-order depth-first walk; siblings in reference order.
    fn walk(
        graph: &DiGraph<NodeId, WorksheetReference>,
        root: NodeIndex,
        kept: &HashSet<EdgeIndex>,
    ) -> Vec<WorksheetEntry> {
        let children = |node: NodeIndex| {
            let mut edges: Vec<_> = graph
                .edges_directed(node, GraphDirection::Outgoing)
                .filter(|edge| kept.contains(&edge.id()))
                .collect();
            edges.sort_by_key(|edge| edge.id());
            edges
        };

        let mut entries = Vec::new();
        let mut stack: Vec<_> = children(root);
        stack.reverse();

        while let Some(edge) = stack.pop() {
            let reference = edge.weight();
            entries.push(WorksheetEntry {
                parent: reference.parent,
                worksheet: reference.child,
                key: reference.key,
                field: reference.field,
            });

            let mut next = children(edge.target());
            next.reverse();
            stack.extend(next);
        }
        entries
    }

    /// The unit worksheet anchoring the order.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Every entry, in processing order.
    pub fn entries(&self) -> &[WorksheetEntry] {
        &self.entries
    }

    /// Number of entries; the root is not counted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Restart at the first child of the root.
    pub fn rewind(&mut self) {
        self.position = 0;
    }
}

impl Iterator for TemplateWorksheetsIterator {
    type Item = WorksheetEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.get(self.position).copied()?;
        self.position += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.entries.len().saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}
