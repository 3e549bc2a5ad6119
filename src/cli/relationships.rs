//! `relationships` command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;

use super::{OutputFormat, Session};
use crate::core::NodeId;
use crate::structure::Direction;

/// List the nodes related to a node.
///
/// ```bash
/// ontograph --store graph.json relationships 12
/// ontograph --store graph.json relationships 12 -d in -p predicate:property-of
/// ```
#[derive(Args, Debug)]
pub struct RelationshipsCommand {
    /// Node to start from
    pub node: NodeId,

    /// Edge direction: `outgoing` (node is the subject) or `incoming`
    #[arg(short, long, default_value = "outgoing")]
    pub direction: String,

    /// Only follow these predicates; repeat for several
    #[arg(short, long = "predicate")]
    pub predicates: Vec<String>,

    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct RelatedNode {
    id: NodeId,
    name: String,
}

impl RelationshipsCommand {
    pub fn execute(self, session: &Session) -> Result<()> {
        let direction: Direction = self.direction.parse()?;
        let mut structure = session.structure(self.node)?;

        let predicates: Vec<&str> = self.predicates.iter().map(String::as_str).collect();
        let relationships = structure.get_relationships(&[self.node], direction, &predicates)?;

        let named: BTreeMap<String, Vec<RelatedNode>> = relationships
            .into_iter()
            .map(|(predicate, nodes)| {
                let nodes = nodes
                    .into_iter()
                    .map(|id| RelatedNode {
                        id,
                        name: structure.display_name(id),
                    })
                    .collect();
                (predicate, nodes)
            })
            .collect();

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&named)?),
            OutputFormat::Text => {
                println!(
                    "{} ({}, {})",
                    structure.display_name(self.node).bold(),
                    self.node,
                    direction
                );
                if named.is_empty() {
                    println!("  {}", "no relationships".dimmed());
                }
                for (predicate, nodes) in &named {
                    println!("  {}", predicate.cyan());
                    for node in nodes {
                        println!("    {} ({})", node.name, node.id);
                    }
                }
            }
        }
        Ok(())
    }
}
