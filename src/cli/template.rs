//! `template` and `order` commands.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::{OutputFormat, Session};
use crate::core::NodeId;
use crate::structure::{TemplateStructure, TemplateSummary, TemplateWorksheetsIterator};

/// Show the worksheets of a template.
///
/// ```bash
/// ontograph --store graph.json template 1
/// ontograph --store graph.json template 1 --format json
/// ```
#[derive(Args, Debug)]
pub struct TemplateCommand {
    /// Template root node
    pub root: NodeId,

    /// Output format (`tree` is the same as `text`)
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

impl TemplateCommand {
    pub fn execute(self, session: &Session) -> Result<()> {
        let template = session.template(self.root)?;
        let summary = template.summary();

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
            OutputFormat::Text => print_tree(&template, &summary),
        }
        Ok(())
    }
}

fn print_tree(template: &TemplateStructure, summary: &TemplateSummary) {
    let title = summary.label.clone().unwrap_or_else(|| summary.root.to_string());
    println!("{} ({})", title.bold(), summary.root);

    let last_sheet = summary.worksheets.len().saturating_sub(1);
    for (i, worksheet) in summary.worksheets.iter().enumerate() {
        let (branch, indent) = if i == last_sheet {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };

        let mut flags = Vec::new();
        if worksheet.unit {
            flags.push("unit");
        }
        if worksheet.required {
            flags.push("required");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!("{branch}{}{}", worksheet.symbol.green().bold(), flags.dimmed());

        let last_field = worksheet.fields.len().saturating_sub(1);
        for (j, field) in worksheet.fields.iter().enumerate() {
            let branch = if j == last_field { "└── " } else { "├── " };
            let mut line = field.symbol.clone();
            if worksheet.index.as_deref() == Some(field.symbol.as_str()) {
                line.push_str(" (key)");
            }
            if let Some(target) = template
                .linked_index(field.id)
                .and_then(|index| template.node_symbol(index))
            {
                line.push_str(&format!(" -> {target}"));
            }
            if field.mandatory {
                line.push_str(" *");
            }
            println!("{indent}{branch}{line}");
        }
    }
}

/// Show the order in which template worksheets are loaded.
#[derive(Args, Debug)]
pub struct OrderCommand {
    /// Template root node
    pub root: NodeId,

    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct OrderStep {
    worksheet: String,
    parent: String,
    field: Option<String>,
}

#[derive(Debug, Serialize)]
struct Order {
    root: String,
    steps: Vec<OrderStep>,
}

impl OrderCommand {
    pub fn execute(self, session: &Session) -> Result<()> {
        let template = session.template(self.root)?;
        let iterator = TemplateWorksheetsIterator::new(&template)?;

        let symbol = |id: NodeId| {
            template
                .worksheet_symbol(id)
                .map_or_else(|| id.to_string(), str::to_string)
        };
        let order = Order {
            root: symbol(iterator.root()),
            steps: iterator
                .entries()
                .iter()
                .map(|entry| OrderStep {
                    worksheet: symbol(entry.worksheet),
                    parent: symbol(entry.parent),
                    field: template.node_symbol(entry.field).map(str::to_string),
                })
                .collect(),
        };

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&order)?),
            OutputFormat::Text => {
                println!("{} {}", "0".dimmed(), order.root.bold());
                for (position, step) in order.steps.iter().enumerate() {
                    let via = step.field.as_deref().unwrap_or("?");
                    println!(
                        "{} {} <- {} via {}",
                        (position + 1).to_string().dimmed(),
                        step.worksheet.bold(),
                        step.parent,
                        via
                    );
                }
            }
        }
        Ok(())
    }
}
