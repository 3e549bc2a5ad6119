//! Dictionary lookups: `resolve` and `definition`.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde_json::json;

use super::{OutputFormat, Session};
use crate::core::select_language;
use crate::dictionary::TagDefinition;

/// Resolve a tag persistent identifier to its serial.
///
/// ```bash
/// ontograph --store graph.json resolve crop:wheat:variety
/// ```
#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Persistent identifier, the tag path joined with `:`
    pub persistent_id: String,

    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

impl ResolveCommand {
    pub fn execute(self, session: &Session) -> Result<()> {
        let serial = session
            .dictionary
            .resolve_serial(&self.persistent_id, true)?
            .with_context(|| format!("No serial for {}", self.persistent_id))?;

        match self.format {
            OutputFormat::Text => println!("{} {}", self.persistent_id.bold(), serial),
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "persistent_id": self.persistent_id,
                    "serial": serial,
                }))?
            ),
        }
        Ok(())
    }
}

/// Show the definition cached for a tag serial.
#[derive(Args, Debug)]
pub struct DefinitionCommand {
    /// Tag serial
    pub serial: u64,

    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

impl DefinitionCommand {
    pub fn execute(self, session: &Session) -> Result<()> {
        let definition = session.dictionary.resolve_definition(self.serial, true)?;

        match self.format {
            OutputFormat::Text => print_definition(self.serial, &definition, session.language()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&definition)?),
        }
        Ok(())
    }
}

fn print_definition(serial: u64, definition: &TagDefinition, language: &str) {
    println!("{} ({})", definition.persistent_id.bold(), serial);

    if let Some(label) = select_language(&definition.label, language) {
        println!("  label:   {label}");
    }
    if let Some(data_type) = definition.data_type {
        println!("  type:    {data_type}");
    }
    if !definition.kind.is_empty() {
        let kinds: Vec<String> = definition.kind.iter().map(|kind| format!("{kind:?}").to_lowercase()).collect();
        println!("  kind:    {}", kinds.join(", "));
    }
    match (definition.min, definition.max) {
        (None, None) => {}
        (min, max) => println!(
            "  range:   {} .. {}",
            min.map_or_else(|| "-".to_string(), |v| v.to_string()),
            max.map_or_else(|| "-".to_string(), |v| v.to_string())
        ),
    }
    if let Some(pattern) = &definition.pattern {
        println!("  pattern: {pattern}");
    }
}
