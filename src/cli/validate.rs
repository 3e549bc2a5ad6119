//! `validate` command: check workbook headers against a template.
//!
//! The headers file is a JSON array, one object per worksheet:
//!
//! ```json
//! [
//!   { "title": "UNIT", "symbol_row": 1, "symbols": { "1": "UNIT_ID" }, "data_row": 2 }
//! ]
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tokio::fs;

use super::{OutputFormat, Session};
use crate::core::{NodeId, OntologyError};
use crate::structure::WorksheetHeader;

/// Check workbook headers against a template.
///
/// Exits with an error when any issue is found; every issue is reported first.
#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Template root node
    pub root: NodeId,

    /// JSON file holding the workbook headers
    pub headers: PathBuf,

    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

impl ValidateCommand {
    pub async fn execute(self, session: &Session) -> Result<()> {
        let content = fs::read_to_string(&self.headers)
            .await
            .with_context(|| format!("Failed to read headers from {}", self.headers.display()))?;
        let headers: Vec<WorksheetHeader> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse headers from {}", self.headers.display()))?;

        let template = session.template(self.root)?;
        let report = template.validate_workbook(&headers);

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Text => {
                if report.is_valid() {
                    println!("{} workbook matches the template", "✓".green());
                }
                for issue in &report.issues {
                    println!("{} {issue}", "✗".red());
                }
            }
        }

        if report.is_valid() {
            Ok(())
        } else {
            Err(OntologyError::InvalidInput {
                reason: format!("workbook has {} issue(s)", report.len()),
            }
            .into())
        }
    }
}
