//! Workbook validation against a template.
//!
//! Spreadsheet reading happens elsewhere; this module only receives, for each
//! worksheet of a workbook, its title, the symbols found on its symbol row and
//! the row where data starts. Every problem found is collected so a user can
//! fix a workbook in one pass.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use strsim::levenshtein;
use tracing::debug;

use super::TemplateStructure;
use crate::core::NodeId;

/// Maximum allowed Levenshtein distance as a percentage of the symbol length
/// for a column suggestion.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Header of one worksheet of a workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorksheetHeader {
    /// Worksheet title, matched against worksheet symbols
    pub title: String,
    /// Row holding the column symbols
    #[serde(default)]
    pub symbol_row: Option<u32>,
    /// Column number to symbol
    #[serde(default)]
    pub symbols: BTreeMap<u32, String>,
    /// First data row
    pub data_row: u32,
}

/// Which header row a mismatch concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderRow {
    Symbol,
    Data,
}

impl fmt::Display for HeaderRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Symbol => "symbol",
            Self::Data => "data",
        })
    }
}

/// One problem found in a workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ValidationIssue {
    UnknownWorksheet {
        title: String,
    },
    MissingWorksheet {
        symbol: String,
    },
    UnknownColumn {
        worksheet: String,
        column: u32,
        symbol: String,
        suggestions: Vec<String>,
    },
    MissingField {
        worksheet: String,
        symbol: String,
    },
    MissingIndex {
        worksheet: String,
        symbol: String,
    },
    RowMismatch {
        worksheet: String,
        row: HeaderRow,
        expected: u32,
        found: u32,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownWorksheet { title } => {
                write!(f, "worksheet '{title}' is not part of the template")
            }
            Self::MissingWorksheet { symbol } => {
                write!(f, "required worksheet '{symbol}' is missing")
            }
            Self::UnknownColumn {
                worksheet,
                column,
                symbol,
                suggestions,
            } => {
                write!(f, "{worksheet}: column {column} '{symbol}' is not a field of the worksheet")?;
                if !suggestions.is_empty() {
                    write!(f, " (did you mean {}?)", suggestions.join(", "))?;
                }
                Ok(())
            }
            Self::MissingField { worksheet, symbol } => {
                write!(f, "{worksheet}: mandatory field '{symbol}' has no column")
            }
            Self::MissingIndex { worksheet, symbol } => {
                write!(f, "{worksheet}: index field '{symbol}' has no column")
            }
            Self::RowMismatch {
                worksheet,
                row,
                expected,
                found,
            } => write!(f, "{worksheet}: {row} row is {found}, expected {expected}"),
        }
    }
}

/// All issues found in a workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl TemplateStructure {
    /// Check workbook headers against the template.
    pub fn validate_workbook(&self, headers: &[WorksheetHeader]) -> ValidationReport {
        let mut report = ValidationReport::default();
        let mut present: HashSet<NodeId> = HashSet::new();

        for header in headers {
            match self.worksheet_by_symbol(&header.title) {
                Some(worksheet) => {
                    present.insert(worksheet);
                    self.validate_worksheet(worksheet, header, &mut report.issues);
                }
                None => report.issues.push(ValidationIssue::UnknownWorksheet {
                    title: header.title.clone(),
                }),
            }
        }

        for &worksheet in self.required() {
            if !present.contains(&worksheet) {
                report.issues.push(ValidationIssue::MissingWorksheet {
                    symbol: self.worksheet_symbol(worksheet).unwrap_or_default().to_string(),
                });
            }
        }

        debug!("Workbook validation found {} issue(s)", report.len());
        report
    }

    fn validate_worksheet(
        &self,
        worksheet: NodeId,
        header: &WorksheetHeader,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let name = header.title.clone();
        let index = self.index(worksheet);
        let fields: Vec<NodeId> = self
            .properties(worksheet)
            .iter()
            .copied()
            .chain(index.filter(|key| !self.properties(worksheet).contains(key)))
            .collect();
        let known: Vec<&str> = fields.iter().filter_map(|&field| self.node_symbol(field)).collect();
        let found: HashSet<&str> = header.symbols.values().map(String::as_str).collect();

        for (&column, symbol) in &header.symbols {
            if !known.contains(&symbol.as_str()) {
                issues.push(ValidationIssue::UnknownColumn {
                    worksheet: name.clone(),
                    column,
                    symbol: symbol.clone(),
                    suggestions: suggest(symbol, &known),
                });
            }
        }

        for &field in self.properties(worksheet) {
            let mandatory = self.structure().node(field).is_some_and(|node| node.is_mandatory());
            if mandatory
                && Some(field) != index
                && let Some(symbol) = self.node_symbol(field)
                && !found.contains(symbol)
            {
                issues.push(ValidationIssue::MissingField {
                    worksheet: name.clone(),
                    symbol: symbol.to_string(),
                });
            }
        }

        if let Some(symbol) = index.and_then(|key| self.node_symbol(key))
            && !found.contains(symbol)
        {
            issues.push(ValidationIssue::MissingIndex {
                worksheet: name.clone(),
                symbol: symbol.to_string(),
            });
        }

        if let Some(node) = self.structure().node(worksheet) {
            if let (Some(expected), Some(found)) = (node.symbol_row, header.symbol_row)
                && expected != found
            {
                issues.push(ValidationIssue::RowMismatch {
                    worksheet: name.clone(),
                    row: HeaderRow::Symbol,
                    expected,
                    found,
                });
            }
            if let Some(expected) = node.data_row
                && expected != header.data_row
            {
                issues.push(ValidationIssue::RowMismatch {
                    worksheet: name,
                    row: HeaderRow::Data,
                    expected,
                    found: header.data_row,
                });
            }
        }
    }
}

/// Closest known symbols to `target`, best first.
fn suggest(target: &str, known: &[&str]) -> Vec<String> {
    let mut scored: Vec<(&str, usize)> = known
        .iter()
        .map(|&candidate| (candidate, levenshtein(target, candidate)))
        .collect();
    scored.sort_by_key(|&(_, distance)| distance);

    scored
        .into_iter()
        .filter(|&(_, distance)| distance <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .take(3)
        .map(|(candidate, _)| candidate.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TemplateFixture;

    fn header(title: &str, symbols: &[(u32, &str)], data_row: u32) -> WorksheetHeader {
        WorksheetHeader {
            title: title.to_string(),
            symbol_row: Some(1),
            symbols: symbols.iter().map(|&(c, s)| (c, s.to_string())).collect(),
            data_row,
        }
    }

    #[test]
    fn test_suggestions_are_close_matches() {
        assert_eq!(suggest("PLOT_AERA", &["PLOT_AREA", "UNIT_ID"]), vec!["PLOT_AREA"]);
        assert!(suggest("XYZ", &["PLOT_AREA"]).is_empty());
    }

    #[test]
    fn test_valid_workbook_has_no_issues() {
        let TemplateFixture { fixture, root, .. } = TemplateFixture::build();
        let template = fixture.template(root).unwrap();

        let report = template.validate_workbook(&[
            header("UNIT", &[(1, "UNIT_ID")], 2),
            header("PLOT", &[(1, "PLOT_ID"), (2, "PLOT_UNIT"), (3, "PLOT_AREA")], 2),
        ]);
        assert!(report.is_valid(), "{:?}", report.issues);
    }

    #[test]
    fn test_every_issue_is_collected() {
        let TemplateFixture { fixture, root, .. } = TemplateFixture::build();
        let template = fixture.template(root).unwrap();

        let report = template.validate_workbook(&[
            header("PLOT", &[(1, "PLOT_UNIT"), (2, "PLOT_AERA")], 5),
            header("NOTES", &[], 2),
        ]);

        assert!(report.issues.contains(&ValidationIssue::UnknownWorksheet { title: "NOTES".into() }));
        assert!(report.issues.contains(&ValidationIssue::MissingWorksheet { symbol: "UNIT".into() }));
        let suggestions = report.issues.iter().find_map(|issue| match issue {
            ValidationIssue::UnknownColumn { column: 2, symbol, suggestions, .. } if symbol == "PLOT_AERA" => {
                Some(suggestions.clone())
            }
            _ => None,
        });
        assert_eq!(suggestions.unwrap().first().map(String::as_str), Some("PLOT_AREA"));
        assert!(report.issues.contains(&ValidationIssue::MissingField {
            worksheet: "PLOT".into(),
            symbol: "PLOT_AREA".into(),
        }));
        assert!(report.issues.contains(&ValidationIssue::MissingIndex {
            worksheet: "PLOT".into(),
            symbol: "PLOT_ID".into(),
        }));
        assert!(report.issues.contains(&ValidationIssue::RowMismatch {
            worksheet: "PLOT".into(),
            row: HeaderRow::Data,
            expected: 2,
            found: 5,
        }));
        assert_eq!(report.len(), 6);
    }
}
