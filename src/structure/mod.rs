//! Graph traversal and template interpretation.
//!
//! - [`cached`]: [`CachedStructure`], a memoizing traversal session rooted at
//!   one node, answering "which nodes relate to these through these predicates"
//! - [`template`]: [`TemplateStructure`], which reads worksheets, fields, keys and
//!   cross-worksheet references out of a template root
//! - [`worksheets`]: [`TemplateWorksheetsIterator`], the parent-before-child
//!   order in which worksheets of a template are processed
//! - [`validation`]: workbook header checks against a template
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ontograph::core::NodeId;
//! use ontograph::dictionary::Dictionary;
//! use ontograph::store::MemoryStore;
//! use ontograph::structure::{TemplateStructure, TemplateWorksheetsIterator};
//!
//! # fn example() -> ontograph::core::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let template = TemplateStructure::new(store, Dictionary::in_memory(), NodeId::new(1), "en")?;
//! for entry in TemplateWorksheetsIterator::new(&template)? {
//!     println!("{} -> {}", entry.parent, entry.worksheet);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cached;
pub mod template;
pub mod validation;
pub mod worksheets;

pub use cached::{CachedNode, CachedStructure, CachedTag, CachedTerm, Direction};
pub use template::{
    FieldSummary, TemplateStructure, TemplateSummary, WorksheetLink, WorksheetReference,
    WorksheetSummary,
};
pub use validation::{HeaderRow, ValidationIssue, ValidationReport, WorksheetHeader};
pub use worksheets::{TemplateWorksheetsIterator, WorksheetEntry};
