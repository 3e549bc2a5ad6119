//! ontograph - ontology graph dictionary and template schema derivation
//!
//! An ontology is kept as four collections in a document store: terms
//! (namespaced vocabulary), tags (descriptor paths of terms with a data type),
//! nodes (graph vertices pointing at a tag or a term) and edges
//! (subject/predicate/object triples between nodes). On top of that store this
//! crate provides:
//!
//! - a **dictionary** caching tag persistent identifiers, serials and
//!   definitions so repeated resolution never touches the store;
//! - a **commit protocol** for the graph entities, enforcing uniqueness,
//!   immutability of identifying fields and serial assignment;
//! - a **cached structure**, a memoizing traversal session that groups related
//!   nodes by predicate and follows `subclass-of` edges transitively;
//! - a **template structure** that reads spreadsheet worksheets, fields, keys
//!   and cross-worksheet references from a template root, plus the
//!   parent-before-child order in which worksheets are loaded.
//!
//! # Core Modules
//!
//! - [`core`] - Error types, identifier newtypes, language strings
//! - [`store`] - The document-store contract and the in-memory store
//! - [`dictionary`] - Tag identifier cache and its backing cache
//! - [`graph`] - Terms, tags, nodes, edges and the commit protocol
//! - [`structure`] - Traversal sessions, templates, worksheet order, validation
//! - [`config`] - `~/.ontograph/config.toml`
//! - [`cli`] - The `ontograph` command line
//!
//! # Example
//!
//! ```rust,no_run
//! use ontograph::core::LanguageString;
//! use ontograph::dictionary::Dictionary;
//! use ontograph::graph::{Committable, DataType, Tag, Term};
//! use ontograph::store::MemoryStore;
//!
//! # fn example() -> ontograph::core::Result<()> {
//! let store = MemoryStore::new();
//! let dictionary = Dictionary::in_memory();
//!
//! for local in ["crop", "wheat", "variety"] {
//!     Term::new("", local).commit(&store, &dictionary)?;
//! }
//! let mut tag = Tag::new(["crop", "wheat", "variety"])
//!     .with_data_type(DataType::String)
//!     .with_label(LanguageString::new("en", "Variety"));
//! tag.commit(&store, &dictionary)?;
//!
//! let serial = dictionary.resolve_serial("crop:wheat:variety", true)?;
//! assert_eq!(serial, tag.serial());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod dictionary;
pub mod graph;
pub mod store;
pub mod structure;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
