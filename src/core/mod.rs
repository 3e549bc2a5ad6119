//! Core types for ontograph
//!
//! This module is the foundation the rest of the crate builds on:
//!
//! - [`error`]: the typed [`OntologyError`], the crate-wide [`Result`] alias and the
//!   user-facing [`ErrorContext`]
//! - [`ids`]: one identifier newtype per graph collection ([`TermId`], [`TagId`],
//!   [`NodeId`], [`EdgeId`])
//! - [`language`]: language-tagged strings and the language selection rule
//!
//! # Error Handling Pattern
//!
//! ```rust,no_run
//! use ontograph::core::{OntologyError, user_friendly_error};
//!
//! fn lookup() -> ontograph::core::Result<u64> {
//!     Err(OntologyError::not_found("serial", "crop:wheat"))
//! }
//!
//! if let Err(e) = lookup() {
//!     user_friendly_error(e.into()).display();
//! }
//! ```

pub mod error;
pub mod ids;
pub mod language;

pub use error::{ErrorContext, OntologyError, Result, user_friendly_error};
pub use ids::{EdgeId, NodeId, TagId, TermId};
pub use language::{LanguageString, select_language};
