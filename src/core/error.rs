//! Error handling for ontograph
//!
//! This module provides the typed error returned by every library operation and
//! the user-friendly wrapper the command-line front end prints. The error system
//! is built around two principles:
//! 1. **Strongly-typed errors** so callers can react to a precise failure mode
//!    (a validation pipeline treats [`OntologyError::NotFound`] very differently
//!    from [`OntologyError::Duplicate`])
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Lookups**: [`OntologyError::NotFound`]. Every lookup that can miss takes an
//!   `assert` flag deciding whether a miss raises this error or degrades to an
//!   absent value.
//! - **Identity**: [`OntologyError::Duplicate`], [`OntologyError::ImmutableField`],
//!   [`OntologyError::NotInitialized`]
//! - **Templates**: [`OntologyError::InvalidTemplate`]
//! - **Programmer errors**: [`OntologyError::InvalidCollection`],
//!   [`OntologyError::InvalidInput`]
//! - **Collaborators**: [`OntologyError::Store`], [`OntologyError::Config`]
//!
//! No operation in this crate retries: every failure is either a data problem in
//! the ontology or a validation failure meant for whoever builds the template.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ontograph::core::{OntologyError, user_friendly_error};
//!
//! let error = OntologyError::NotFound {
//!     kind: "tag".to_string(),
//!     identifier: "crop:wheat:variety".to_string(),
//! };
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for ontograph operations.
///
/// All variants carry owned strings so the error is cheap to clone and compare,
/// which lets tests and validation pipelines match on exact values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OntologyError {
    /// An identifier could not be resolved.
    ///
    /// Raised by lookups called with `assert = true`, by the traversal engine when
    /// a node references a tag or term that does not exist, and by edge commits
    /// whose endpoints are missing.
    #[error("{kind} '{identifier}' not found")]
    NotFound {
        /// Kind of entity or cache entry that was looked up (e.g. "tag", "node")
        kind: String,
        /// The identifier that failed to resolve
        identifier: String,
    },

    /// A record with the same identifier already exists.
    ///
    /// For edges the identifier is the `subject:predicate:object` triple, so this
    /// is raised when the exact same relationship is created twice.
    #[error("{collection} record '{identifier}' already exists")]
    Duplicate {
        /// Collection holding the existing record
        collection: String,
        /// The duplicated identifier
        identifier: String,
    },

    /// Attempt to change an identity field of a committed record.
    #[error("field '{field}' of committed {entity} '{identifier}' is immutable")]
    ImmutableField {
        /// Entity kind ("tag", "node", "edge", "term")
        entity: String,
        /// Identifier of the committed record
        identifier: String,
        /// The locked field
        field: String,
    },

    /// An entity was committed before meeting its initialization invariant.
    #[error("{entity} is not initialized: {reason}")]
    NotInitialized {
        /// Entity kind ("tag", "node", "edge", "term")
        entity: String,
        /// What is missing or invalid
        reason: String,
    },

    /// The graph under a template root does not describe a valid template.
    ///
    /// Also raised for an unsupported traversal direction.
    #[error("invalid template{}: {reason}", .node.as_ref().map(|n| format!(" at node '{n}'")).unwrap_or_default())]
    InvalidTemplate {
        /// Offending node, when one can be named
        node: Option<String>,
        /// Why the template was rejected
        reason: String,
    },

    /// A collection that the called routine does not handle.
    #[error("unsupported collection '{collection}'")]
    InvalidCollection {
        /// Name of the rejected collection
        collection: String,
    },

    /// Malformed input handed to an operation.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What is wrong with the input
        reason: String,
    },

    /// The document store failed.
    #[error("document store error during {operation}: {reason}")]
    Store {
        /// The store operation that failed
        operation: String,
        /// Reason for the failure
        reason: String,
    },

    /// Configuration error
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
    },

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl OntologyError {
    /// Shorthand for a [`OntologyError::NotFound`].
    pub fn not_found(kind: impl Into<String>, identifier: impl fmt::Display) -> Self {
        Self::NotFound {
            kind: kind.into(),
            identifier: identifier.to_string(),
        }
    }

    /// Shorthand for an [`OntologyError::InvalidTemplate`] naming a node.
    pub fn template_at(node: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            node: Some(node.to_string()),
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`OntologyError::InvalidTemplate`] not tied to one node.
    pub fn template(reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            node: None,
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`OntologyError::ImmutableField`].
    pub fn immutable(
        entity: impl Into<String>,
        identifier: impl fmt::Display,
        field: impl Into<String>,
    ) -> Self {
        Self::ImmutableField {
            entity: entity.into(),
            identifier: identifier.to_string(),
            field: field.into(),
        }
    }

    /// Returns `true` for [`OntologyError::NotFound`].
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias used by every library operation.
pub type Result<T, E = OntologyError> = std::result::Result<T, E>;

/// Error context wrapper that provides user-friendly error information.
///
/// Wraps an [`OntologyError`] with an optional suggestion and optional details.
/// The CLI renders it with colors; `Display` renders it as plain text for logs.
///
/// ```rust,no_run
/// use ontograph::core::{OntologyError, ErrorContext};
///
/// let context = ErrorContext::new(OntologyError::template("root is not a template"))
///     .with_suggestion("Flag the root node with both the root and template kinds")
///     .with_details("Only template roots describe worksheets");
///
/// println!("{}", context);
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: OntologyError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion and no details.
    #[must_use]
    pub const fn new(error: OntologyError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`OntologyError`] anywhere in the error chain, I/O errors and
/// TOML/JSON parse errors; anything else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(ontology_error) = error.chain().find_map(|e| e.downcast_ref::<OntologyError>()) {
        return create_error_context(ontology_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>()
        && io_error.kind() == std::io::ErrorKind::NotFound
    {
        return ErrorContext::new(OntologyError::Other {
            message: error_chain_message(&error),
        })
        .with_suggestion("Check that the store snapshot or configuration file path is correct");
    }

    if error.chain().any(|e| e.downcast_ref::<toml::de::Error>().is_some()) {
        return ErrorContext::new(OntologyError::Config {
            message: error_chain_message(&error),
        })
        .with_suggestion("Check the TOML syntax in your ontograph configuration file");
    }

    if error.chain().any(|e| e.downcast_ref::<serde_json::Error>().is_some()) {
        return ErrorContext::new(OntologyError::Other {
            message: error_chain_message(&error),
        })
        .with_suggestion("The file must be a JSON document produced by `ontograph` or matching its schema");
    }

    ErrorContext::new(OntologyError::Other {
        message: error_chain_message(&error),
    })
}

fn error_chain_message(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    message
}

/// Map each [`OntologyError`] variant to a tailored suggestion.
fn create_error_context(error: OntologyError) -> ErrorContext {
    match &error {
        OntologyError::NotFound {
            kind,
            ..
        } if kind == "tag serial" || kind == "tag definition" => ErrorContext::new(error)
            .with_suggestion("Reload the dictionary from the store, or commit the tag first")
            .with_details("The dictionary only knows tags that were committed or reloaded"),
        OntologyError::NotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the identifier spelling and that the record was committed"),
        OntologyError::Duplicate {
            ..
        } => ErrorContext::new(error)
            .with_details("Edge identifiers are the subject:predicate:object triple and must be unique"),
        OntologyError::ImmutableField {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Create a new record instead of changing the identity of a committed one",
        ),
        OntologyError::NotInitialized {
            ..
        } => ErrorContext::new(error).with_details(
            "A tag needs an odd-length term path, a data type and a label before it can be committed",
        ),
        OntologyError::InvalidTemplate {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Every worksheet and field of a template needs a symbol, and the root needs the root and template kinds",
        ),
        OntologyError::Config {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check ~/.ontograph/config.toml or the file passed with --config"),
        _ => ErrorContext::new(error),
    }
}
