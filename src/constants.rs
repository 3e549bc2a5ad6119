//! Well-known identifiers and defaults used throughout the ontograph codebase.
//!
//! The ontology bootstraps itself from a handful of terms whose persistent
//! identifiers every installation must share: the structural predicates that
//! the traversal engine and the template interpreter understand, the default
//! language code, and the tag used to detect a populated dictionary.

/// Separator between a term namespace and its local identifier, between the
/// elements of a tag path, and between the three parts of an edge identifier.
pub const TOKEN_SEPARATOR: &str = ":";

/// Language code of language-independent strings.
///
/// When a label set has no entry for the requested language, the entry
/// carrying this code wins over any other entry.
pub const LANGUAGE_DEFAULT: &str = "0";

/// Language used when neither the configuration nor the caller picks one.
pub const DEFAULT_SESSION_LANGUAGE: &str = "en";

/// Predicate expanded transitively by the traversal engine.
///
/// Edges with this predicate never appear in relationship results; the node
/// at their far end is traversed as if it were the origin.
pub const PREDICATE_SUBCLASS_OF: &str = "predicate:subclass-of";

/// Predicate linking a worksheet to the template (or worksheet) containing it.
pub const PREDICATE_COLLECTION_OF: &str = "predicate:collection-of";

/// Predicate linking a field to the worksheet it belongs to.
pub const PREDICATE_PROPERTY_OF: &str = "predicate:property-of";

/// Predicate linking a worksheet to its key field, and a linking field to the
/// key field of the worksheet it references.
pub const PREDICATE_INDEX: &str = "predicate:index";

/// Predicate linking a template root to its top-level record worksheets.
pub const PREDICATE_UNIT: &str = "predicate:unit";

/// Tag whose presence in the dictionary marks it as populated.
pub const BOOTSTRAP_TAG: &str = "tag:persistent-id";

/// Counter feeding tag serial identifiers.
pub const SEQUENCE_TAGS: &str = "tags";

/// Counter feeding node serial identifiers.
pub const SEQUENCE_NODES: &str = "nodes";

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "ONTOGRAPH_CONFIG";
