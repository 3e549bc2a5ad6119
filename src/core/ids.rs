//! Identifier newtypes for the four graph collections.
//!
//! Tags, terms, nodes and edges are memoized in separate tables keyed by their
//! native identifiers. Giving each kind its own type makes it impossible to look
//! a tag up in the node table by accident, even when two identifiers happen to
//! share the same textual form.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::TOKEN_SEPARATOR;

/// Native (and persistent) identifier of a term: `namespace:local`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermId(String);

impl TermId {
    /// Wrap an existing persistent identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the persistent identifier from its namespace and local part.
    ///
    /// An empty namespace yields the bare local identifier.
    pub fn from_parts(namespace: &str, local: &str) -> Self {
        if namespace.is_empty() {
            Self(local.to_string())
        } else {
            Self(format!("{namespace}{TOKEN_SEPARATOR}{local}"))
        }
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TermId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TermId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Native (and persistent) identifier of a tag: its term path joined with `:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(String);

impl TagId {
    /// Wrap an existing persistent identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Join a term path into a tag identifier.
    pub fn from_path(path: &[TermId]) -> Self {
        Self(path.iter().map(TermId::as_str).collect::<Vec<_>>().join(TOKEN_SEPARATOR))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TagId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TagId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Native identifier of a node: the serial number assigned at commit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Wrap a serial number.
    pub const fn new(serial: u64) -> Self {
        Self(serial)
    }

    /// The serial number.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NodeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Native identifier of an edge: `subject:predicate:object`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    /// Compute the deterministic identifier of a relationship triple.
    pub fn from_triple(subject: NodeId, predicate: &TermId, object: NodeId) -> Self {
        Self(format!("{subject}{TOKEN_SEPARATOR}{predicate}{TOKEN_SEPARATOR}{object}"))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
