//! Enumerations describing tags and nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Data type of the values a tag describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Short single-line text
    String,
    /// Long free text
    Text,
    /// Whole number
    Integer,
    /// Floating point number
    Float,
    /// True or false
    Boolean,
    /// Calendar date
    Date,
    /// Web address
    Url,
    /// One value out of a controlled list
    Enum,
    /// Several values out of a controlled list
    Set,
    /// Reference to another record
    Reference,
    /// Nested structure of other tags
    Struct,
}

impl DataType {
    /// Lowercase name used in records and output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Url => "url",
            Self::Enum => "enum",
            Self::Set => "set",
            Self::Reference => "reference",
            Self::Struct => "struct",
        }
    }

    /// Whether a range applies to values of this type.
    pub const fn is_ordered(self) -> bool {
        matches!(self, Self::Integer | Self::Float | Self::Date)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data-kind flags qualifying a tag (or a node).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    /// A value is required
    Mandatory,
    /// The value is a list
    List,
    /// Categorical value
    Categorical,
    /// Quantitative value
    Quantitative,
    /// Discrete value
    Discrete,
    /// Value usable as a summary
    Summary,
    /// Value not shown to the public
    Private,
}

/// Node-type flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Entry point of a structure
    Root,
    /// Node with no further structure below
    Leaf,
    /// Root describing a data-entry template
    Template,
    /// Top-level record of a template
    Unit,
    /// Container of other nodes
    Collection,
    /// Controlled list of values
    Enumeration,
    /// Node standing for a field
    Property,
}

impl NodeKind {
    /// Lowercase name used in records and output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Leaf => "leaf",
            Self::Template => "template",
            Self::Unit => "unit",
            Self::Collection => "collection",
            Self::Enumeration => "enumeration",
            Self::Property => "property",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
