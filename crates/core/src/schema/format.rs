//! Result shape descriptor.

use alloc::string::String;
use hashbrown::HashMap;

/// The shape of one level of a query result.
///
/// `singular` levels hold at most one row, plural levels an ordered list.
/// Only relationships listed here are materialized; any others a node
/// carries are never evaluated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Format {
    /// Whether this level holds a single row.
    pub singular: bool,
    /// Nested formats by relationship name.
    pub relationships: HashMap<String, Format>,
}

impl Format {
    /// A plural level with no relationships.
    pub fn plural() -> Self {
        Self {
            singular: false,
            relationships: HashMap::new(),
        }
    }

    /// A singular level with no relationships.
    pub fn singular() -> Self {
        Self {
            singular: true,
            relationships: HashMap::new(),
        }
    }

    /// Returns this format with a nested relationship format added.
    pub fn with_relationship(mut self, name: impl Into<String>, format: Format) -> Self {
        self.relationships.insert(name.into(), format);
        self
    }

    /// Gets the format of a nested relationship.
    #[inline]
    pub fn relationship(&self, name: &str) -> Option<&Format> {
        self.relationships.get(name)
    }

    /// Returns the nesting depth (a format without relationships has depth 1).
    pub fn depth(&self) -> usize {
        1 + self
            .relationships
            .values()
            .map(Format::depth)
            .max()
            .unwrap_or(0)
    }
}
