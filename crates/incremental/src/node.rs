//! Nodes and node streams emitted by the query engine.
//!
//! A `Node` is a row plus one lazy producer per relationship. Producers are
//! only called when a change actually walks into that relationship, so a
//! change touching one leaf never materializes its siblings.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use trellis_core::Row;

/// An item of a node stream.
#[derive(Clone, Debug)]
pub enum StreamItem {
    /// A result node.
    Node(Node),
    /// A progress marker the engine may interleave with nodes. Never data.
    Yield,
}

impl StreamItem {
    /// Returns the node, or None for a yield marker.
    #[inline]
    pub fn into_node(self) -> Option<Node> {
        match self {
            StreamItem::Node(node) => Some(node),
            StreamItem::Yield => None,
        }
    }
}

impl From<Node> for StreamItem {
    fn from(node: Node) -> Self {
        StreamItem::Node(node)
    }
}

/// A finite, lazily produced sequence of nodes and yield markers.
pub type Stream = Box<dyn Iterator<Item = StreamItem>>;

/// Producer of a relationship's child nodes.
pub type RelationshipFn = Rc<dyn Fn() -> Stream>;

/// Drops yield markers from a stream.
pub fn skip_yields(stream: Stream) -> impl Iterator<Item = Node> {
    stream.filter_map(StreamItem::into_node)
}

/// A row together with lazy producers for its related rows.
#[derive(Clone)]
pub struct Node {
    row: Row,
    relationships: BTreeMap<String, RelationshipFn>,
}

impl Node {
    /// Creates a node with no relationships.
    pub fn new(row: Row) -> Self {
        Self {
            row,
            relationships: BTreeMap::new(),
        }
    }

    /// Adds a relationship backed by a producer function.
    pub fn with_relationship<F>(mut self, name: impl Into<String>, producer: F) -> Self
    where
        F: Fn() -> Stream + 'static,
    {
        self.relationships.insert(name.into(), Rc::new(producer));
        self
    }

    /// Adds a relationship backed by a fixed list of child nodes.
    pub fn with_children(self, name: impl Into<String>, children: Vec<Node>) -> Self {
        self.with_relationship(name, move || -> Stream {
            Box::new(children.clone().into_iter().map(StreamItem::Node))
        })
    }

    /// Returns the row.
    #[inline]
    pub fn row(&self) -> &Row {
        &self.row
    }

    /// Iterates over `(name, producer)` pairs in name order.
    pub fn relationships(&self) -> impl Iterator<Item = (&str, &RelationshipFn)> {
        self.relationships.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Gets the producer of a relationship.
    #[inline]
    pub fn relationship(&self, name: &str) -> Option<&RelationshipFn> {
        self.relationships.get(name)
    }

    /// Walks every relationship stream to its end.
    ///
    /// Engines release per-row operator state when a removed row's streams
    /// are exhausted, so removals must drain even what the view ignores.
    pub fn drain(&self) {
        for producer in self.relationships.values() {
            for child in skip_yields(producer()) {
                child.drain();
            }
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("row", &self.row)
            .field("relationships", &self.relationships.keys().collect::<Vec<_>>())
            .finish()
    }
}
