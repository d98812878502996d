//! Change events pushed by the query engine.
//!
//! A `Change` describes one incremental mutation of a query result. `Child`
//! changes nest, so an edit several relationships below the root is a single
//! event that names the path row by row.

use crate::node::Node;
use alloc::boxed::Box;
use alloc::string::String;

/// The kind of a change, without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Add,
    Remove,
    Edit,
    Child,
}

/// A change nested under a relationship of some row.
#[derive(Clone, Debug)]
pub struct ChildChange {
    /// The relationship the inner change applies to.
    pub relationship_name: String,
    /// The inner change.
    pub change: Box<Change>,
}

/// One incremental mutation of a query result.
#[derive(Clone, Debug)]
pub enum Change {
    /// A row enters the result.
    Add { node: Node },
    /// A row leaves the result.
    Remove { node: Node },
    /// A row's columns changed.
    Edit { old_node: Node, node: Node },
    /// Something changed below `node` in one of its relationships.
    Child { node: Node, child: ChildChange },
}

impl Change {
    /// Creates an add change.
    #[inline]
    pub fn add(node: Node) -> Self {
        Change::Add { node }
    }

    /// Creates a remove change.
    #[inline]
    pub fn remove(node: Node) -> Self {
        Change::Remove { node }
    }

    /// Creates an edit change.
    #[inline]
    pub fn edit(old_node: Node, node: Node) -> Self {
        Change::Edit { old_node, node }
    }

    /// Creates a child change.
    pub fn child(node: Node, relationship_name: impl Into<String>, change: Change) -> Self {
        Change::Child {
            node,
            child: ChildChange {
                relationship_name: relationship_name.into(),
                change: Box::new(change),
            },
        }
    }

    /// Returns the kind of this change.
    pub fn kind(&self) -> ChangeKind {
        match self {
            Change::Add { .. } => ChangeKind::Add,
            Change::Remove { .. } => ChangeKind::Remove,
            Change::Edit { .. } => ChangeKind::Edit,
            Change::Child { .. } => ChangeKind::Child,
        }
    }

    /// Returns the node this change addresses (the new node for edits).
    pub fn node(&self) -> &Node {
        match self {
            Change::Add { node }
            | Change::Remove { node }
            | Change::Edit { node, .. }
            | Change::Child { node, .. } => node,
        }
    }

    /// Returns how many relationships this change descends through.
    pub fn depth(&self) -> usize {
        match self {
            Change::Child { child, .. } => 1 + child.change.depth(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::Row;

    fn make_node(id: i64) -> Node {
        Node::new(Row::new().with("id", id))
    }

    #[test]
    fn test_change_kind() {
        assert_eq!(Change::add(make_node(1)).kind(), ChangeKind::Add);
        assert_eq!(Change::remove(make_node(1)).kind(), ChangeKind::Remove);
        assert_eq!(Change::edit(make_node(1), make_node(1)).kind(), ChangeKind::Edit);
        assert_eq!(
            Change::child(make_node(1), "labels", Change::add(make_node(2))).kind(),
            ChangeKind::Child
        );
    }

    #[test]
    fn test_change_node_is_new_node() {
        let old = Node::new(Row::new().with("id", 1).with("b", "old"));
        let new = Node::new(Row::new().with("id", 1).with("b", "new"));
        let change = Change::edit(old, new);
        assert_eq!(change.node().row().get("b").as_str(), Some("new"));
    }

    #[test]
    fn test_change_depth() {
        let leaf = Change::edit(make_node(3), make_node(3));
        let nested = Change::child(
            make_node(1),
            "labels",
            Change::child(make_node(2), "labels", leaf),
        );
        assert_eq!(nested.depth(), 2);
        match nested {
            Change::Child { child, .. } => assert_eq!(child.relationship_name, "labels"),
            _ => panic!("Wrong change type"),
        }
    }
}
