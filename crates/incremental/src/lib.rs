//! Trellis Incremental - change protocol and result-tree materialization.
//!
//! A query engine describes every mutation of a query result as a `Change`
//! over `Node`s. This crate applies those changes to a materialized tree of
//! `Entry`s that mirrors the query's shape (its `Format`), one change at a
//! time and without recomputing anything outside the touched path.
//!
//! # Core Concepts
//!
//! - `Node`: a row plus lazy producers of its related rows
//! - `Change`: `Add`, `Remove`, `Edit`, or a `Child` change nested under a row
//! - `Entry` / `Slot`: the materialized tree; slots are singular or plural
//! - `apply_change`: the recursive algorithm that folds a change into a tree
//! - `Input` / `Output`: the seam between an engine and its consumer
//!
//! # Example
//!
//! ```
//! use trellis_core::schema::{Format, SourceSchemaBuilder};
//! use trellis_core::Row;
//! use trellis_incremental::{apply_change, Change, Entry, Node, ROOT_RELATIONSHIP};
//!
//! let schema = SourceSchemaBuilder::new("issue")
//!     .unwrap()
//!     .primary_key(&["id"])
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! let format = Format::plural();
//!
//! let mut root = Entry::root(false);
//! let node = Node::new(Row::new().with("id", 1).with("title", "crash"));
//! apply_change(&mut root, &Change::add(node), &schema, ROOT_RELATIONSHIP, &format, false).unwrap();
//!
//! let rows = root.relationship(ROOT_RELATIONSHIP).unwrap();
//! assert_eq!(rows.to_string(), r#"[{"id":1,"title":"crash"}]"#);
//! ```

#![no_std]

extern crate alloc;

mod apply;
mod change;
mod entry;
mod input;
mod node;

pub use apply::apply_change;
pub use change::{Change, ChangeKind, ChildChange};
pub use entry::{Data, Entry, Slot, ROOT_RELATIONSHIP};
pub use input::{FetchRequest, Input, Output, SnapshotInput};
pub use node::{skip_yields, Node, RelationshipFn, Stream, StreamItem};
