//! Trellis Reactive - reactive materialized views.
//!
//! A `View` consumes the changes of one query pipeline and maintains the
//! query's result as a tree shaped by a `Format`. Consumers read cheap
//! snapshots, subscribe to updates, and watch the query's completion status.
//!
//! # Core Concepts
//!
//! - `ViewBuilder` / `View`: construction, hydration, and change application
//! - `QueryComplete` / `completion()`: whether the result is authoritative
//! - `QueryStatus` / `QueryError`: the completion state a view exposes
//! - `SubscriptionManager` / `Snapshot`: change notification
//! - `Ttl`: how long the host keeps the query around after the view goes
//!
//! # Example
//!
//! ```
//! use futures::executor::LocalPool;
//! use trellis_core::schema::{Format, SourceSchemaBuilder};
//! use trellis_core::Row;
//! use trellis_incremental::{Change, Node, SnapshotInput};
//! use trellis_reactive::{completion, QueryStatus, ViewBuilder};
//!
//! let schema = SourceSchemaBuilder::new("issue")
//!     .unwrap()
//!     .primary_key(&["id"])
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! let mut input = SnapshotInput::new(schema, vec![Node::new(Row::new().with("id", 1))]);
//!
//! let mut pool = LocalPool::new();
//! let (resolver, complete) = completion();
//! let view = ViewBuilder::new(Format::plural())
//!     .query_complete(complete)
//!     .build(&mut input, &pool.spawner())
//!     .unwrap();
//! assert_eq!(view.status(), QueryStatus::Unknown);
//!
//! input.push(Change::add(Node::new(Row::new().with("id", 2)))).unwrap();
//! assert_eq!(view.data().to_string(), r#"[{"id":1},{"id":2}]"#);
//!
//! resolver.resolve();
//! pool.run_until_stalled();
//! assert_eq!(view.status(), QueryStatus::Complete);
//! ```

#![no_std]

extern crate alloc;

mod complete;
mod status;
pub mod subscription;
mod ttl;
mod view;

pub use complete::{completion, QueryComplete, Resolver};
pub use status::{ErrorKind, ErroredQuery, QueryError, QueryStatus, DEFAULT_ERROR_MESSAGE};
pub use subscription::{Snapshot, SnapshotCallback, Subscription, SubscriptionId, SubscriptionManager};
pub use ttl::{ParseTtlError, Ttl, DEFAULT_TTL, MAX_TTL};
pub use view::{CommitCallback, TransactionCommitFn, View, ViewBuilder, ViewOutput};

// Re-export commonly used types from dependencies
pub use trellis_core::schema::Format;
pub use trellis_incremental::{Change, Data, Entry, Input, Output, Slot};
