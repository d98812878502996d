//! Schema module for Trellis.
//!
//! Two descriptors shape a view:
//!
//! - `SourceSchema` comes from the query engine. It names the primary key,
//!   the ordering the engine emits rows in, which levels are hidden junction
//!   tables, and the nested schema of every relationship.
//! - `Format` comes from the query's declared result shape. It says whether
//!   each level is a single row or an ordered list, and which relationships
//!   are materialized at all.

mod format;
mod order;
mod source;

pub use format::Format;
pub use order::Order;
pub use source::{SourceSchema, SourceSchemaBuilder};
