//! Trellis Core - Core types and schema descriptors for Trellis views.
//!
//! This crate provides the foundational types shared by the change protocol
//! and the materialized view:
//!
//! - `Value`: Scalar cell values (Null, Boolean, Int64, Float64, String)
//! - `Row`: A row of named column values
//! - `schema`: Engine-side descriptors (`SourceSchema`, `Order`) and the
//!   view-side result shape (`Format`)
//! - `Error`: Error types for change application and view construction
//!
//! # Example
//!
//! ```rust
//! use trellis_core::{Row, Value};
//! use trellis_core::schema::{Order, SourceSchemaBuilder};
//!
//! let schema = SourceSchemaBuilder::new("issue")
//!     .unwrap()
//!     .primary_key(&["id"])
//!     .unwrap()
//!     .order_by("created", Order::Desc)
//!     .build()
//!     .unwrap();
//!
//! let row = Row::new().with("id", 1).with("created", 100).with("title", "Crash");
//!
//! assert_eq!(row.get("title"), &Value::String("Crash".into()));
//! assert_eq!(schema.sort(), &[(String::from("created"), Order::Desc), (String::from("id"), Order::Asc)]);
//! ```

#![no_std]

extern crate alloc;

mod error;
mod row;
pub mod schema;
mod value;

pub use error::{Error, Result};
pub use row::Row;
pub use value::Value;
