//! Engine-side schema of a query source.

use super::order::Order;
use crate::error::{Error, Result};
use crate::row::Row;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cmp::Ordering;
use hashbrown::HashMap;

/// The structure of one level of a query as the engine sees it.
///
/// The ordering always ends with the primary key columns, so two rows
/// compare equal exactly when they are the same row.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceSchema {
    /// Table name.
    table_name: String,
    /// Primary key columns.
    primary_key: Vec<String>,
    /// Ordering columns, primary key included as tiebreak.
    sort: Vec<(String, Order)>,
    /// Whether this level is a junction table collapsed out of results.
    is_hidden: bool,
    /// Nested schemas by relationship name.
    relationships: HashMap<String, SourceSchema>,
}

impl SourceSchema {
    /// Returns the table name.
    #[inline]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the primary key columns.
    #[inline]
    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    /// Returns the ordering columns.
    #[inline]
    pub fn sort(&self) -> &[(String, Order)] {
        &self.sort
    }

    /// Returns whether this level is hidden from results.
    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.is_hidden
    }

    /// Gets the schema of a nested relationship.
    pub fn relationship(&self, name: &str) -> Result<&SourceSchema> {
        self.relationships
            .get(name)
            .ok_or_else(|| Error::unknown_relationship(name))
    }

    /// Returns the relationship names.
    pub fn relationship_names(&self) -> impl Iterator<Item = &str> {
        self.relationships.keys().map(String::as_str)
    }

    /// Compares two rows by this schema's ordering.
    pub fn compare_rows(&self, a: &Row, b: &Row) -> Ordering {
        for (column, order) in &self.sort {
            let ord = order.apply(a.get(column).cmp(b.get(column)));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

/// Builder for creating source schemas.
pub struct SourceSchemaBuilder {
    table_name: String,
    primary_key: Vec<String>,
    sort: Vec<(String, Order)>,
    is_hidden: bool,
    relationships: HashMap<String, SourceSchema>,
}

impl SourceSchemaBuilder {
    /// Creates a new source schema builder.
    pub fn new(table_name: impl Into<String>) -> Result<Self> {
        let table_name = table_name.into();
        check_naming_rules(&table_name)?;
        Ok(Self {
            table_name,
            primary_key: Vec::new(),
            sort: Vec::new(),
            is_hidden: false,
            relationships: HashMap::new(),
        })
    }

    /// Sets the primary key.
    pub fn primary_key(mut self, columns: &[&str]) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::invalid_schema(format!(
                "Primary key of {} cannot be empty",
                self.table_name
            )));
        }
        for name in columns {
            check_naming_rules(name)?;
        }
        self.primary_key = columns.iter().map(|c| c.to_string()).collect();
        Ok(self)
    }

    /// Appends an ordering column.
    pub fn order_by(mut self, column: impl Into<String>, order: Order) -> Self {
        let column = column.into();
        if !self.sort.iter().any(|(c, _)| *c == column) {
            self.sort.push((column, order));
        }
        self
    }

    /// Marks this level as a hidden junction table.
    pub fn hidden(mut self, is_hidden: bool) -> Self {
        self.is_hidden = is_hidden;
        self
    }

    /// Adds a nested relationship schema.
    pub fn relationship(mut self, name: impl Into<String>, schema: SourceSchema) -> Self {
        self.relationships.insert(name.into(), schema);
        self
    }

    /// Builds the schema, appending the primary key to the ordering.
    pub fn build(mut self) -> Result<SourceSchema> {
        if self.primary_key.is_empty() {
            return Err(Error::invalid_schema(format!(
                "Table {} has no primary key",
                self.table_name
            )));
        }
        for column in &self.primary_key {
            if !self.sort.iter().any(|(c, _)| c == column) {
                self.sort.push((column.clone(), Order::Asc));
            }
        }
        Ok(SourceSchema {
            table_name: self.table_name,
            primary_key: self.primary_key,
            sort: self.sort,
            is_hidden: self.is_hidden,
            relationships: self.relationships,
        })
    }
}

/// Validates a name follows naming rules.
fn check_naming_rules(name: &str) -> Result<()> {
    let mut chars = name.chars();
    match chars.next() {
        None => Err(Error::invalid_schema("Name cannot be empty")),
        Some(first) if !first.is_ascii_alphabetic() && first != '_' => Err(Error::invalid_schema(
            format!("Name must start with letter or underscore: {}", name),
        )),
        Some(_) if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') => Err(
            Error::invalid_schema(format!("Name contains invalid characters: {}", name)),
        ),
        Some(_) => Ok(()),
    }
}
