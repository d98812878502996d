//! Row structure for Trellis.
//!
//! A `Row` maps column names to values. Columns are kept sorted by name so
//! rows compare, hash and render deterministically.

use crate::value::Value;
use alloc::collections::btree_map::{self, BTreeMap};
use alloc::string::String;
use core::fmt;

static NULL: Value = Value::Null;

/// A row of named column values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Row {
    columns: BTreeMap<String, Value>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this row with `column` set to `value`.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Gets the value of a column. Missing columns read as `Value::Null`.
    pub fn get(&self, column: &str) -> &Value {
        self.columns.get(column).unwrap_or(&NULL)
    }

    /// Returns true if the column is present (even if it holds Null).
    #[inline]
    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Sets a column value, returning the previous one.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.columns.insert(column.into(), value.into())
    }

    /// Removes a column, returning its value.
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.columns.remove(column)
    }

    /// Overwrites every column present in `other`, keeping the rest.
    pub fn merge(&mut self, other: &Row) {
        for (column, value) in &other.columns {
            self.columns.insert(column.clone(), value.clone());
        }
    }

    /// Iterates over `(column, value)` pairs in column-name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.columns.iter()
    }

    /// Returns the number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if this row has no columns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

/// Renders the row as a JSON object.
impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (column, value)) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", Value::String(column.clone()), value)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn test_row_with_and_get() {
        let row = Row::new().with("id", 1).with("name", "Alice");
        assert_eq!(row.get("id"), &Value::Int64(1));
        assert_eq!(row.get("name"), &Value::String("Alice".into()));
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_row_missing_column_is_null() {
        let row = Row::new().with("id", 1);
        assert!(row.get("data").is_null());
        assert!(!row.contains("data"));

        let row = row.with("data", None::<i64>);
        assert!(row.get("data").is_null());
        assert!(row.contains("data"));
    }

    #[test]
    fn test_row_merge_overwrites_present_columns() {
        let mut row = Row::new().with("id", 2).with("b", "b").with("extra", true);
        row.merge(&Row::new().with("id", 2).with("b", "b2"));
        assert_eq!(row.get("b"), &Value::from("b2"));
        assert_eq!(row.get("extra"), &Value::Boolean(true));
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn test_row_from_iter() {
        let row: Row = vec![("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(row, Row::new().with("b", 2).with("a", 1));
    }

    #[test]
    fn test_row_set_remove() {
        let mut row = Row::new();
        assert_eq!(row.set("a", 1), None);
        assert_eq!(row.set("a", 2), Some(Value::Int64(1)));
        assert_eq!(row.remove("a"), Some(Value::Int64(2)));
        assert!(row.is_empty());
    }

    #[test]
    fn test_row_display() {
        let row = Row::new().with("name", "foo").with("id", 1).with("data", None::<i64>);
        assert_eq!(row.to_string(), r#"{"data":null,"id":1,"name":"foo"}"#);
    }
}
