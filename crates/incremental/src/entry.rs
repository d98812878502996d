//! The materialized result tree.
//!
//! Entries live behind `Rc` and are mutated with `Rc::make_mut`. A snapshot
//! taken before a change keeps seeing the old tree; the change copies only
//! the entries on the path it touches and every other subtree stays shared.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::slice;
use trellis_core::{Row, Value};

/// The relationship key of the synthetic root slot.
pub const ROOT_RELATIONSHIP: &str = "";

/// A relationship slot: one optional row or an ordered list of rows.
#[derive(Clone, Debug, PartialEq)]
pub enum Slot {
    Singular(Option<Rc<Entry>>),
    Plural(Vec<Rc<Entry>>),
}

impl Slot {
    /// Creates an empty slot of the given shape.
    pub fn empty(singular: bool) -> Self {
        if singular {
            Slot::Singular(None)
        } else {
            Slot::Plural(Vec::new())
        }
    }

    /// Returns true for singular slots.
    #[inline]
    pub fn is_singular(&self) -> bool {
        matches!(self, Slot::Singular(_))
    }

    /// Returns the entry of a singular slot.
    pub fn as_singular(&self) -> Option<&Entry> {
        match self {
            Slot::Singular(entry) => entry.as_deref(),
            Slot::Plural(_) => None,
        }
    }

    /// Returns the entries of a plural slot.
    pub fn as_plural(&self) -> Option<&[Rc<Entry>]> {
        match self {
            Slot::Singular(_) => None,
            Slot::Plural(entries) => Some(entries),
        }
    }

    /// Iterates over the entries of either shape.
    pub fn iter(&self) -> slice::Iter<'_, Rc<Entry>> {
        match self {
            Slot::Singular(entry) => entry.as_slice().iter(),
            Slot::Plural(entries) => entries.iter(),
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        match self {
            Slot::Singular(entry) => usize::from(entry.is_some()),
            Slot::Plural(entries) => entries.len(),
        }
    }

    /// Returns true if the slot holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Renders the slot as JSON: `null`, an object, or an array.
impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Singular(None) => f.write_str("null"),
            Slot::Singular(Some(entry)) => write!(f, "{}", entry),
            Slot::Plural(entries) => {
                f.write_str("[")?;
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", entry)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// A row of the materialized result with its related rows.
#[derive(Clone, Debug)]
pub struct Entry {
    row: Row,
    relationships: BTreeMap<String, Slot>,
    /// Number of un-removed adds of this row's key.
    pub(crate) ref_count: u32,
    id: Option<String>,
}

impl Entry {
    pub(crate) fn new(row: Row, id: Option<String>) -> Self {
        Self {
            row,
            relationships: BTreeMap::new(),
            ref_count: 1,
            id,
        }
    }

    /// Creates the synthetic root entry holding an empty slot of the given shape.
    pub fn root(singular: bool) -> Self {
        let mut root = Self::new(Row::new(), None);
        root.relationships
            .insert(String::from(ROOT_RELATIONSHIP), Slot::empty(singular));
        root
    }

    /// Returns the row.
    #[inline]
    pub fn row(&self) -> &Row {
        &self.row
    }

    /// Gets a column value.
    #[inline]
    pub fn get(&self, column: &str) -> &Value {
        self.row.get(column)
    }

    /// Gets a relationship slot.
    #[inline]
    pub fn relationship(&self, name: &str) -> Option<&Slot> {
        self.relationships.get(name)
    }

    /// Iterates over relationship slots in name order.
    pub fn relationships(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.relationships.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the stable id derived from the primary key, when ids are enabled.
    #[inline]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns how many times this row is currently referenced by the engine.
    #[inline]
    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }

    pub(crate) fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    pub(crate) fn row_mut(&mut self) -> &mut Row {
        &mut self.row
    }

    pub(crate) fn slot_mut(&mut self, name: &str, singular: bool) -> &mut Slot {
        self.relationships
            .entry(String::from(name))
            .or_insert_with(|| Slot::empty(singular))
    }

    pub(crate) fn set_slot(&mut self, name: &str, slot: Slot) {
        self.relationships.insert(String::from(name), slot);
    }
}

/// Entries compare by content; bookkeeping (ref count, id) is ignored.
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row && self.relationships == other.relationships
    }
}

/// Renders the entry as a JSON object, columns and relationships merged by name.
impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Field<'a> {
            Column(&'a Value),
            Relationship(&'a Slot),
        }

        let mut fields: Vec<(&str, Field<'_>)> = self
            .row
            .iter()
            .map(|(k, v)| (k.as_str(), Field::Column(v)))
            .chain(
                self.relationships
                    .iter()
                    .map(|(k, v)| (k.as_str(), Field::Relationship(v))),
            )
            .collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        f.write_str("{")?;
        for (i, (name, field)) in fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:", Value::from(*name))?;
            match field {
                Field::Column(value) => write!(f, "{}", value)?,
                Field::Relationship(slot) => write!(f, "{}", slot)?,
            }
        }
        f.write_str("}")
    }
}

/// A cheap snapshot of a view's result.
///
/// Holds the root entry; later changes to the view never alter a snapshot
/// already handed out.
#[derive(Clone, Debug, PartialEq)]
pub struct Data {
    root: Rc<Entry>,
}

impl Data {
    /// Wraps a root entry.
    pub fn new(root: Rc<Entry>) -> Self {
        Self { root }
    }

    /// Returns the top-level result slot.
    pub fn value(&self) -> &Slot {
        const EMPTY: &Slot = &Slot::Singular(None);
        self.root.relationship(ROOT_RELATIONSHIP).unwrap_or(EMPTY)
    }

    /// Returns the root entry.
    #[inline]
    pub fn root(&self) -> &Rc<Entry> {
        &self.root
    }

    /// Returns the single result row of a singular query.
    #[inline]
    pub fn as_singular(&self) -> Option<&Entry> {
        self.value().as_singular()
    }

    /// Returns the result rows of a plural query.
    #[inline]
    pub fn as_plural(&self) -> Option<&[Rc<Entry>]> {
        self.value().as_plural()
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
