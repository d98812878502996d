//! Applying changes to the materialized result tree.
//!
//! `apply_change` is the whole algorithm: it addresses one slot of one
//! entry, and recurses for `Child` changes and for relationship
//! materialization. The root is just an entry whose only slot is keyed by
//! `ROOT_RELATIONSHIP`.
//!
//! Rows are located by binary search with the engine's row ordering
//! (`SourceSchema::compare_rows`). The view never sorts on its own; it
//! trusts that the engine emits positions consistent with that ordering.

use crate::change::Change;
use crate::entry::{Entry, Slot};
use crate::node::{skip_yields, Node};
use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cmp::Ordering;
use log::trace;
use trellis_core::schema::{Format, SourceSchema};
use trellis_core::{Error, Result, Row};

/// Applies one change to `parent`'s slot named `relationship`.
///
/// `schema` and `format` describe the rows of that slot. With `with_ids`,
/// every created or edited entry gets an id derived from its primary key.
///
/// Malformed changes (removing a missing row, a second row in a singular
/// slot, ...) are reported as errors. A nested error can leave the tree
/// partially updated.
pub fn apply_change(
    parent: &mut Entry,
    change: &Change,
    schema: &SourceSchema,
    relationship: &str,
    format: &Format,
    with_ids: bool,
) -> Result<()> {
    if schema.is_hidden() {
        return apply_hidden(parent, change, schema, relationship, format, with_ids);
    }

    trace!(
        "apply {:?} to '{}' ({})",
        change.kind(),
        relationship,
        schema.table_name()
    );

    match change {
        Change::Add { node } => add(parent, node, schema, relationship, format, with_ids),
        Change::Remove { node } => {
            remove(parent, node.row(), schema, relationship, format)?;
            node.drain();
            Ok(())
        }
        Change::Edit { old_node, node } => edit(
            parent,
            old_node.row(),
            node.row(),
            schema,
            relationship,
            format,
            with_ids,
        ),
        Change::Child { node, child } => {
            let existing = locate(
                slot_mut(parent, relationship, format)?,
                node.row(),
                schema,
                relationship,
            )?;
            let Some(child_format) = format.relationship(&child.relationship_name) else {
                return Ok(());
            };
            let child_schema = schema.relationship(&child.relationship_name)?;
            apply_change(
                Rc::make_mut(existing),
                &child.change,
                child_schema,
                &child.relationship_name,
                child_format,
                with_ids,
            )
        }
    }
}

/// Hidden levels (junction tables) are walked through but never rendered:
/// their children land directly in the parent's slot.
fn apply_hidden(
    parent: &mut Entry,
    change: &Change,
    schema: &SourceSchema,
    relationship: &str,
    format: &Format,
    with_ids: bool,
) -> Result<()> {
    match change {
        Change::Add { node } | Change::Remove { node } => {
            let is_add = matches!(change, Change::Add { .. });
            for (name, producer) in node.relationships() {
                let child_schema = schema.relationship(name)?;
                for child in skip_yields(producer()) {
                    let change = if is_add {
                        Change::add(child)
                    } else {
                        Change::remove(child)
                    };
                    apply_change(parent, &change, child_schema, relationship, format, with_ids)?;
                }
            }
            Ok(())
        }
        // A hidden row's relationship-changing edits arrive as remove + add.
        Change::Edit { .. } => Ok(()),
        Change::Child { child, .. } => {
            let child_schema = schema.relationship(&child.relationship_name)?;
            apply_change(parent, &child.change, child_schema, relationship, format, with_ids)
        }
    }
}

fn add(
    parent: &mut Entry,
    node: &Node,
    schema: &SourceSchema,
    relationship: &str,
    format: &Format,
    with_ids: bool,
) -> Result<()> {
    match slot_mut(parent, relationship, format)? {
        Slot::Singular(existing) => {
            if let Some(entry) = existing {
                if schema.compare_rows(entry.row(), node.row()) != Ordering::Equal {
                    return Err(Error::singular_conflict(relationship));
                }
                Rc::make_mut(entry).ref_count += 1;
                return Ok(());
            }
            *existing = Some(Rc::new(materialize(node, schema, format, with_ids)?));
        }
        Slot::Plural(entries) => match search(entries, node.row(), schema) {
            Ok(pos) => Rc::make_mut(&mut entries[pos]).ref_count += 1,
            Err(pos) => {
                let entry = materialize(node, schema, format, with_ids)?;
                entries.insert(pos, Rc::new(entry));
            }
        },
    }
    Ok(())
}

fn remove(
    parent: &mut Entry,
    row: &Row,
    schema: &SourceSchema,
    relationship: &str,
    format: &Format,
) -> Result<()> {
    match slot_mut(parent, relationship, format)? {
        Slot::Singular(existing) => {
            let entry = existing
                .as_mut()
                .filter(|e| schema.compare_rows(e.row(), row) == Ordering::Equal)
                .ok_or_else(|| Error::node_not_found(relationship))?;
            if entry.ref_count == 1 {
                *existing = None;
            } else {
                Rc::make_mut(entry).ref_count -= 1;
            }
        }
        Slot::Plural(entries) => {
            let pos = search(entries, row, schema)
                .map_err(|_| Error::node_not_found(relationship))?;
            if entries[pos].ref_count == 1 {
                entries.remove(pos);
            } else {
                Rc::make_mut(&mut entries[pos]).ref_count -= 1;
            }
        }
    }
    Ok(())
}

fn edit(
    parent: &mut Entry,
    old_row: &Row,
    row: &Row,
    schema: &SourceSchema,
    relationship: &str,
    format: &Format,
    with_ids: bool,
) -> Result<()> {
    let entries = match slot_mut(parent, relationship, format)? {
        Slot::Singular(existing) => {
            let entry = existing
                .as_mut()
                .filter(|e| schema.compare_rows(e.row(), old_row) == Ordering::Equal)
                .ok_or_else(|| Error::node_not_found(relationship))?;
            apply_edit(Rc::make_mut(entry), row, schema, with_ids);
            return Ok(());
        }
        Slot::Plural(entries) => entries,
    };

    let old_pos =
        search(entries, old_row, schema).map_err(|_| Error::node_not_found(relationship))?;

    if schema.compare_rows(old_row, row) == Ordering::Equal {
        apply_edit(Rc::make_mut(&mut entries[old_pos]), row, schema, with_ids);
        return Ok(());
    }

    // The ordering key changed. A sole reference whose new position is its
    // current one (or the one right after it, which is the same place once
    // it is taken out) is edited where it stands.
    let stays = matches!(
        search(entries, row, schema),
        Err(pos) if pos == old_pos || pos == old_pos + 1
    );
    if stays && entries[old_pos].ref_count == 1 {
        apply_edit(Rc::make_mut(&mut entries[old_pos]), row, schema, with_ids);
        return Ok(());
    }

    let moved = if entries[old_pos].ref_count == 1 {
        entries.remove(old_pos)
    } else {
        let left_behind = &mut entries[old_pos];
        Rc::make_mut(left_behind).ref_count -= 1;
        Rc::new((**left_behind).clone())
    };

    match search(entries, row, schema) {
        Ok(pos) => {
            let target = Rc::make_mut(&mut entries[pos]);
            target.ref_count += 1;
            apply_edit(target, row, schema, with_ids);
        }
        Err(pos) => {
            let mut moved = moved;
            let entry = Rc::make_mut(&mut moved);
            entry.ref_count = 1;
            apply_edit(entry, row, schema, with_ids);
            entries.insert(pos, moved);
        }
    }
    Ok(())
}

/// Builds the entry for an added node, materializing every relationship the
/// format declares. Relationships outside the format are never evaluated.
fn materialize(
    node: &Node,
    schema: &SourceSchema,
    format: &Format,
    with_ids: bool,
) -> Result<Entry> {
    let mut entry = Entry::new(node.row().clone(), make_id(node.row(), schema, with_ids));
    for (name, producer) in node.relationships() {
        let Some(child_format) = format.relationship(name) else {
            continue;
        };
        let child_schema = schema.relationship(name)?;
        entry.set_slot(name, Slot::empty(child_format.singular));
        for child in skip_yields(producer()) {
            apply_change(
                &mut entry,
                &Change::add(child),
                child_schema,
                name,
                child_format,
                with_ids,
            )?;
        }
    }
    Ok(entry)
}

fn apply_edit(entry: &mut Entry, row: &Row, schema: &SourceSchema, with_ids: bool) {
    entry.row_mut().merge(row);
    if with_ids {
        let id = make_id(entry.row(), schema, true);
        entry.set_id(id);
    }
}

/// Derives an entry id from the primary key: the JSON of the key value, or
/// a JSON array for compound keys.
fn make_id(row: &Row, schema: &SourceSchema, with_ids: bool) -> Option<String> {
    if !with_ids {
        return None;
    }
    let id = match schema.primary_key() {
        [column] => row.get(column).to_string(),
        columns => {
            let values: Vec<String> = columns.iter().map(|c| row.get(c).to_string()).collect();
            format!("[{}]", values.join(","))
        }
    };
    Some(id)
}

fn slot_mut<'a>(parent: &'a mut Entry, relationship: &str, format: &Format) -> Result<&'a mut Slot> {
    let slot = parent.slot_mut(relationship, format.singular);
    if slot.is_singular() != format.singular {
        return Err(Error::shape_mismatch(relationship));
    }
    Ok(slot)
}

/// Finds the entry with `row`'s key.
fn locate<'a>(
    slot: &'a mut Slot,
    row: &Row,
    schema: &SourceSchema,
    relationship: &str,
) -> Result<&'a mut Rc<Entry>> {
    match slot {
        Slot::Singular(existing) => existing
            .as_mut()
            .filter(|e| schema.compare_rows(e.row(), row) == Ordering::Equal)
            .ok_or_else(|| Error::node_not_found(relationship)),
        Slot::Plural(entries) => {
            let pos = search(entries, row, schema)
                .map_err(|_| Error::node_not_found(relationship))?;
            Ok(&mut entries[pos])
        }
    }
}

#[inline]
fn search(
    entries: &[Rc<Entry>],
    row: &Row,
    schema: &SourceSchema,
) -> core::result::Result<usize, usize> {
    entries.binary_search_by(|entry| schema.compare_rows(entry.row(), row))
}
