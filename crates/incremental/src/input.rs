//! The seams between a query engine and a view.

use crate::change::Change;
use crate::node::{Node, Stream, StreamItem};
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cmp::Ordering;
use log::debug;
use trellis_core::schema::SourceSchema;
use trellis_core::{Result, Row};

/// Receiver of the changes an input emits.
pub trait Output {
    /// Applies one change.
    fn push(&mut self, change: Change) -> Result<()>;
}

/// Parameters of an initial fetch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FetchRequest {
    /// Only rows strictly after this one (in fetch direction) are returned.
    pub start: Option<Row>,
    /// Returns rows in descending engine order.
    pub reverse: bool,
}

/// A query pipeline's terminal stage, as seen by its consumer.
pub trait Input {
    /// Registers the sink for subsequent changes.
    fn set_output(&mut self, output: Box<dyn Output>);

    /// Streams the current result.
    fn fetch(&mut self, request: FetchRequest) -> Stream;

    /// Describes the rows this input emits.
    fn schema(&self) -> &SourceSchema;
}

/// An input over a fixed list of nodes.
///
/// Hydrates from the list and forwards pushed changes to whichever output
/// registered last. Useful for hosts holding a precomputed result.
pub struct SnapshotInput {
    schema: SourceSchema,
    nodes: Vec<Node>,
    yields: bool,
    output: Option<Box<dyn Output>>,
}

impl SnapshotInput {
    /// Creates an input; `nodes` are sorted by the schema's ordering.
    pub fn new(schema: SourceSchema, mut nodes: Vec<Node>) -> Self {
        nodes.sort_by(|a, b| schema.compare_rows(a.row(), b.row()));
        Self {
            schema,
            nodes,
            yields: false,
            output: None,
        }
    }

    /// Interleaves a yield marker before every node on fetch.
    pub fn with_yields(mut self, yields: bool) -> Self {
        self.yields = yields;
        self
    }

    /// Returns true once an output is registered.
    #[inline]
    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    /// Forwards a change to the registered output. Without one the change
    /// is dropped.
    pub fn push(&mut self, change: Change) -> Result<()> {
        match self.output.as_mut() {
            Some(output) => output.push(change),
            None => {
                debug!(
                    "no output registered for '{}', dropping {:?}",
                    self.schema.table_name(),
                    change.kind()
                );
                Ok(())
            }
        }
    }
}

impl Input for SnapshotInput {
    fn set_output(&mut self, output: Box<dyn Output>) {
        self.output = Some(output);
    }

    fn fetch(&mut self, request: FetchRequest) -> Stream {
        let mut nodes: Vec<Node> = match &request.start {
            Some(start) => self
                .nodes
                .iter()
                .filter(|node| {
                    let ord = self.schema.compare_rows(node.row(), start);
                    if request.reverse {
                        ord == Ordering::Less
                    } else {
                        ord == Ordering::Greater
                    }
                })
                .cloned()
                .collect(),
            None => self.nodes.clone(),
        };
        if request.reverse {
            nodes.reverse();
        }

        if self.yields {
            Box::new(
                nodes
                    .into_iter()
                    .flat_map(|node| [StreamItem::Yield, StreamItem::Node(node)]),
            )
        } else {
            Box::new(nodes.into_iter().map(StreamItem::Node))
        }
    }

    fn schema(&self) -> &SourceSchema {
        &self.schema
    }
}
