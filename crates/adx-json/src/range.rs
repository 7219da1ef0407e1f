//! Byte ranges and display-range computation for nodes.

use crate::node::{JsonTree, NodeId};
use serde::{Deserialize, Serialize};

/// Byte offset range in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct OffsetRange {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl OffsetRange {
    /// Create a new offset range.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create a zero-width range at an offset.
    #[must_use]
    pub const fn at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Length of the range in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` for a zero-width range.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl std::fmt::Display for OffsetRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Display range for a node, optionally widened for removal edits.
///
/// With `include_trailing_comma`, the range extends forward past whitespace
/// and, if present, past one trailing comma and its following whitespace —
/// the shape a "remove this property entirely" edit needs. When no trailing
/// comma follows, the range is returned unchanged: a preceding sibling's
/// comma is never consumed, so removing the last property of an object
/// leaves the previous comma behind.
#[must_use]
pub fn range_for_node(tree: &JsonTree, node: NodeId, include_trailing_comma: bool) -> OffsetRange {
    let span = tree.span(node);
    if !include_trailing_comma {
        return span;
    }

    let bytes = tree.text().as_bytes();
    let mut end = span.end;
    while end < bytes.len() && bytes[end].is_ascii_whitespace() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b',' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_whitespace() {
            end += 1;
        }
        return OffsetRange::new(span.start, end);
    }
    span
}
