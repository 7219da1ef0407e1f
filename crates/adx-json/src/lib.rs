// JSON Syntax Layer
// This crate handles parsing and syntax trees for template JSON files.
// No cross-file knowledge, no semantics. All parsing is file-local.

//! Tolerant JSON-with-comments parsing and tree utilities.
//!
//! Template files (`template-info.json` and friends) are authored as JSONC:
//! `//` and `/* */` comments are permitted, and files are frequently edited
//! into transiently malformed states. [`parse`] therefore never fails — it
//! returns a best-effort partial [`JsonTree`] plus a list of
//! [`ParseError`]s, and downstream consumers decide how much of the tree is
//! usable.
//!
//! On top of the tree this crate provides structural paths ([`JsonPath`])
//! with wildcard pattern matching ([`match_pattern`]), offset-based node
//! lookup, and display-range computation ([`range_for_node`]).

mod line_index;
mod node;
mod parser;
mod path;
mod range;

pub use line_index::{LineIndex, Position};
pub use node::{JsonTree, NodeId, NodeKind};
pub use parser::{parse, Parse, ParseError};
pub use path::{find_node_at_path, match_pattern, JsonPath, PathMatch, Segment};
pub use range::{range_for_node, OffsetRange};
