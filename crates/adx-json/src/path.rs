//! Structural paths into a [`JsonTree`].
//!
//! A [`JsonPath`] is an ordered list of segments — property name, array
//! index, or the wildcard `*`. It doubles as a concrete locator
//! ([`find_node_at_path`]) and as a pattern ([`match_pattern`]), where every
//! `*` expands against the tree's actual children in document order.

use crate::node::{JsonTree, NodeId, NodeKind};

/// One step of a [`JsonPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object property name.
    Name(String),
    /// Array index.
    Index(usize),
    /// Matches every property of an object / every item of an array.
    Wildcard,
}

impl Segment {
    /// A property-name segment.
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::Index(index) => write!(f, "{index}"),
            Self::Wildcard => write!(f, "*"),
        }
    }
}

/// An ordered sequence of path segments locating value nodes in a tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    /// An empty path (locates the root value).
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Build a path from explicit segments.
    #[must_use]
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Build a pattern from string parts, where the literal `"*"` becomes a
    /// wildcard. Template field names never collide with `*`, so the
    /// shorthand is unambiguous here.
    #[must_use]
    pub fn pattern(parts: &[&str]) -> Self {
        Self {
            segments: parts
                .iter()
                .map(|part| {
                    if *part == "*" {
                        Segment::Wildcard
                    } else {
                        Segment::name(*part)
                    }
                })
                .collect(),
        }
    }

    /// The path's segments in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// A new path with one more segment appended.
    #[must_use]
    pub fn join(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// The final segment, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }
}

impl std::fmt::Display for JsonPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// One result of [`match_pattern`]: a matched value node and the concrete
/// path that reached it (wildcards resolved to real names/indices).
#[derive(Debug, Clone)]
pub struct PathMatch {
    pub path: JsonPath,
    pub node: NodeId,
}

/// Exact path resolution against value nodes.
///
/// Returns `None` when any segment is absent or type-mismatched (indexing
/// into a non-array, naming into a non-object, or a wildcard — wildcards
/// are for [`match_pattern`]).
#[must_use]
pub fn find_node_at_path(tree: &JsonTree, path: &JsonPath) -> Option<NodeId> {
    let mut current = tree.root()?;
    for segment in path.segments() {
        current = match segment {
            Segment::Name(name) => tree.object_get(current, name)?,
            Segment::Index(index) => tree.array_items(current).get(*index).copied()?,
            Segment::Wildcard => return None,
        };
    }
    Some(current)
}

/// Expand a pattern against the tree, returning every matching value node
/// with its concrete resolved path.
///
/// `*` segments enumerate object properties and array items in document
/// order; results are depth-first, left-to-right, matching source order.
/// The optional predicate filters candidate nodes before they are included
/// — used, e.g., to match only string-valued nodes.
#[must_use]
pub fn match_pattern(
    tree: &JsonTree,
    pattern: &JsonPath,
    predicate: Option<&dyn Fn(&JsonTree, NodeId) -> bool>,
) -> Vec<PathMatch> {
    let mut matches = Vec::new();
    let Some(root) = tree.root() else {
        return matches;
    };
    collect(
        tree,
        root,
        JsonPath::root(),
        pattern.segments(),
        predicate,
        &mut matches,
    );
    matches
}

fn collect(
    tree: &JsonTree,
    node: NodeId,
    resolved: JsonPath,
    remaining: &[Segment],
    predicate: Option<&dyn Fn(&JsonTree, NodeId) -> bool>,
    matches: &mut Vec<PathMatch>,
) {
    let Some((segment, rest)) = remaining.split_first() else {
        if predicate.is_none_or(|pred| pred(tree, node)) {
            matches.push(PathMatch {
                path: resolved,
                node,
            });
        }
        return;
    };

    match segment {
        Segment::Name(name) => {
            if let Some(value) = tree.object_get(node, name) {
                collect(
                    tree,
                    value,
                    resolved.join(Segment::name(name.clone())),
                    rest,
                    predicate,
                    matches,
                );
            }
        }
        Segment::Index(index) => {
            if let Some(item) = tree.array_items(node).get(*index) {
                collect(
                    tree,
                    *item,
                    resolved.join(Segment::Index(*index)),
                    rest,
                    predicate,
                    matches,
                );
            }
        }
        Segment::Wildcard => match tree.kind(node) {
            NodeKind::Object { properties } => {
                for prop in properties {
                    let Some(name) = tree.property_name(*prop) else {
                        continue;
                    };
                    let name = name.to_string();
                    if let Some(value) = tree.property_value(*prop) {
                        collect(
                            tree,
                            value,
                            resolved.join(Segment::Name(name)),
                            rest,
                            predicate,
                            matches,
                        );
                    }
                }
            }
            NodeKind::Array { items } => {
                for (index, item) in items.iter().enumerate() {
                    collect(
                        tree,
                        *item,
                        resolved.join(Segment::Index(index)),
                        rest,
                        predicate,
                        matches,
                    );
                }
            }
            _ => {}
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    const DOC: &str = r#"{
  "rules": [
    {"name": "first", "actions": [{"action": "eval"}, {"action": "set"}]},
    {"name": "second", "actions": [{"action": "delete"}]}
  ],
  "constants": [{"name": "c1"}, {"name": 2}]
}"#;

    #[test]
    fn test_find_exact_path() {
        let parse = parse(DOC);
        let tree = &parse.tree;
        let path = JsonPath::new(vec![
            Segment::name("rules"),
            Segment::Index(1),
            Segment::name("name"),
        ]);
        let node = find_node_at_path(tree, &path).unwrap();
        assert_eq!(tree.string_value(node), Some("second"));
    }

    #[test]
    fn test_find_absent_segment() {
        let parse = parse(DOC);
        let path = JsonPath::new(vec![Segment::name("rules"), Segment::Index(7)]);
        assert!(find_node_at_path(&parse.tree, &path).is_none());
    }

    #[test]
    fn test_find_type_mismatch() {
        let parse = parse(DOC);
        // "rules" is an array; naming into it is a mismatch.
        let path = JsonPath::new(vec![Segment::name("rules"), Segment::name("name")]);
        assert!(find_node_at_path(&parse.tree, &path).is_none());
    }

    #[test]
    fn test_wildcard_expansion_in_document_order() {
        let parse = parse(DOC);
        let tree = &parse.tree;
        let pattern = JsonPath::pattern(&["rules", "*", "actions", "*", "action"]);
        let matches = match_pattern(tree, &pattern, None);

        let actions: Vec<_> = matches
            .iter()
            .map(|m| tree.string_value(m.node).unwrap())
            .collect();
        assert_eq!(actions, vec!["eval", "set", "delete"]);

        assert_eq!(matches[0].path.to_string(), "rules.0.actions.0.action");
        assert_eq!(matches[2].path.to_string(), "rules.1.actions.0.action");
    }

    #[test]
    fn test_predicate_filters_candidates() {
        let parse = parse(DOC);
        let tree = &parse.tree;
        let pattern = JsonPath::pattern(&["constants", "*", "name"]);
        let only_strings =
            |tree: &JsonTree, node: NodeId| tree.string_value(node).is_some();
        let matches = match_pattern(tree, &pattern, Some(&only_strings));

        assert_eq!(matches.len(), 1);
        assert_eq!(tree.string_value(matches[0].node), Some("c1"));
    }

    #[test]
    fn test_empty_pattern_matches_root() {
        let parse = parse(DOC);
        let matches = match_pattern(&parse.tree, &JsonPath::root(), None);
        assert_eq!(matches.len(), 1);
        assert_eq!(Some(matches[0].node), parse.tree.root());
    }

    #[test]
    fn test_display() {
        let path = JsonPath::new(vec![
            Segment::name("pages"),
            Segment::Wildcard,
            Segment::name("variables"),
        ]);
        assert_eq!(path.to_string(), "pages.*.variables");
    }
}
