//! Arena-backed JSON node tree.
//!
//! Nodes are stored in a flat arena and addressed by [`NodeId`]. Each node
//! carries its kind, byte offset, length, and a non-owning parent
//! back-reference. Offsets are monotonic and non-overlapping within a
//! parent; every non-root node has exactly one parent.

use crate::range::OffsetRange;

/// Identifier of a node within one [`JsonTree`]'s arena.
///
/// Ids are only meaningful for the tree that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[must_use]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Node kind with kind-specific value/children.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// `{ ... }` — children are Property nodes in document order.
    Object { properties: Vec<NodeId> },
    /// `[ ... ]` — children are value nodes in document order.
    Array { items: Vec<NodeId> },
    /// `"key": value` — `key` is a String node; `value` is absent while the
    /// author is still typing (`"key":`).
    Property { key: NodeId, value: Option<NodeId> },
    /// String literal, unescaped.
    String { value: String },
    /// Number literal.
    Number { value: f64 },
    /// `true` / `false`.
    Boolean { value: bool },
    /// `null`.
    Null,
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) offset: usize,
    pub(crate) len: usize,
    pub(crate) parent: Option<NodeId>,
}

/// An immutable parse of one file's text into a node graph.
#[derive(Debug, Clone)]
pub struct JsonTree {
    pub(crate) text: String,
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) root: Option<NodeId>,
}

impl JsonTree {
    /// The root value node, if the text produced one at all.
    #[must_use]
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// The source text this tree was parsed from.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Kind (and kind-specific payload) of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    /// Byte offset of a node in the source text.
    #[must_use]
    pub fn offset(&self, id: NodeId) -> usize {
        self.nodes[id.index()].offset
    }

    /// Byte length of a node in the source text.
    #[must_use]
    pub fn len(&self, id: NodeId) -> usize {
        self.nodes[id.index()].len
    }

    /// Returns `true` if the tree contains no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Byte range of a node in the source text.
    #[must_use]
    pub fn span(&self, id: NodeId) -> OffsetRange {
        let data = &self.nodes[id.index()];
        OffsetRange::new(data.offset, data.offset + data.len)
    }

    /// Parent node; `None` for the root.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// The raw source slice a node spans.
    #[must_use]
    pub fn node_text(&self, id: NodeId) -> &str {
        let data = &self.nodes[id.index()];
        &self.text[data.offset..data.offset + data.len]
    }

    /// String value of a String node.
    #[must_use]
    pub fn string_value(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::String { value } => Some(value),
            _ => None,
        }
    }

    /// Numeric value of a Number node.
    #[must_use]
    pub fn number_value(&self, id: NodeId) -> Option<f64> {
        match self.kind(id) {
            NodeKind::Number { value } => Some(*value),
            _ => None,
        }
    }

    /// Boolean value of a Boolean node.
    #[must_use]
    pub fn bool_value(&self, id: NodeId) -> Option<bool> {
        match self.kind(id) {
            NodeKind::Boolean { value } => Some(*value),
            _ => None,
        }
    }

    /// Property nodes of an Object node, in document order.
    #[must_use]
    pub fn object_properties(&self, id: NodeId) -> &[NodeId] {
        match self.kind(id) {
            NodeKind::Object { properties } => properties,
            _ => &[],
        }
    }

    /// Item nodes of an Array node, in document order.
    #[must_use]
    pub fn array_items(&self, id: NodeId) -> &[NodeId] {
        match self.kind(id) {
            NodeKind::Array { items } => items,
            _ => &[],
        }
    }

    /// Key node of a Property node.
    #[must_use]
    pub fn property_key(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::Property { key, .. } => Some(*key),
            _ => None,
        }
    }

    /// Unescaped name of a Property node.
    #[must_use]
    pub fn property_name(&self, id: NodeId) -> Option<&str> {
        self.property_key(id).and_then(|key| self.string_value(key))
    }

    /// Value node of a Property node (`None` while the author is typing).
    #[must_use]
    pub fn property_value(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::Property { value, .. } => *value,
            _ => None,
        }
    }

    /// The Property node of an Object with the given name, if present.
    ///
    /// When the same name appears more than once the first occurrence wins,
    /// matching how template files are interpreted downstream.
    #[must_use]
    pub fn object_property(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.object_properties(id)
            .iter()
            .copied()
            .find(|prop| self.property_name(*prop) == Some(name))
    }

    /// The value of the named property of an Object, if present.
    #[must_use]
    pub fn object_get(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.object_property(id, name)
            .and_then(|prop| self.property_value(prop))
    }

    /// Child nodes in document order, for generic traversal.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.kind(id) {
            NodeKind::Object { properties } => properties.clone(),
            NodeKind::Array { items } => items.clone(),
            NodeKind::Property { key, value } => {
                let mut out = vec![*key];
                out.extend(*value);
                out
            }
            _ => Vec::new(),
        }
    }

    /// Innermost node whose span contains `offset`.
    ///
    /// Used by the editor adapters to map a cursor position to a node.
    #[must_use]
    pub fn node_at_offset(&self, offset: usize) -> Option<NodeId> {
        let root = self.root?;
        if !self.contains(root, offset) {
            return None;
        }
        let mut current = root;
        'descend: loop {
            for child in self.children(current) {
                if self.contains(child, offset) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    fn contains(&self, id: NodeId, offset: usize) -> bool {
        let span = self.span(id);
        offset >= span.start && offset < span.end
    }

    pub(crate) fn alloc(&mut self, kind: NodeKind, offset: usize) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(NodeData {
            kind,
            offset,
            len: 0,
            parent: None,
        });
        id
    }

    pub(crate) fn set_parent(&mut self, id: NodeId, parent: NodeId) {
        self.nodes[id.index()].parent = Some(parent);
    }

    pub(crate) fn close(&mut self, id: NodeId, end: usize) {
        let data = &mut self.nodes[id.index()];
        data.len = end.saturating_sub(data.offset);
    }

    pub(crate) fn push_child(&mut self, parent: NodeId, child: NodeId) {
        match &mut self.nodes[parent.index()].kind {
            NodeKind::Object { properties } => properties.push(child),
            NodeKind::Array { items } => items.push(child),
            NodeKind::Property { value, .. } => *value = Some(child),
            _ => {}
        }
        self.set_parent(child, parent);
    }
}
