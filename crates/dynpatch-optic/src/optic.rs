//! [`DynamicOptic`]: an ordered list of addressing steps.

use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use dynpatch_value::DynamicValue;
use serde::{Deserialize, Serialize};

use crate::node::Node;
use crate::parse::{parse_optic, OpticParseError};

/// A symbolic path into a [`DynamicValue`].
///
/// A path is pure data: it is only resolved when a consumer walks it
/// against a concrete value. The empty path is the root. Paths compose by
/// appending steps, and compare by their step sequence.
///
/// # Examples
///
/// ```
/// use dynpatch_optic::DynamicOptic;
///
/// let path = DynamicOptic::root().field("users").at_index(0).field("name");
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.to_string(), ".users[0].name");
/// assert_eq!(DynamicOptic::root().to_string(), ".");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicOptic {
    nodes: Vec<Node>,
}

impl DynamicOptic {
    /// The empty path.
    #[inline]
    pub fn root() -> Self {
        Self { nodes: Vec::new() }
    }

    #[inline]
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Returns a new path with `node` appended.
    pub fn append(&self, node: Node) -> Self {
        let mut nodes = Vec::with_capacity(self.nodes.len() + 1);
        nodes.extend_from_slice(&self.nodes);
        nodes.push(node);
        Self { nodes }
    }

    /// Returns `self` followed by every step of `other`.
    pub fn join(&self, other: &DynamicOptic) -> Self {
        let mut nodes = Vec::with_capacity(self.nodes.len() + other.nodes.len());
        nodes.extend_from_slice(&self.nodes);
        nodes.extend_from_slice(&other.nodes);
        Self { nodes }
    }

    // ── Builder steps ─────────────────────────────────────────────────────

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.nodes.push(Node::Field(name.into()));
        self
    }

    pub fn case(mut self, name: impl Into<String>) -> Self {
        self.nodes.push(Node::Case(name.into()));
        self
    }

    pub fn at_index(mut self, index: usize) -> Self {
        self.nodes.push(Node::AtIndex(index));
        self
    }

    pub fn at_indices(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.nodes.push(Node::AtIndices(indices.into_iter().collect()));
        self
    }

    pub fn at_map_key(mut self, key: impl Into<DynamicValue>) -> Self {
        self.nodes.push(Node::AtMapKey(key.into()));
        self
    }

    pub fn at_map_keys(mut self, keys: impl IntoIterator<Item = DynamicValue>) -> Self {
        self.nodes.push(Node::AtMapKeys(keys.into_iter().collect()));
        self
    }

    pub fn elements(mut self) -> Self {
        self.nodes.push(Node::Elements);
        self
    }

    pub fn map_keys(mut self) -> Self {
        self.nodes.push(Node::MapKeys);
        self
    }

    pub fn map_values(mut self) -> Self {
        self.nodes.push(Node::MapValues);
        self
    }

    pub fn wrapped(mut self) -> Self {
        self.nodes.push(Node::Wrapped);
        self
    }

    // ── In-place editing ──────────────────────────────────────────────────

    #[inline]
    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    #[inline]
    pub fn pop(&mut self) -> Option<Node> {
        self.nodes.pop()
    }

    // ── Inspection ────────────────────────────────────────────────────────

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Alias of [`is_empty`](Self::is_empty).
    #[inline]
    pub fn is_root(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn last(&self) -> Option<&Node> {
        self.nodes.last()
    }

    /// The first `len` steps (the whole path if `len` exceeds its length).
    pub fn prefix(&self, len: usize) -> Self {
        Self { nodes: self.nodes[..len.min(self.nodes.len())].to_vec() }
    }

    /// The path without its last step; `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(self.prefix(self.nodes.len() - 1))
        }
    }

    /// Returns true if every step of `other` prefixes this path.
    pub fn starts_with(&self, other: &DynamicOptic) -> bool {
        self.nodes.starts_with(&other.nodes)
    }

    /// Returns true if no step fans out to several locations.
    pub fn is_single_target(&self) -> bool {
        !self.nodes.iter().any(Node::is_multi_target)
    }

    /// Parses the canonical rendering produced by `Display`.
    pub fn parse(input: &str) -> Result<Self, OpticParseError> {
        parse_optic(input)
    }
}

impl fmt::Display for DynamicOptic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nodes.is_empty() {
            return f.write_str(".");
        }
        for node in &self.nodes {
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

impl FromStr for DynamicOptic {
    type Err = OpticParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_optic(s)
    }
}

impl From<Vec<Node>> for DynamicOptic {
    fn from(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }
}

impl FromIterator<Node> for DynamicOptic {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self { nodes: iter.into_iter().collect() }
    }
}

impl Extend<Node> for DynamicOptic {
    fn extend<I: IntoIterator<Item = Node>>(&mut self, iter: I) {
        self.nodes.extend(iter);
    }
}

impl<'a> IntoIterator for &'a DynamicOptic {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl Add<&DynamicOptic> for DynamicOptic {
    type Output = DynamicOptic;

    fn add(mut self, rhs: &DynamicOptic) -> DynamicOptic {
        self.nodes.extend_from_slice(&rhs.nodes);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_does_not_touch_original() {
        let base = DynamicOptic::root().field("a");
        let child = base.append(Node::AtIndex(1));
        assert_eq!(base.len(), 1);
        assert_eq!(child.nodes(), &[Node::Field("a".into()), Node::AtIndex(1)]);
    }

    #[test]
    fn join_is_associative() {
        let a = DynamicOptic::root().field("a");
        let b = DynamicOptic::root().case("B");
        let c = DynamicOptic::root().elements();
        assert_eq!(a.join(&b).join(&c), a.join(&b.join(&c)));
        assert_eq!(DynamicOptic::root().join(&a), a);
        assert_eq!(a.join(&DynamicOptic::root()), a);
        assert_eq!(a.clone() + &b, a.join(&b));
    }

    #[test]
    fn prefix_and_parent() {
        let p = DynamicOptic::root().field("a").at_index(2).field("b");
        assert_eq!(p.prefix(2), DynamicOptic::root().field("a").at_index(2));
        assert_eq!(p.prefix(10), p);
        assert_eq!(p.parent(), Some(p.prefix(2)));
        assert_eq!(DynamicOptic::root().parent(), None);
        assert!(p.starts_with(&p.prefix(1)));
        assert!(!p.prefix(1).starts_with(&p));
    }

    #[test]
    fn full_rendering() {
        let p = DynamicOptic::root()
            .field("orders")
            .elements()
            .case("Shipped")
            .field("lines")
            .at_indices([0, 3])
            .field("meta")
            .at_map_key("sku")
            .wrapped();
        assert_eq!(p.to_string(), r#".orders[*]<Shipped>.lines[0,3].meta{"sku"}.~"#);
        assert!(!p.is_single_target());
        assert!(DynamicOptic::root().field("a").at_index(0).is_single_target());
    }

    #[test]
    fn rendering_is_stable() {
        let p = DynamicOptic::root().map_keys().map_values();
        assert_eq!(p.to_string(), "{*:}{*}");
        assert_eq!(p.to_string(), p.clone().to_string());
    }
}
