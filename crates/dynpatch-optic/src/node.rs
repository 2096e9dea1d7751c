//! A single addressing step of an optic.

use std::fmt;

use dynpatch_value::DynamicValue;
use serde::{Deserialize, Serialize};

/// One step of a [`DynamicOptic`](crate::DynamicOptic).
///
/// The first four steps address at most one location; the batch and
/// "every" steps fan out to any number of locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    /// Named field of a record.
    Field(String),
    /// Payload of a variant whose case tag matches.
    Case(String),
    /// Single sequence element.
    AtIndex(usize),
    /// Map value under a structurally equal key.
    AtMapKey(DynamicValue),
    /// Several sequence elements, in the given order.
    AtIndices(Vec<usize>),
    /// Several map values, in the given key order.
    AtMapKeys(Vec<DynamicValue>),
    /// Every sequence element.
    Elements,
    /// Every map key.
    MapKeys,
    /// Every map value.
    MapValues,
    /// The only field of a single-field wrapper record.
    Wrapped,
}

impl Node {
    /// Returns true if this step can resolve to more (or fewer) than one
    /// location.
    pub fn is_multi_target(&self) -> bool {
        matches!(
            self,
            Node::AtIndices(_) | Node::AtMapKeys(_) | Node::Elements | Node::MapKeys | Node::MapValues
        )
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────

/// Returns true if `name` can be rendered without backtick quoting.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Writes `name` bare if it is an identifier, otherwise in backticks with
/// embedded backticks doubled.
pub(crate) fn write_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if is_identifier(name) {
        f.write_str(name)
    } else {
        write!(f, "`{}`", name.replace('`', "``"))
    }
}

/// A one-member list keeps a trailing comma, so `[5,]` stays a batch
/// rather than reading back as the single step `[5]`.
fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{item}")?;
    }
    if items.len() == 1 {
        f.write_str(",")?;
    }
    Ok(())
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Field(name) => {
                f.write_str(".")?;
                write_name(f, name)
            }
            Node::Case(name) => {
                f.write_str("<")?;
                write_name(f, name)?;
                f.write_str(">")
            }
            Node::AtIndex(i) => write!(f, "[{i}]"),
            Node::AtMapKey(key) => write!(f, "{{{key}}}"),
            Node::AtIndices(indices) => {
                f.write_str("[")?;
                write_list(f, indices)?;
                f.write_str("]")
            }
            Node::AtMapKeys(keys) => {
                f.write_str("{")?;
                write_list(f, keys)?;
                f.write_str("}")
            }
            Node::Elements => f.write_str("[*]"),
            Node::MapKeys => f.write_str("{*:}"),
            Node::MapValues => f.write_str("{*}"),
            Node::Wrapped => f.write_str(".~"),
        }
    }
}
