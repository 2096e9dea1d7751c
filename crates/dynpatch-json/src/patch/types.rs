use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

use crate::path::JsonPath;

// ── Error ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Error, PartialEq)]
pub enum JsonPatchError {
    #[error("path not found: \"{path}\" (no match at \"{failed_at}\")")]
    PathNotFound { path: JsonPath, failed_at: JsonPath },
    #[error("type mismatch at \"{path}\": expected {expected}, found {found}")]
    TypeMismatch {
        path: JsonPath,
        expected: &'static str,
        found: &'static str,
    },
    #[error("operation failed at \"{path}\": {message}")]
    OperationFailed { path: JsonPath, message: String },
}

impl JsonPatchError {
    pub fn is_path_not_found(&self) -> bool {
        matches!(self, JsonPatchError::PathNotFound { .. })
    }

    pub fn path(&self) -> &JsonPath {
        match self {
            JsonPatchError::PathNotFound { path, .. } => path,
            JsonPatchError::TypeMismatch { path, .. } => path,
            JsonPatchError::OperationFailed { path, .. } => path,
        }
    }
}

/// Name of a JSON value's type, as used in `TypeMismatch`.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Mode ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatchMode {
    #[default]
    Strict,
    /// Skip ops whose path does not resolve.
    Lenient,
}

// ── Sub-edits ─────────────────────────────────────────────────────────────

/// String edit; positions count chars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StringOp {
    Insert { at: usize, text: String },
    Delete { at: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArrayOp {
    Insert { at: usize, values: Vec<Value> },
    Delete { at: usize, count: usize },
    Append { values: Vec<Value> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectOp {
    Add { key: String, value: Value },
    Remove { key: String },
}

// ── Operation ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum JsonOperation {
    Set { value: Value },
    /// Integer arithmetic when both base and delta are integers, otherwise
    /// `f64` arithmetic.
    NumberDelta { delta: Number },
    StringEdit { edits: Vec<StringOp> },
    ArrayEdit { edits: Vec<ArrayOp> },
    ObjectEdit { edits: Vec<ObjectOp> },
}

impl JsonOperation {
    pub fn op_name(&self) -> &'static str {
        match self {
            JsonOperation::Set { .. } => "set",
            JsonOperation::NumberDelta { .. } => "number_delta",
            JsonOperation::StringEdit { .. } => "string_edit",
            JsonOperation::ArrayEdit { .. } => "array_edit",
            JsonOperation::ObjectEdit { .. } => "object_edit",
        }
    }
}

/// Serializes flat: `{"path": [...], "op": "set", "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonPatchOp {
    pub path: JsonPath,
    #[serde(flatten)]
    pub op: JsonOperation,
}

impl JsonPatchOp {
    pub fn new(path: JsonPath, op: JsonOperation) -> Self {
        Self { path, op }
    }
}

// ── Patch ─────────────────────────────────────────────────────────────────

/// Ordered list of JSON patch ops; a monoid under concatenation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonPatch {
    ops: Vec<JsonPatchOp>,
}

impl JsonPatch {
    pub fn empty() -> Self {
        Self { ops: Vec::new() }
    }

    pub fn single(path: JsonPath, op: JsonOperation) -> Self {
        Self { ops: vec![JsonPatchOp::new(path, op)] }
    }

    pub fn root(op: JsonOperation) -> Self {
        Self::single(JsonPath::root(), op)
    }

    pub fn concat(&self, other: &JsonPatch) -> Self {
        let mut ops = Vec::with_capacity(self.ops.len() + other.ops.len());
        ops.extend_from_slice(&self.ops);
        ops.extend_from_slice(&other.ops);
        Self { ops }
    }

    pub fn push(&mut self, path: JsonPath, op: JsonOperation) {
        self.ops.push(JsonPatchOp::new(path, op));
    }

    pub fn ops(&self) -> &[JsonPatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JsonPatchOp> {
        self.ops.iter()
    }
}

impl From<Vec<JsonPatchOp>> for JsonPatch {
    fn from(ops: Vec<JsonPatchOp>) -> Self {
        Self { ops }
    }
}

impl FromIterator<JsonPatchOp> for JsonPatch {
    fn from_iter<I: IntoIterator<Item = JsonPatchOp>>(iter: I) -> Self {
        Self { ops: iter.into_iter().collect() }
    }
}

impl Extend<JsonPatchOp> for JsonPatch {
    fn extend<I: IntoIterator<Item = JsonPatchOp>>(&mut self, iter: I) {
        self.ops.extend(iter);
    }
}

impl IntoIterator for JsonPatch {
    type Item = JsonPatchOp;
    type IntoIter = std::vec::IntoIter<JsonPatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<'a> IntoIterator for &'a JsonPatch {
    type Item = &'a JsonPatchOp;
    type IntoIter = std::slice::Iter<'a, JsonPatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

impl Add for JsonPatch {
    type Output = JsonPatch;

    fn add(mut self, rhs: JsonPatch) -> JsonPatch {
        self.ops.extend(rhs.ops);
        self
    }
}

impl AddAssign for JsonPatch {
    fn add_assign(&mut self, rhs: JsonPatch) {
        self.ops.extend(rhs.ops);
    }
}

// ── Display ───────────────────────────────────────────────────────────────

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for StringOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StringOp::Insert { at, text } => write!(f, "insert@{at} {}", Value::String(text.clone())),
            StringOp::Delete { at, len } => write!(f, "delete@{at} x{len}"),
        }
    }
}

impl fmt::Display for ArrayOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayOp::Insert { at, values } => {
                write!(f, "insert@{at} [")?;
                write_joined(f, values, ",")?;
                f.write_str("]")
            }
            ArrayOp::Delete { at, count } => write!(f, "delete@{at} x{count}"),
            ArrayOp::Append { values } => {
                f.write_str("append [")?;
                write_joined(f, values, ",")?;
                f.write_str("]")
            }
        }
    }
}

impl fmt::Display for ObjectOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectOp::Add { key, value } => write!(f, "add {} {value}", Value::String(key.clone())),
            ObjectOp::Remove { key } => write!(f, "remove {}", Value::String(key.clone())),
        }
    }
}

impl fmt::Display for JsonOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonOperation::Set { value } => write!(f, "set {value}"),
            JsonOperation::NumberDelta { delta } => write!(f, "delta {delta}"),
            JsonOperation::StringEdit { edits } => {
                f.write_str("edit ")?;
                write_joined(f, edits, "; ")
            }
            JsonOperation::ArrayEdit { edits } => write_joined(f, edits, "; "),
            JsonOperation::ObjectEdit { edits } => write_joined(f, edits, "; "),
        }
    }
}

impl fmt::Display for JsonPatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" {}", self.path, self.op)
    }
}

impl fmt::Display for JsonPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.ops, "\n")
    }
}
