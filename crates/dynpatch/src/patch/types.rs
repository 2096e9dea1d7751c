//! Core types of the patch algebra.

use std::fmt;
use std::ops::{Add, AddAssign};

use chrono::TimeDelta;
use dynpatch_optic::DynamicOptic;
use dynpatch_value::{serde_time_delta, DynamicValue};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────

/// Why a patch could not be applied.
///
/// Only [`PatchError::PathNotFound`] is recoverable, and only in
/// [`PatchMode::Lenient`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PatchError {
    /// A step of `path` matched nothing; `failed_at` is the path prefix
    /// ending with that step.
    #[error("path not found: {path} (no match at {failed_at})")]
    PathNotFound {
        path: DynamicOptic,
        failed_at: DynamicOptic,
    },
    /// The value at `path` has the wrong shape for the step or operation.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: DynamicOptic,
        expected: &'static str,
        found: &'static str,
    },
    /// The operation's own precondition failed at a resolved location.
    #[error("operation failed at {path}: {message}")]
    OperationFailed { path: DynamicOptic, message: String },
}

impl PatchError {
    #[inline]
    pub fn path_not_found(path: &DynamicOptic, failed_at: DynamicOptic) -> Self {
        PatchError::PathNotFound { path: path.clone(), failed_at }
    }

    #[inline]
    pub fn type_mismatch(path: &DynamicOptic, expected: &'static str, found: &'static str) -> Self {
        PatchError::TypeMismatch { path: path.clone(), expected, found }
    }

    #[inline]
    pub fn operation_failed(path: &DynamicOptic, message: impl Into<String>) -> Self {
        PatchError::OperationFailed { path: path.clone(), message: message.into() }
    }

    /// Returns true for addressing failures, the only kind Lenient mode skips.
    pub fn is_path_not_found(&self) -> bool {
        matches!(self, PatchError::PathNotFound { .. })
    }

    /// The path reported by this error.
    pub fn path(&self) -> &DynamicOptic {
        match self {
            PatchError::PathNotFound { path, .. } => path,
            PatchError::TypeMismatch { path, .. } => path,
            PatchError::OperationFailed { path, .. } => path,
        }
    }
}

// ── Mode ──────────────────────────────────────────────────────────────────

/// How [`DynamicPatch::apply`] treats ops whose path does not resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatchMode {
    /// Any unresolvable path fails the whole application.
    #[default]
    Strict,
    /// Ops with an unresolvable path are skipped.
    Lenient,
}

// ── Sub-edits ─────────────────────────────────────────────────────────────

/// Edit of a string. Positions and lengths count Unicode scalar values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StringOp {
    Insert { at: usize, text: String },
    Delete { at: usize, len: usize },
}

/// Edit of a sequence. Positions are 0-based against the sequence as left
/// by the preceding sub-edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeqOp {
    Insert { at: usize, values: Vec<DynamicValue> },
    Delete { at: usize, count: usize },
    Append { values: Vec<DynamicValue> },
}

/// Edit of a map. `Add` overwrites an existing key in place; `Remove` of
/// an absent key is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapOp {
    Add { key: DynamicValue, value: DynamicValue },
    Remove { key: DynamicValue },
}

/// Relative change to a primitive of one specific kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrimitiveOp {
    ByteDelta(i8),
    ShortDelta(i16),
    IntDelta(i32),
    LongDelta(i64),
    FloatDelta(f32),
    DoubleDelta(f64),
    BigIntDelta(BigInt),
    BigDecimalDelta(Decimal),
    DurationDelta(#[serde(with = "serde_time_delta")] TimeDelta),
    InstantDelta(#[serde(with = "serde_time_delta")] TimeDelta),
    /// Whole days added to a local date.
    LocalDateDelta(i64),
    StringEdit(Vec<StringOp>),
}

impl PrimitiveOp {
    /// Kind name of the primitive this op applies to.
    pub fn target_kind(&self) -> &'static str {
        match self {
            PrimitiveOp::ByteDelta(_) => "byte",
            PrimitiveOp::ShortDelta(_) => "short",
            PrimitiveOp::IntDelta(_) => "int",
            PrimitiveOp::LongDelta(_) => "long",
            PrimitiveOp::FloatDelta(_) => "float",
            PrimitiveOp::DoubleDelta(_) => "double",
            PrimitiveOp::BigIntDelta(_) => "big_int",
            PrimitiveOp::BigDecimalDelta(_) => "big_decimal",
            PrimitiveOp::DurationDelta(_) => "duration",
            PrimitiveOp::InstantDelta(_) => "instant",
            PrimitiveOp::LocalDateDelta(_) => "local_date",
            PrimitiveOp::StringEdit(_) => "string",
        }
    }
}

// ── Operation ─────────────────────────────────────────────────────────────

/// What a patch op does at its resolved location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Replace the whole subtree.
    Set(DynamicValue),
    PrimitiveDelta(PrimitiveOp),
    SequenceEdit(Vec<SeqOp>),
    MapEdit(Vec<MapOp>),
}

impl Operation {
    pub fn op_name(&self) -> &'static str {
        match self {
            Operation::Set(_) => "set",
            Operation::PrimitiveDelta(_) => "delta",
            Operation::SequenceEdit(_) => "sequence_edit",
            Operation::MapEdit(_) => "map_edit",
        }
    }
}

/// A single `(path, operation)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicPatchOp {
    pub path: DynamicOptic,
    pub op: Operation,
}

impl DynamicPatchOp {
    pub fn new(path: DynamicOptic, op: Operation) -> Self {
        Self { path, op }
    }
}

// ── Patch ─────────────────────────────────────────────────────────────────

/// An ordered list of patch ops. Ops apply in list order and each one sees
/// the effects of the ones before it.
///
/// Patches form a monoid under concatenation with [`DynamicPatch::empty`]
/// as identity; no coalescing happens.
///
/// # Examples
///
/// ```
/// use dynpatch::{DynamicOptic, DynamicPatch, DynamicValue, Operation, PatchMode};
///
/// let set_name = DynamicPatch::single(
///     DynamicOptic::root().field("name"),
///     Operation::Set(DynamicValue::string("Bob")),
/// );
/// let patch = DynamicPatch::empty() + set_name;
/// let before = DynamicValue::record([("name", DynamicValue::string("Alice"))]);
/// let after = patch.apply(&before, PatchMode::Strict).unwrap();
/// assert_eq!(after.field("name"), Some(&DynamicValue::string("Bob")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicPatch {
    ops: Vec<DynamicPatchOp>,
}

impl DynamicPatch {
    /// The identity patch.
    pub fn empty() -> Self {
        Self { ops: Vec::new() }
    }

    pub fn single(path: DynamicOptic, op: Operation) -> Self {
        Self { ops: vec![DynamicPatchOp::new(path, op)] }
    }

    /// A single op at the root.
    pub fn root(op: Operation) -> Self {
        Self::single(DynamicOptic::root(), op)
    }

    /// `self` followed by `other`.
    pub fn concat(&self, other: &DynamicPatch) -> Self {
        let mut ops = Vec::with_capacity(self.ops.len() + other.ops.len());
        ops.extend_from_slice(&self.ops);
        ops.extend_from_slice(&other.ops);
        Self { ops }
    }

    pub fn push(&mut self, path: DynamicOptic, op: Operation) {
        self.ops.push(DynamicPatchOp::new(path, op));
    }

    #[inline]
    pub fn ops(&self) -> &[DynamicPatchOp] {
        &self.ops
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DynamicPatchOp> {
        self.ops.iter()
    }

    pub fn into_ops(self) -> Vec<DynamicPatchOp> {
        self.ops
    }
}

impl From<Vec<DynamicPatchOp>> for DynamicPatch {
    fn from(ops: Vec<DynamicPatchOp>) -> Self {
        Self { ops }
    }
}

impl FromIterator<DynamicPatchOp> for DynamicPatch {
    fn from_iter<I: IntoIterator<Item = DynamicPatchOp>>(iter: I) -> Self {
        Self { ops: iter.into_iter().collect() }
    }
}

impl Extend<DynamicPatchOp> for DynamicPatch {
    fn extend<I: IntoIterator<Item = DynamicPatchOp>>(&mut self, iter: I) {
        self.ops.extend(iter);
    }
}

impl IntoIterator for DynamicPatch {
    type Item = DynamicPatchOp;
    type IntoIter = std::vec::IntoIter<DynamicPatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<'a> IntoIterator for &'a DynamicPatch {
    type Item = &'a DynamicPatchOp;
    type IntoIter = std::slice::Iter<'a, DynamicPatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

impl Add for DynamicPatch {
    type Output = DynamicPatch;

    fn add(mut self, rhs: DynamicPatch) -> DynamicPatch {
        self.ops.extend(rhs.ops);
        self
    }
}

impl AddAssign for DynamicPatch {
    fn add_assign(&mut self, rhs: DynamicPatch) {
        self.ops.extend(rhs.ops);
    }
}

// ── Display ───────────────────────────────────────────────────────────────

fn write_values(f: &mut fmt::Formatter<'_>, values: &[DynamicValue]) -> fmt::Result {
    f.write_str("[")?;
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{v}")?;
    }
    f.write_str("]")
}

fn write_ops<T: fmt::Display>(f: &mut fmt::Formatter<'_>, ops: &[T]) -> fmt::Result {
    for (i, op) in ops.iter().enumerate() {
        if i > 0 {
            f.write_str("; ")?;
        }
        write!(f, "{op}")?;
    }
    Ok(())
}

impl fmt::Display for StringOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StringOp::Insert { at, text } => write!(f, "insert@{at} \"{}\"", text.escape_default()),
            StringOp::Delete { at, len } => write!(f, "delete@{at} x{len}"),
        }
    }
}

impl fmt::Display for SeqOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeqOp::Insert { at, values } => {
                write!(f, "insert@{at} ")?;
                write_values(f, values)
            }
            SeqOp::Delete { at, count } => write!(f, "delete@{at} x{count}"),
            SeqOp::Append { values } => {
                f.write_str("append ")?;
                write_values(f, values)
            }
        }
    }
}

impl fmt::Display for MapOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapOp::Add { key, value } => write!(f, "add {key} => {value}"),
            MapOp::Remove { key } => write!(f, "remove {key}"),
        }
    }
}

impl fmt::Display for PrimitiveOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveOp::ByteDelta(d) => write!(f, "delta {d}"),
            PrimitiveOp::ShortDelta(d) => write!(f, "delta {d}"),
            PrimitiveOp::IntDelta(d) => write!(f, "delta {d}"),
            PrimitiveOp::LongDelta(d) => write!(f, "delta {d}L"),
            PrimitiveOp::FloatDelta(d) => write!(f, "delta {d:?}f"),
            PrimitiveOp::DoubleDelta(d) => write!(f, "delta {d:?}"),
            PrimitiveOp::BigIntDelta(d) => write!(f, "delta {d}"),
            PrimitiveOp::BigDecimalDelta(d) => write!(f, "delta {d}"),
            PrimitiveOp::DurationDelta(d) => write!(f, "delta {d}"),
            PrimitiveOp::InstantDelta(d) => write!(f, "delta {d}"),
            PrimitiveOp::LocalDateDelta(days) => write!(f, "delta {days} days"),
            PrimitiveOp::StringEdit(ops) => {
                f.write_str("edit ")?;
                write_ops(f, ops)
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Set(v) => write!(f, "set {v}"),
            Operation::PrimitiveDelta(op) => write!(f, "{op}"),
            Operation::SequenceEdit(ops) => write_ops(f, ops),
            Operation::MapEdit(ops) => write_ops(f, ops),
        }
    }
}

impl fmt::Display for DynamicPatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.op)
    }
}

/// One op per line; the empty patch renders as nothing.
impl fmt::Display for DynamicPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{op}")?;
        }
        Ok(())
    }
}
