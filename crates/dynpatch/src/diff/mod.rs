//! Structural diff: build a [`DynamicPatch`] turning one value into another.
//!
//! The differ walks both trees together and emits the narrowest op it can
//! prove correct at each point, falling back to `Set` of the new subtree.
//! For any inputs, `diff(old, new).apply(old, Strict) == Ok(new)`.

pub mod str;

use std::collections::HashSet;

use dynpatch_optic::{DynamicOptic, Node};
use dynpatch_value::{DynamicValue, PrimitiveValue};
use tracing::trace;

use crate::patch::{DynamicPatch, DynamicPatchOp, MapOp, Operation, PrimitiveOp, SeqOp};

// ── Options ───────────────────────────────────────────────────────────────

/// Knobs for [`diff_with`]. Disabling a feature makes the differ emit `Set`
/// where it would otherwise emit a relative edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    /// Emit numeric and temporal deltas.
    pub numeric_deltas: bool,
    /// Emit string edits.
    pub string_edits: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self { numeric_deltas: true, string_edits: true }
    }
}

// ── Public API ────────────────────────────────────────────────────────────

/// Computes a patch that turns `old` into `new`. Equal inputs give the
/// empty patch.
pub fn diff(old: &DynamicValue, new: &DynamicValue) -> DynamicPatch {
    diff_with(old, new, &DiffOptions::default())
}

pub fn diff_with(old: &DynamicValue, new: &DynamicValue, options: &DiffOptions) -> DynamicPatch {
    let mut differ = Differ { options, ops: Vec::new() };
    let mut path = DynamicOptic::root();
    differ.diff_at(&mut path, old, new);
    DynamicPatch::from(differ.ops)
}

impl DynamicPatch {
    /// Shorthand for [`diff`].
    pub fn diff(old: &DynamicValue, new: &DynamicValue) -> DynamicPatch {
        diff(old, new)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────

pub(crate) fn common_prefix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

pub(crate) fn common_suffix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().rev().zip(b.iter().rev()).take_while(|(x, y)| x == y).count()
}

fn has_unique_names(fields: &[(String, DynamicValue)]) -> bool {
    let mut seen = HashSet::with_capacity(fields.len());
    fields.iter().all(|(name, _)| seen.insert(name.as_str()))
}

fn has_unique_keys(entries: &[(DynamicValue, DynamicValue)]) -> bool {
    entries.iter().enumerate().all(|(i, (k, _))| entries[..i].iter().all(|(other, _)| other != k))
}

fn lookup<'a>(entries: &'a [(DynamicValue, DynamicValue)], key: &DynamicValue) -> Option<&'a DynamicValue> {
    entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

/// The delta taking `old` to `new`, if one exists and reproduces `new`
/// exactly.
fn primitive_delta(old: &PrimitiveValue, new: &PrimitiveValue, options: &DiffOptions) -> Option<PrimitiveOp> {
    use PrimitiveValue as P;
    match (old, new) {
        (P::String(a), P::String(b)) if options.string_edits => str::string_edit(a, b).map(PrimitiveOp::StringEdit),
        _ if !options.numeric_deltas => None,
        (P::Byte(a), P::Byte(b)) => Some(PrimitiveOp::ByteDelta(b.wrapping_sub(*a))),
        (P::Short(a), P::Short(b)) => Some(PrimitiveOp::ShortDelta(b.wrapping_sub(*a))),
        (P::Int(a), P::Int(b)) => Some(PrimitiveOp::IntDelta(b.wrapping_sub(*a))),
        (P::Long(a), P::Long(b)) => Some(PrimitiveOp::LongDelta(b.wrapping_sub(*a))),
        (P::Float(a), P::Float(b)) => {
            let d = b - a;
            ((a + d).to_bits() == b.to_bits()).then_some(PrimitiveOp::FloatDelta(d))
        }
        (P::Double(a), P::Double(b)) => {
            let d = b - a;
            ((a + d).to_bits() == b.to_bits()).then_some(PrimitiveOp::DoubleDelta(d))
        }
        (P::BigInt(a), P::BigInt(b)) => Some(PrimitiveOp::BigIntDelta(b - a)),
        (P::BigDecimal(a), P::BigDecimal(b)) => {
            let d = b.checked_sub(*a)?;
            let back = a.checked_add(d)?;
            (back.mantissa() == b.mantissa() && back.scale() == b.scale()).then_some(PrimitiveOp::BigDecimalDelta(d))
        }
        (P::Duration(a), P::Duration(b)) => {
            let d = b.checked_sub(a)?;
            (a.checked_add(&d)? == *b).then_some(PrimitiveOp::DurationDelta(d))
        }
        (P::Instant(a), P::Instant(b)) => {
            let d = b.signed_duration_since(*a);
            (a.checked_add_signed(d)? == *b).then_some(PrimitiveOp::InstantDelta(d))
        }
        (P::LocalDate(a), P::LocalDate(b)) => Some(PrimitiveOp::LocalDateDelta(b.signed_duration_since(*a).num_days())),
        _ => None,
    }
}

// ── Differ ────────────────────────────────────────────────────────────────

struct Differ<'o> {
    options: &'o DiffOptions,
    ops: Vec<DynamicPatchOp>,
}

impl Differ<'_> {
    fn emit(&mut self, path: &DynamicOptic, op: Operation) {
        trace!(path = %path, op = op.op_name(), "diff emitted op");
        self.ops.push(DynamicPatchOp::new(path.clone(), op));
    }

    fn set(&mut self, path: &DynamicOptic, new: &DynamicValue) {
        self.emit(path, Operation::Set(new.clone()));
    }

    fn descend(&mut self, path: &mut DynamicOptic, step: Node, old: &DynamicValue, new: &DynamicValue) {
        path.push(step);
        self.diff_at(path, old, new);
        path.pop();
    }

    fn diff_at(&mut self, path: &mut DynamicOptic, old: &DynamicValue, new: &DynamicValue) {
        if old == new {
            return;
        }
        match (old, new) {
            (DynamicValue::Primitive(a), DynamicValue::Primitive(b)) => {
                match primitive_delta(a, b, self.options) {
                    Some(delta) => self.emit(path, Operation::PrimitiveDelta(delta)),
                    None => self.set(path, new),
                }
            }
            (DynamicValue::Record(a), DynamicValue::Record(b)) => self.diff_record(path, a, b, new),
            (DynamicValue::Variant(case_a, a), DynamicValue::Variant(case_b, b)) if case_a == case_b => {
                self.descend(path, Node::Case(case_a.clone()), a, b);
            }
            (DynamicValue::Sequence(a), DynamicValue::Sequence(b)) => self.diff_sequence(path, a, b),
            (DynamicValue::Map(a), DynamicValue::Map(b)) => self.diff_map(path, a, b, new),
            _ => self.set(path, new),
        }
    }

    /// Records are diffed field by field only when both sides have the same
    /// field names in the same order.
    fn diff_record(
        &mut self,
        path: &mut DynamicOptic,
        a: &[(String, DynamicValue)],
        b: &[(String, DynamicValue)],
        new: &DynamicValue,
    ) {
        let same_layout =
            a.len() == b.len() && a.iter().zip(b).all(|((x, _), (y, _))| x == y) && has_unique_names(a);
        if !same_layout {
            return self.set(path, new);
        }
        for ((name, old), (_, new)) in a.iter().zip(b) {
            self.descend(path, Node::Field(name.clone()), old, new);
        }
    }

    fn diff_sequence(&mut self, path: &mut DynamicOptic, a: &[DynamicValue], b: &[DynamicValue]) {
        let (n, m) = (a.len(), b.len());
        let prefix = common_prefix(a, b);
        let suffix = common_suffix(&a[prefix..], &b[prefix..]);

        // Pure insertion or deletion of one contiguous run.
        if n < m && prefix + suffix == n {
            let values = b[prefix..m - suffix].to_vec();
            let edit = if prefix == n { SeqOp::Append { values } } else { SeqOp::Insert { at: prefix, values } };
            return self.emit(path, Operation::SequenceEdit(vec![edit]));
        }
        if n > m && prefix + suffix == m {
            return self.emit(path, Operation::SequenceEdit(vec![SeqOp::Delete { at: prefix, count: n - m }]));
        }

        for (i, (old, new)) in a.iter().zip(b).enumerate() {
            self.descend(path, Node::AtIndex(i), old, new);
        }
        if m > n {
            self.emit(path, Operation::SequenceEdit(vec![SeqOp::Append { values: b[n..].to_vec() }]));
        } else if n > m {
            self.emit(path, Operation::SequenceEdit(vec![SeqOp::Delete { at: m, count: n - m }]));
        }
    }

    /// One map edit for removed and added keys, then recursion into keys
    /// present on both sides. Falls back to `Set` when the edit could not
    /// reproduce the entry order of `new`.
    fn diff_map(
        &mut self,
        path: &mut DynamicOptic,
        a: &[(DynamicValue, DynamicValue)],
        b: &[(DynamicValue, DynamicValue)],
        new: &DynamicValue,
    ) {
        if !has_unique_keys(a) || !has_unique_keys(b) {
            return self.set(path, new);
        }
        let added: Vec<&(DynamicValue, DynamicValue)> =
            b.iter().filter(|(k, _)| lookup(a, k).is_none()).collect();
        let kept = a.iter().filter(|(k, _)| lookup(b, k).is_some()).map(|(k, _)| k);
        if !kept.chain(added.iter().map(|(k, _)| k)).eq(b.iter().map(|(k, _)| k)) {
            return self.set(path, new);
        }

        let mut edits: Vec<MapOp> = a
            .iter()
            .filter(|(k, _)| lookup(b, k).is_none())
            .map(|(k, _)| MapOp::Remove { key: k.clone() })
            .collect();
        edits.extend(added.iter().map(|(k, v)| MapOp::Add { key: k.clone(), value: v.clone() }));
        if !edits.is_empty() {
            self.emit(path, Operation::MapEdit(edits));
        }

        for (key, new) in b {
            if let Some(old) = lookup(a, key) {
                self.descend(path, Node::AtMapKey(key.clone()), old, new);
            }
        }
    }
}
