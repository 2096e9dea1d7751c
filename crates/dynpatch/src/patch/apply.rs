//! Patch application.

use chrono::TimeDelta;
use dynpatch_optic::DynamicOptic;
use dynpatch_value::{DynamicValue, PrimitiveValue};
use tracing::{debug, trace};

use super::navigate::{for_each_target_mut, select};
use super::types::*;

// ── Public API ────────────────────────────────────────────────────────────

/// Applies a single op to `doc` in place.
///
/// The path is resolved read-only first, so an addressing failure leaves
/// `doc` untouched. A failure inside the operation may leave earlier
/// targets of a multi-target path already modified.
pub fn apply_op(doc: &mut DynamicValue, op: &DynamicPatchOp) -> Result<(), PatchError> {
    select(doc, &op.path)?;
    for_each_target_mut(doc, &op.path, &mut |target, at| apply_operation(target, &op.op, at))
}

/// Applies `patch` to a copy of `value`. The input is never modified.
pub fn apply_patch(value: &DynamicValue, patch: &DynamicPatch, mode: PatchMode) -> Result<DynamicValue, PatchError> {
    let mut doc = value.clone();
    for (index, op) in patch.iter().enumerate() {
        match apply_op(&mut doc, op) {
            Ok(()) => trace!(index, path = %op.path, op = op.op.op_name(), "applied patch op"),
            Err(err) if mode == PatchMode::Lenient && err.is_path_not_found() => {
                debug!(index, path = %op.path, error = %err, "skipping patch op with unresolved path");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(doc)
}

impl DynamicPatch {
    /// Applies this patch to a copy of `value`.
    pub fn apply(&self, value: &DynamicValue, mode: PatchMode) -> Result<DynamicValue, PatchError> {
        apply_patch(value, self, mode)
    }
}

// ── Operations ────────────────────────────────────────────────────────────

fn apply_operation(target: &mut DynamicValue, op: &Operation, at: &DynamicOptic) -> Result<(), PatchError> {
    match op {
        Operation::Set(value) => {
            *target = value.clone();
            Ok(())
        }
        Operation::PrimitiveDelta(delta) => match target {
            DynamicValue::Primitive(prim) => apply_primitive(prim, delta, at),
            other => Err(PatchError::type_mismatch(at, delta.target_kind(), other.shape_name())),
        },
        Operation::SequenceEdit(edits) => match target {
            DynamicValue::Sequence(items) => {
                for edit in edits {
                    apply_seq_op(items, edit, at)?;
                }
                Ok(())
            }
            other => Err(PatchError::type_mismatch(at, "sequence", other.shape_name())),
        },
        Operation::MapEdit(edits) => match target {
            DynamicValue::Map(entries) => {
                for edit in edits {
                    apply_map_op(entries, edit);
                }
                Ok(())
            }
            other => Err(PatchError::type_mismatch(at, "map", other.shape_name())),
        },
    }
}

fn apply_primitive(prim: &mut PrimitiveValue, op: &PrimitiveOp, at: &DynamicOptic) -> Result<(), PatchError> {
    let overflow = || PatchError::operation_failed(at, format!("{} delta overflows", op.target_kind()));
    match (op, prim) {
        (PrimitiveOp::ByteDelta(d), PrimitiveValue::Byte(n)) => *n = n.wrapping_add(*d),
        (PrimitiveOp::ShortDelta(d), PrimitiveValue::Short(n)) => *n = n.wrapping_add(*d),
        (PrimitiveOp::IntDelta(d), PrimitiveValue::Int(n)) => *n = n.wrapping_add(*d),
        (PrimitiveOp::LongDelta(d), PrimitiveValue::Long(n)) => *n = n.wrapping_add(*d),
        (PrimitiveOp::FloatDelta(d), PrimitiveValue::Float(n)) => *n += *d,
        (PrimitiveOp::DoubleDelta(d), PrimitiveValue::Double(n)) => *n += *d,
        (PrimitiveOp::BigIntDelta(d), PrimitiveValue::BigInt(n)) => *n += d,
        (PrimitiveOp::BigDecimalDelta(d), PrimitiveValue::BigDecimal(n)) => {
            *n = n.checked_add(*d).ok_or_else(overflow)?;
        }
        (PrimitiveOp::DurationDelta(d), PrimitiveValue::Duration(n)) => {
            *n = n.checked_add(d).ok_or_else(overflow)?;
        }
        (PrimitiveOp::InstantDelta(d), PrimitiveValue::Instant(t)) => {
            *t = t.checked_add_signed(*d).ok_or_else(overflow)?;
        }
        (PrimitiveOp::LocalDateDelta(days), PrimitiveValue::LocalDate(date)) => {
            *date = TimeDelta::try_days(*days)
                .and_then(|delta| date.checked_add_signed(delta))
                .ok_or_else(overflow)?;
        }
        (PrimitiveOp::StringEdit(edits), PrimitiveValue::String(s)) => apply_string_ops(s, edits, at)?,
        (op, other) => return Err(PatchError::type_mismatch(at, op.target_kind(), other.type_name())),
    }
    Ok(())
}

/// Positions are in chars, not bytes.
fn apply_string_ops(s: &mut String, edits: &[StringOp], at: &DynamicOptic) -> Result<(), PatchError> {
    let mut chars: Vec<char> = s.chars().collect();
    for edit in edits {
        match edit {
            StringOp::Insert { at: pos, text } => {
                if *pos > chars.len() {
                    return Err(PatchError::operation_failed(
                        at,
                        format!("string insert at {pos} is past length {}", chars.len()),
                    ));
                }
                chars.splice(*pos..*pos, text.chars());
            }
            StringOp::Delete { at: pos, len } => {
                let end = pos.checked_add(*len).filter(|end| *end <= chars.len()).ok_or_else(|| {
                    PatchError::operation_failed(
                        at,
                        format!("string delete of {len} at {pos} is past length {}", chars.len()),
                    )
                })?;
                chars.drain(*pos..end);
            }
        }
    }
    *s = chars.into_iter().collect();
    Ok(())
}

fn apply_seq_op(items: &mut Vec<DynamicValue>, edit: &SeqOp, at: &DynamicOptic) -> Result<(), PatchError> {
    match edit {
        SeqOp::Insert { at: pos, values } => {
            if *pos > items.len() {
                return Err(PatchError::operation_failed(
                    at,
                    format!("insert at {pos} is past length {}", items.len()),
                ));
            }
            items.splice(*pos..*pos, values.iter().cloned());
        }
        SeqOp::Delete { at: pos, count } => {
            let end = pos.checked_add(*count).filter(|end| *end <= items.len()).ok_or_else(|| {
                PatchError::operation_failed(at, format!("delete of {count} at {pos} is past length {}", items.len()))
            })?;
            items.drain(*pos..end);
        }
        SeqOp::Append { values } => items.extend(values.iter().cloned()),
    }
    Ok(())
}

fn apply_map_op(entries: &mut Vec<(DynamicValue, DynamicValue)>, edit: &MapOp) {
    match edit {
        MapOp::Add { key, value } => match entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value.clone(),
            None => entries.push((key.clone(), value.clone())),
        },
        MapOp::Remove { key } => entries.retain(|(k, _)| k != key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use num_bigint::BigInt;
    use rust_decimal::Decimal;

    fn person() -> DynamicValue {
        DynamicValue::record([
            ("name", DynamicValue::string("Alice")),
            ("age", DynamicValue::int(30)),
            ("tags", DynamicValue::sequence([DynamicValue::string("a"), DynamicValue::string("b")])),
        ])
    }

    fn at(field: &str) -> DynamicOptic {
        DynamicOptic::root().field(field)
    }

    #[test]
    fn set_replaces_subtree() {
        let p = DynamicPatch::single(at("name"), Operation::Set(DynamicValue::string("Bob")));
        let out = p.apply(&person(), PatchMode::Strict).unwrap();
        assert_eq!(out.field("name"), Some(&DynamicValue::string("Bob")));
        assert_eq!(out.field("age"), Some(&DynamicValue::int(30)));
    }

    #[test]
    fn input_is_not_modified() {
        let input = person();
        let p = DynamicPatch::single(at("age"), Operation::PrimitiveDelta(PrimitiveOp::IntDelta(1)));
        let _ = p.apply(&input, PatchMode::Strict).unwrap();
        assert_eq!(input, person());
    }

    #[test]
    fn int_delta_wraps() {
        let v = DynamicValue::int(i32::MAX);
        let p = DynamicPatch::root(Operation::PrimitiveDelta(PrimitiveOp::IntDelta(1)));
        assert_eq!(p.apply(&v, PatchMode::Strict).unwrap(), DynamicValue::int(i32::MIN));
    }

    #[test]
    fn delta_kind_must_match() {
        let p = DynamicPatch::single(at("name"), Operation::PrimitiveDelta(PrimitiveOp::IntDelta(1)));
        let err = p.apply(&person(), PatchMode::Lenient).unwrap_err();
        assert_eq!(
            err,
            PatchError::TypeMismatch { path: at("name"), expected: "int", found: "string" }
        );
    }

    #[test]
    fn exact_numeric_deltas() {
        let big = DynamicValue::Primitive(PrimitiveValue::BigInt(BigInt::from(10)));
        let p = DynamicPatch::root(Operation::PrimitiveDelta(PrimitiveOp::BigIntDelta(BigInt::from(-15))));
        assert_eq!(
            p.apply(&big, PatchMode::Strict).unwrap(),
            DynamicValue::Primitive(PrimitiveValue::BigInt(BigInt::from(-5)))
        );

        let dec = DynamicValue::Primitive(PrimitiveValue::BigDecimal(Decimal::new(150, 2)));
        let p = DynamicPatch::root(Operation::PrimitiveDelta(PrimitiveOp::BigDecimalDelta(Decimal::new(25, 2))));
        assert_eq!(
            p.apply(&dec, PatchMode::Strict).unwrap(),
            DynamicValue::Primitive(PrimitiveValue::BigDecimal(Decimal::new(175, 2)))
        );
    }

    #[test]
    fn temporal_deltas() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        let v = DynamicValue::Primitive(PrimitiveValue::LocalDate(date));
        let p = DynamicPatch::root(Operation::PrimitiveDelta(PrimitiveOp::LocalDateDelta(2)));
        assert_eq!(
            p.apply(&v, PatchMode::Strict).unwrap(),
            DynamicValue::Primitive(PrimitiveValue::LocalDate(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()))
        );

        let d = DynamicValue::Primitive(PrimitiveValue::Duration(TimeDelta::seconds(30)));
        let p = DynamicPatch::root(Operation::PrimitiveDelta(PrimitiveOp::DurationDelta(TimeDelta::seconds(-45))));
        assert_eq!(
            p.apply(&d, PatchMode::Strict).unwrap(),
            DynamicValue::Primitive(PrimitiveValue::Duration(TimeDelta::seconds(-15)))
        );
    }

    #[test]
    fn local_date_overflow_fails() {
        let v = DynamicValue::Primitive(PrimitiveValue::LocalDate(NaiveDate::MAX));
        let p = DynamicPatch::root(Operation::PrimitiveDelta(PrimitiveOp::LocalDateDelta(1)));
        assert!(matches!(p.apply(&v, PatchMode::Strict), Err(PatchError::OperationFailed { .. })));
    }

    #[test]
    fn string_edits_count_chars() {
        let v = DynamicValue::string("héllo");
        let p = DynamicPatch::root(Operation::PrimitiveDelta(PrimitiveOp::StringEdit(vec![
            StringOp::Delete { at: 1, len: 1 },
            StringOp::Insert { at: 1, text: "e".into() },
            StringOp::Insert { at: 5, text: "!".into() },
        ])));
        assert_eq!(p.apply(&v, PatchMode::Strict).unwrap(), DynamicValue::string("hello!"));

        let p = DynamicPatch::root(Operation::PrimitiveDelta(PrimitiveOp::StringEdit(vec![StringOp::Delete {
            at: 3,
            len: 5,
        }])));
        assert!(matches!(p.apply(&v, PatchMode::Strict), Err(PatchError::OperationFailed { .. })));
    }

    #[test]
    fn sequence_edits_apply_in_order() {
        let p = DynamicPatch::single(
            at("tags"),
            Operation::SequenceEdit(vec![
                SeqOp::Insert { at: 1, values: vec![DynamicValue::string("x")] },
                SeqOp::Delete { at: 0, count: 1 },
                SeqOp::Append { values: vec![DynamicValue::string("z")] },
            ]),
        );
        let out = p.apply(&person(), PatchMode::Strict).unwrap();
        assert_eq!(
            out.field("tags"),
            Some(&DynamicValue::sequence([
                DynamicValue::string("x"),
                DynamicValue::string("b"),
                DynamicValue::string("z"),
            ]))
        );
    }

    #[test]
    fn sequence_insert_past_end_fails_in_both_modes() {
        let p = DynamicPatch::single(
            at("tags"),
            Operation::SequenceEdit(vec![SeqOp::Insert { at: 3, values: vec![DynamicValue::unit()] }]),
        );
        for mode in [PatchMode::Strict, PatchMode::Lenient] {
            assert!(matches!(p.apply(&person(), mode), Err(PatchError::OperationFailed { .. })));
        }
    }

    #[test]
    fn map_edits() {
        let m = DynamicValue::map([
            (DynamicValue::string("a"), DynamicValue::int(1)),
            (DynamicValue::string("b"), DynamicValue::int(2)),
        ]);
        let p = DynamicPatch::root(Operation::MapEdit(vec![
            MapOp::Remove { key: DynamicValue::string("a") },
            MapOp::Remove { key: DynamicValue::string("missing") },
            MapOp::Add { key: DynamicValue::string("b"), value: DynamicValue::int(20) },
            MapOp::Add { key: DynamicValue::string("c"), value: DynamicValue::int(3) },
        ]));
        assert_eq!(
            p.apply(&m, PatchMode::Strict).unwrap(),
            DynamicValue::map([
                (DynamicValue::string("b"), DynamicValue::int(20)),
                (DynamicValue::string("c"), DynamicValue::int(3)),
            ])
        );
    }

    #[test]
    fn lenient_skips_unresolved_paths_only() {
        let p = DynamicPatch::single(at("missing"), Operation::Set(DynamicValue::int(1)))
            + DynamicPatch::single(at("age"), Operation::PrimitiveDelta(PrimitiveOp::IntDelta(5)));
        assert!(p.apply(&person(), PatchMode::Strict).unwrap_err().is_path_not_found());
        let out = p.apply(&person(), PatchMode::Lenient).unwrap();
        assert_eq!(out.field("age"), Some(&DynamicValue::int(35)));
    }

    #[test]
    fn multi_target_applies_to_each() {
        let v = DynamicValue::record([(
            "items",
            DynamicValue::sequence([
                DynamicValue::record([("qty", DynamicValue::int(1))]),
                DynamicValue::record([("qty", DynamicValue::int(2))]),
            ]),
        )]);
        let p = DynamicPatch::single(
            DynamicOptic::root().field("items").elements().field("qty"),
            Operation::PrimitiveDelta(PrimitiveOp::IntDelta(10)),
        );
        let out = p.apply(&v, PatchMode::Strict).unwrap();
        let qtys: Vec<_> = out.field("items").and_then(|i| i.as_sequence()).unwrap().iter().map(|r| r.field("qty")).collect();
        assert_eq!(qtys, vec![Some(&DynamicValue::int(11)), Some(&DynamicValue::int(12))]);

        let empty = DynamicValue::record([("items", DynamicValue::sequence([]))]);
        assert_eq!(p.apply(&empty, PatchMode::Strict).unwrap(), empty);
    }

    #[test]
    fn unresolved_multi_target_leaves_document_untouched() {
        let mut doc = DynamicValue::sequence([DynamicValue::int(1), DynamicValue::int(2)]);
        let op = DynamicPatchOp::new(
            DynamicOptic::root().at_indices([0, 7]),
            Operation::PrimitiveDelta(PrimitiveOp::IntDelta(1)),
        );
        assert!(apply_op(&mut doc, &op).unwrap_err().is_path_not_found());
        assert_eq!(doc, DynamicValue::sequence([DynamicValue::int(1), DynamicValue::int(2)]));
    }
}
