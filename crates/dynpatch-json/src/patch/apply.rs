//! JSON patch application.

use serde_json::{Map, Number, Value};
use tracing::{debug, trace};

use super::types::*;
use crate::path::{JsonPath, Segment};

// ── Path navigation ───────────────────────────────────────────────────────

/// Resolves `path` in `doc`. Missing keys and out-of-range indices are
/// `PathNotFound`; stepping into a scalar or the wrong container is
/// `TypeMismatch`.
pub fn resolve<'a>(doc: &'a Value, path: &JsonPath) -> Result<&'a Value, JsonPatchError> {
    let mut current = doc;
    for (depth, segment) in path.segments().iter().enumerate() {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get(key).ok_or_else(|| not_found(path, depth))?,
            (Segment::Index(i), Value::Array(items)) => items.get(*i).ok_or_else(|| not_found(path, depth))?,
            (segment, other) => return Err(step_mismatch(path, depth, segment, other)),
        };
    }
    Ok(current)
}

fn resolve_mut<'a>(doc: &'a mut Value, path: &JsonPath) -> Result<&'a mut Value, JsonPatchError> {
    let mut current = doc;
    for (depth, segment) in path.segments().iter().enumerate() {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get_mut(key).ok_or_else(|| not_found(path, depth))?,
            (Segment::Index(i), Value::Array(items)) => items.get_mut(*i).ok_or_else(|| not_found(path, depth))?,
            (segment, other) => return Err(step_mismatch(path, depth, segment, other)),
        };
    }
    Ok(current)
}

fn not_found(path: &JsonPath, depth: usize) -> JsonPatchError {
    JsonPatchError::PathNotFound { path: path.clone(), failed_at: path.prefix(depth + 1) }
}

fn step_mismatch(path: &JsonPath, depth: usize, segment: &Segment, found: &Value) -> JsonPatchError {
    let expected = match segment {
        Segment::Key(_) => "object",
        Segment::Index(_) => "array",
    };
    JsonPatchError::TypeMismatch { path: path.prefix(depth), expected, found: kind_name(found) }
}

fn mismatch(path: &JsonPath, expected: &'static str, found: &Value) -> JsonPatchError {
    JsonPatchError::TypeMismatch { path: path.clone(), expected, found: kind_name(found) }
}

fn failed(path: &JsonPath, message: String) -> JsonPatchError {
    JsonPatchError::OperationFailed { path: path.clone(), message }
}

// ── Public API ────────────────────────────────────────────────────────────

/// Applies one op to `doc` in place. Path resolution happens before any
/// mutation.
pub fn apply_op(doc: &mut Value, op: &JsonPatchOp) -> Result<(), JsonPatchError> {
    let target = resolve_mut(doc, &op.path)?;
    let path = &op.path;
    match &op.op {
        JsonOperation::Set { value } => {
            *target = value.clone();
            Ok(())
        }
        JsonOperation::NumberDelta { delta } => match target {
            Value::Number(n) => {
                let sum = add_numbers(n, delta)
                    .ok_or_else(|| failed(path, format!("{n} + {delta} is not representable")))?;
                *n = sum;
                Ok(())
            }
            other => Err(mismatch(path, "number", other)),
        },
        JsonOperation::StringEdit { edits } => match target {
            Value::String(s) => apply_string_ops(s, edits, path),
            other => Err(mismatch(path, "string", other)),
        },
        JsonOperation::ArrayEdit { edits } => match target {
            Value::Array(items) => edits.iter().try_for_each(|edit| apply_array_op(items, edit, path)),
            other => Err(mismatch(path, "array", other)),
        },
        JsonOperation::ObjectEdit { edits } => match target {
            Value::Object(map) => {
                edits.iter().for_each(|edit| apply_object_op(map, edit));
                Ok(())
            }
            other => Err(mismatch(path, "object", other)),
        },
    }
}

/// Applies `patch` to a copy of `value`.
pub fn apply_patch(value: &Value, patch: &JsonPatch, mode: PatchMode) -> Result<Value, JsonPatchError> {
    let mut doc = value.clone();
    for (index, op) in patch.iter().enumerate() {
        match apply_op(&mut doc, op) {
            Ok(()) => trace!(index, path = %op.path, op = op.op.op_name(), "applied json patch op"),
            Err(err) if mode == PatchMode::Lenient && err.is_path_not_found() => {
                debug!(index, path = %op.path, error = %err, "skipping json patch op with unresolved path");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(doc)
}

impl JsonPatch {
    pub fn apply(&self, value: &Value, mode: PatchMode) -> Result<Value, JsonPatchError> {
        apply_patch(value, self, mode)
    }
}

// ── Operations ────────────────────────────────────────────────────────────

/// Largest integer magnitude an `f64` holds exactly.
const MAX_EXACT_F64: u64 = 1 << 53;

/// Exact integer addition when both sides are integers, `f64` otherwise.
/// `None` when the integer sum leaves the `i64`/`u64` range, when an
/// integer operand is too large to take part in float arithmetic, or when
/// the float result is not finite.
pub(crate) fn add_numbers(base: &Number, delta: &Number) -> Option<Number> {
    if let (Some(a), Some(d)) = (as_integer(base), as_integer(delta)) {
        return integer_number(a + d);
    }
    let sum = exact_f64(base)? + exact_f64(delta)?;
    Number::from_f64(sum)
}

pub(crate) fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64().map(i128::from).or_else(|| n.as_u64().map(i128::from))
}

pub(crate) fn integer_number(n: i128) -> Option<Number> {
    match i64::try_from(n) {
        Ok(n) => Some(Number::from(n)),
        Err(_) => u64::try_from(n).ok().map(Number::from),
    }
}

fn exact_f64(n: &Number) -> Option<f64> {
    match as_integer(n) {
        Some(i) if i.unsigned_abs() > u128::from(MAX_EXACT_F64) => None,
        _ => n.as_f64(),
    }
}

fn apply_string_ops(s: &mut String, edits: &[StringOp], path: &JsonPath) -> Result<(), JsonPatchError> {
    let mut chars: Vec<char> = s.chars().collect();
    for edit in edits {
        match edit {
            StringOp::Insert { at, text } => {
                if *at > chars.len() {
                    return Err(failed(path, format!("string insert at {at} is past length {}", chars.len())));
                }
                chars.splice(*at..*at, text.chars());
            }
            StringOp::Delete { at, len } => {
                let end = at.checked_add(*len).filter(|end| *end <= chars.len()).ok_or_else(|| {
                    failed(path, format!("string delete of {len} at {at} is past length {}", chars.len()))
                })?;
                chars.drain(*at..end);
            }
        }
    }
    *s = chars.into_iter().collect();
    Ok(())
}

fn apply_array_op(items: &mut Vec<Value>, edit: &ArrayOp, path: &JsonPath) -> Result<(), JsonPatchError> {
    match edit {
        ArrayOp::Insert { at, values } => {
            if *at > items.len() {
                return Err(failed(path, format!("insert at {at} is past length {}", items.len())));
            }
            items.splice(*at..*at, values.iter().cloned());
        }
        ArrayOp::Delete { at, count } => {
            let end = at
                .checked_add(*count)
                .filter(|end| *end <= items.len())
                .ok_or_else(|| failed(path, format!("delete of {count} at {at} is past length {}", items.len())))?;
            items.drain(*at..end);
        }
        ArrayOp::Append { values } => items.extend(values.iter().cloned()),
    }
    Ok(())
}

fn apply_object_op(map: &mut Map<String, Value>, edit: &ObjectOp) {
    match edit {
        ObjectOp::Add { key, value } => {
            map.insert(key.clone(), value.clone());
        }
        ObjectOp::Remove { key } => {
            map.shift_remove(key);
        }
    }
}
