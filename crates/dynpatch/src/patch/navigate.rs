//! Path resolution against a concrete value.
//!
//! Both walkers resolve the same grammar. A single-target step that
//! matches nothing yields `PathNotFound`; a step applied to the wrong
//! shape yields `TypeMismatch`. Multi-target steps visit their targets in
//! order and may legitimately match nothing.

use dynpatch_optic::{DynamicOptic, Node};
use dynpatch_value::DynamicValue;

use super::types::PatchError;

/// Returns every location `optic` addresses in `value`, in visit order.
pub fn select<'a>(value: &'a DynamicValue, optic: &DynamicOptic) -> Result<Vec<&'a DynamicValue>, PatchError> {
    let mut out = Vec::new();
    let mut at = DynamicOptic::root();
    select_from(value, optic, 0, &mut at, &mut out)?;
    Ok(out)
}

/// Calls `visit` with each location `optic` addresses, together with the
/// concrete path leading to it.
pub fn for_each_target_mut(
    value: &mut DynamicValue,
    optic: &DynamicOptic,
    visit: &mut dyn FnMut(&mut DynamicValue, &DynamicOptic) -> Result<(), PatchError>,
) -> Result<(), PatchError> {
    let mut at = DynamicOptic::root();
    visit_from(value, optic, 0, &mut at, visit)
}

fn not_found(optic: &DynamicOptic, depth: usize) -> PatchError {
    PatchError::path_not_found(optic, optic.prefix(depth + 1))
}

fn wrapped_mismatch(at: &DynamicOptic, value: &DynamicValue) -> PatchError {
    let found = match value {
        DynamicValue::Record(_) => "record with more or less than one field",
        other => other.shape_name(),
    };
    PatchError::type_mismatch(at, "single-field record", found)
}

// ── Read-only walk ────────────────────────────────────────────────────────

fn select_from<'a>(
    value: &'a DynamicValue,
    optic: &DynamicOptic,
    depth: usize,
    at: &mut DynamicOptic,
    out: &mut Vec<&'a DynamicValue>,
) -> Result<(), PatchError> {
    let Some(node) = optic.nodes().get(depth) else {
        out.push(value);
        return Ok(());
    };
    match (node, value) {
        (Node::Field(name), DynamicValue::Record(fields)) => {
            let (_, child) = fields.iter().find(|(n, _)| n == name).ok_or_else(|| not_found(optic, depth))?;
            descend(child, node.clone(), optic, depth, at, out)
        }
        (Node::Case(name), DynamicValue::Variant(case, payload)) => {
            if case != name {
                return Err(not_found(optic, depth));
            }
            descend(payload, node.clone(), optic, depth, at, out)
        }
        (Node::AtIndex(i), DynamicValue::Sequence(items)) => {
            let child = items.get(*i).ok_or_else(|| not_found(optic, depth))?;
            descend(child, node.clone(), optic, depth, at, out)
        }
        (Node::AtMapKey(key), DynamicValue::Map(entries)) => {
            let (_, child) = entries.iter().find(|(k, _)| k == key).ok_or_else(|| not_found(optic, depth))?;
            descend(child, node.clone(), optic, depth, at, out)
        }
        (Node::AtIndices(indices), DynamicValue::Sequence(items)) => {
            for &i in indices {
                let child = items.get(i).ok_or_else(|| not_found(optic, depth))?;
                descend(child, Node::AtIndex(i), optic, depth, at, out)?;
            }
            Ok(())
        }
        (Node::AtMapKeys(keys), DynamicValue::Map(entries)) => {
            for key in keys {
                let (_, child) = entries.iter().find(|(k, _)| k == key).ok_or_else(|| not_found(optic, depth))?;
                descend(child, Node::AtMapKey(key.clone()), optic, depth, at, out)?;
            }
            Ok(())
        }
        (Node::Elements, DynamicValue::Sequence(items)) => {
            for (i, child) in items.iter().enumerate() {
                descend(child, Node::AtIndex(i), optic, depth, at, out)?;
            }
            Ok(())
        }
        (Node::MapKeys, DynamicValue::Map(entries)) => {
            for (key, _) in entries {
                descend(key, Node::MapKeys, optic, depth, at, out)?;
            }
            Ok(())
        }
        (Node::MapValues, DynamicValue::Map(entries)) => {
            for (key, child) in entries {
                descend(child, Node::AtMapKey(key.clone()), optic, depth, at, out)?;
            }
            Ok(())
        }
        (Node::Wrapped, DynamicValue::Record(fields)) if fields.len() == 1 => {
            descend(&fields[0].1, Node::Wrapped, optic, depth, at, out)
        }
        (Node::Wrapped, other) => Err(wrapped_mismatch(at, other)),
        (node, other) => Err(PatchError::type_mismatch(at, expected_shape(node), other.shape_name())),
    }
}

fn descend<'a>(
    child: &'a DynamicValue,
    step: Node,
    optic: &DynamicOptic,
    depth: usize,
    at: &mut DynamicOptic,
    out: &mut Vec<&'a DynamicValue>,
) -> Result<(), PatchError> {
    at.push(step);
    let result = select_from(child, optic, depth + 1, at, out);
    at.pop();
    result
}

fn expected_shape(node: &Node) -> &'static str {
    match node {
        Node::Field(_) | Node::Wrapped => "record",
        Node::Case(_) => "variant",
        Node::AtIndex(_) | Node::AtIndices(_) | Node::Elements => "sequence",
        Node::AtMapKey(_) | Node::AtMapKeys(_) | Node::MapKeys | Node::MapValues => "map",
    }
}

// ── Mutable walk ──────────────────────────────────────────────────────────

fn visit_from(
    value: &mut DynamicValue,
    optic: &DynamicOptic,
    depth: usize,
    at: &mut DynamicOptic,
    visit: &mut dyn FnMut(&mut DynamicValue, &DynamicOptic) -> Result<(), PatchError>,
) -> Result<(), PatchError> {
    let Some(node) = optic.nodes().get(depth) else {
        return visit(value, at);
    };
    match (node, value) {
        (Node::Field(name), DynamicValue::Record(fields)) => {
            let (_, child) = fields.iter_mut().find(|(n, _)| n == name).ok_or_else(|| not_found(optic, depth))?;
            descend_mut(child, node.clone(), optic, depth, at, visit)
        }
        (Node::Case(name), DynamicValue::Variant(case, payload)) => {
            if case != name {
                return Err(not_found(optic, depth));
            }
            descend_mut(payload, node.clone(), optic, depth, at, visit)
        }
        (Node::AtIndex(i), DynamicValue::Sequence(items)) => {
            let child = items.get_mut(*i).ok_or_else(|| not_found(optic, depth))?;
            descend_mut(child, node.clone(), optic, depth, at, visit)
        }
        (Node::AtMapKey(key), DynamicValue::Map(entries)) => {
            let (_, child) = entries.iter_mut().find(|(k, _)| k == key).ok_or_else(|| not_found(optic, depth))?;
            descend_mut(child, node.clone(), optic, depth, at, visit)
        }
        (Node::AtIndices(indices), DynamicValue::Sequence(items)) => {
            for &i in indices {
                let child = items.get_mut(i).ok_or_else(|| not_found(optic, depth))?;
                descend_mut(child, Node::AtIndex(i), optic, depth, at, visit)?;
            }
            Ok(())
        }
        (Node::AtMapKeys(keys), DynamicValue::Map(entries)) => {
            for key in keys {
                let (_, child) =
                    entries.iter_mut().find(|(k, _)| k == key).ok_or_else(|| not_found(optic, depth))?;
                descend_mut(child, Node::AtMapKey(key.clone()), optic, depth, at, visit)?;
            }
            Ok(())
        }
        (Node::Elements, DynamicValue::Sequence(items)) => {
            for (i, child) in items.iter_mut().enumerate() {
                descend_mut(child, Node::AtIndex(i), optic, depth, at, visit)?;
            }
            Ok(())
        }
        (Node::MapKeys, DynamicValue::Map(entries)) => {
            for (key, _) in entries.iter_mut() {
                descend_mut(key, Node::MapKeys, optic, depth, at, visit)?;
            }
            Ok(())
        }
        (Node::MapValues, DynamicValue::Map(entries)) => {
            for (key, child) in entries.iter_mut() {
                let step = Node::AtMapKey(key.clone());
                descend_mut(child, step, optic, depth, at, visit)?;
            }
            Ok(())
        }
        (Node::Wrapped, DynamicValue::Record(fields)) if fields.len() == 1 => {
            descend_mut(&mut fields[0].1, Node::Wrapped, optic, depth, at, visit)
        }
        (Node::Wrapped, other) => Err(wrapped_mismatch(at, other)),
        (node, other) => Err(PatchError::type_mismatch(at, expected_shape(node), other.shape_name())),
    }
}

fn descend_mut(
    child: &mut DynamicValue,
    step: Node,
    optic: &DynamicOptic,
    depth: usize,
    at: &mut DynamicOptic,
    visit: &mut dyn FnMut(&mut DynamicValue, &DynamicOptic) -> Result<(), PatchError>,
) -> Result<(), PatchError> {
    at.push(step);
    let result = visit_from(child, optic, depth + 1, at, visit);
    at.pop();
    result
}
