//! Patch and diff laws for the JSON variant.

use dynpatch_json::{diff, diff_with, JsonDiffOptions, JsonOperation, JsonPatch, JsonPath, PatchMode};
use proptest::prelude::*;
use serde_json::{json, Map, Number, Value};

// ── Strategies ────────────────────────────────────────────────────────────

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(Number::from(n))),
        (-1.0e6f64..1.0e6).prop_map(|f| Number::from_f64(f).map_or(Value::Null, Value::Number)),
        "[a-dé]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::vec(("[a-e]", inner), 0..5)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<String, Value>>())),
        ]
    })
}

/// Small arrays over a tiny alphabet, so LCS alignment has work to do.
fn arb_small_array() -> impl Strategy<Value = Value> {
    prop::collection::vec(0i64..4, 0..12).prop_map(|items| json!(items))
}

fn arb_patch() -> impl Strategy<Value = JsonPatch> {
    prop::collection::vec(
        prop_oneof![
            (prop::sample::select(vec!["a", "b", "zz"]), any::<i32>())
                .prop_map(|(k, n)| JsonPatch::single(JsonPath::root().key(k), JsonOperation::Set { value: json!(n) })),
            (0usize..4).prop_map(|i| JsonPatch::single(
                JsonPath::root().key("list").index(i),
                JsonOperation::NumberDelta { delta: Number::from(1) }
            )),
        ],
        0..5,
    )
    .prop_map(|patches| patches.into_iter().fold(JsonPatch::empty(), |acc, p| acc + p))
}

fn arb_doc() -> impl Strategy<Value = Value> {
    (any::<i32>(), prop::collection::vec(-10i64..10, 0..4))
        .prop_map(|(a, list)| json!({"a": a, "list": list}))
}

// ── Laws ──────────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn roundtrip(a in arb_json(), b in arb_json()) {
        prop_assert_eq!(diff(&a, &b).apply(&a, PatchMode::Strict), Ok(b));
    }

    #[test]
    fn roundtrip_preserves_serialization(a in arb_json(), b in arb_json()) {
        let applied = diff(&a, &b).apply(&a, PatchMode::Strict);
        let rendered = applied.map(|v| serde_json::to_string(&v).unwrap_or_default());
        prop_assert_eq!(rendered, Ok(serde_json::to_string(&b).unwrap_or_default()));
    }

    #[test]
    fn roundtrip_arrays(a in arb_small_array(), b in arb_small_array()) {
        prop_assert_eq!(diff(&a, &b).apply(&a, PatchMode::Strict), Ok(b.clone()));
        let positional = JsonDiffOptions { max_lcs_cells: 0, ..JsonDiffOptions::default() };
        prop_assert_eq!(diff_with(&a, &b, &positional).apply(&a, PatchMode::Strict), Ok(b));
    }

    #[test]
    fn diff_identity(v in arb_json()) {
        prop_assert!(diff(&v, &v).is_empty());
    }

    #[test]
    fn composition(a in arb_json(), b in arb_json(), c in arb_json()) {
        let patch = diff(&a, &b) + diff(&b, &c);
        prop_assert_eq!(patch.apply(&a, PatchMode::Strict), Ok(c));
    }

    #[test]
    fn monoid_laws(p1 in arb_patch(), p2 in arb_patch(), p3 in arb_patch()) {
        prop_assert_eq!(JsonPatch::empty().concat(&p1), p1.clone());
        prop_assert_eq!(p1.concat(&JsonPatch::empty()), p1.clone());
        prop_assert_eq!(p1.concat(&p2).concat(&p3), p1.concat(&p2.concat(&p3)));
    }

    #[test]
    fn semantic_composition(v in arb_doc(), p1 in arb_patch(), p2 in arb_patch()) {
        for mode in [PatchMode::Strict, PatchMode::Lenient] {
            let together = p1.concat(&p2).apply(&v, mode);
            let stepwise = p1.apply(&v, mode).and_then(|x| p2.apply(&x, mode));
            prop_assert_eq!(together, stepwise);
        }
    }

    #[test]
    fn strict_success_implies_same_lenient_result(v in arb_doc(), p in arb_patch()) {
        if let Ok(strict) = p.apply(&v, PatchMode::Strict) {
            prop_assert_eq!(p.apply(&v, PatchMode::Lenient), Ok(strict));
        }
    }

    #[test]
    fn lenient_skips_missing_key(v in arb_doc()) {
        let patch = JsonPatch::single(JsonPath::root().key("missing").key("x"), JsonOperation::Set { value: json!(1) });
        prop_assert_eq!(patch.apply(&v, PatchMode::Lenient), Ok(v));
    }
}

// ── LCS scenario ──────────────────────────────────────────────────────────

/// Number of JSON values a patch carries inline.
fn carried_values(patch: &JsonPatch) -> usize {
    use dynpatch_json::ArrayOp;
    patch
        .iter()
        .map(|op| match &op.op {
            JsonOperation::Set { .. } => 1,
            JsonOperation::ArrayEdit { edits } => edits
                .iter()
                .map(|e| match e {
                    ArrayOp::Insert { values, .. } | ArrayOp::Append { values } => values.len(),
                    ArrayOp::Delete { .. } => 0,
                })
                .sum::<usize>(),
            _ => 0,
        })
        .sum()
}

#[test]
fn lcs_leaves_common_elements_untouched() {
    let old = json!([1, 2, 3, 4]);
    let new = json!([1, 3, 4, 5]);
    let patch = diff(&old, &new);

    assert_eq!(patch.apply(&old, PatchMode::Strict), Ok(new.clone()));
    // Nothing addresses an element directly, so 1, 3 and 4 are never rewritten.
    assert!(patch.iter().all(|op| op.path.is_root()));
    assert!(patch.iter().all(|op| !matches!(op.op, JsonOperation::Set { .. })));
    assert_eq!(carried_values(&patch), 1);
    assert!(carried_values(&patch) < new.as_array().map_or(0, Vec::len));
}

#[test]
fn removed_key_keeps_sibling_order() {
    let old = json!({"a": 1, "b": 2, "c": 3});
    let new = json!({"b": 2, "c": 3});
    let applied = diff(&old, &new).apply(&old, PatchMode::Strict).unwrap();
    assert_eq!(serde_json::to_string(&applied).unwrap(), r#"{"b":2,"c":3}"#);
}

#[test]
fn lcs_beats_positional_alignment() {
    let old = json!(["a", "b", "c", "d", "e", "f"]);
    let new = json!(["x", "a", "b", "c", "d", "e"]);
    let lcs = diff(&old, &new);
    let positional = diff_with(&old, &new, &JsonDiffOptions { max_lcs_cells: 0, ..JsonDiffOptions::default() });
    assert_eq!(lcs.apply(&old, PatchMode::Strict), Ok(new.clone()));
    assert_eq!(positional.apply(&old, PatchMode::Strict), Ok(new));
    assert_eq!(lcs.len(), 2);
    assert!(positional.len() > lcs.len());
}
