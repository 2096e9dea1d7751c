use dynpatch_optic::{DynamicOptic, Node};
use dynpatch_value::{DynamicValue, PrimitiveValue};
use proptest::prelude::*;

// ── Strategies ────────────────────────────────────────────────────────────

fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof!["[a-z_][a-z0-9_]{0,6}", "[ -~é]{0,6}", any::<String>()]
}

fn arb_key() -> impl Strategy<Value = DynamicValue> {
    prop_oneof![
        any::<i32>().prop_map(DynamicValue::int),
        any::<i64>().prop_map(DynamicValue::long),
        any::<bool>().prop_map(DynamicValue::boolean),
        any::<String>().prop_map(DynamicValue::string),
        any::<char>().prop_map(|c| DynamicValue::Primitive(PrimitiveValue::Char(c))),
    ]
}

fn arb_node() -> impl Strategy<Value = Node> {
    prop_oneof![
        arb_name().prop_map(Node::Field),
        arb_name().prop_map(Node::Case),
        any::<usize>().prop_map(Node::AtIndex),
        arb_key().prop_map(Node::AtMapKey),
        prop::collection::vec(any::<usize>(), 0..4).prop_map(Node::AtIndices),
        prop::collection::vec(arb_key(), 0..4).prop_map(Node::AtMapKeys),
        Just(Node::Elements),
        Just(Node::MapKeys),
        Just(Node::MapValues),
        Just(Node::Wrapped),
    ]
}

fn arb_optic() -> impl Strategy<Value = DynamicOptic> {
    prop::collection::vec(arb_node(), 0..6).prop_map(DynamicOptic::from_nodes)
}

// ── Laws ──────────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn rendering_parses_back(path in arb_optic()) {
        let rendered = path.to_string();
        let parsed: Result<DynamicOptic, _> = rendered.parse();
        prop_assert_eq!(parsed, Ok(path), "{}", rendered);
    }
}

#[test]
fn one_member_batches_stay_batches() {
    let indices = DynamicOptic::root().at_indices([5]);
    assert_eq!(indices.to_string(), "[5,]");
    assert_eq!(indices.to_string().parse::<DynamicOptic>(), Ok(indices));

    let keys = DynamicOptic::root().at_map_keys([DynamicValue::string("k")]);
    assert_eq!(keys.to_string(), r#"{"k",}"#);
    assert_eq!(keys.to_string().parse::<DynamicOptic>(), Ok(keys));

    let single = DynamicOptic::root().at_index(5);
    assert_eq!(single.to_string().parse::<DynamicOptic>(), Ok(single));
}

#[test]
fn equality_is_structural() {
    let built = DynamicOptic::root().field("a").at_index(0);
    let from_nodes = DynamicOptic::from_nodes(vec![Node::Field("a".into()), Node::AtIndex(0)]);
    let collected: DynamicOptic = [Node::Field("a".into()), Node::AtIndex(0)].into_iter().collect();
    assert_eq!(built, from_nodes);
    assert_eq!(built, collected);
    assert_ne!(built, DynamicOptic::root().at_index(0).field("a"));
}

#[test]
fn optics_serialize_as_node_lists() {
    let path = DynamicOptic::root().field("a").at_map_key(3).elements();
    let json = serde_json::to_value(&path).unwrap();
    assert!(json.is_array());
    assert_eq!(json.as_array().map(Vec::len), Some(3));
    let back: DynamicOptic = serde_json::from_value(json).unwrap();
    assert_eq!(back, path);
}
