//! The recursive dynamic value tree.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::primitive::PrimitiveValue;

/// A schema-free structured value.
///
/// Each node exclusively owns its children, so the tree is finite and
/// acyclic. Values are never mutated by the patch engine; every
/// transformation produces a new tree.
///
/// Record field order and map entry order are part of the value: two
/// records with the same fields in a different order are not equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DynamicValue {
    Primitive(PrimitiveValue),
    Record(Vec<(String, DynamicValue)>),
    Variant(String, Box<DynamicValue>),
    Sequence(Vec<DynamicValue>),
    Map(Vec<(DynamicValue, DynamicValue)>),
}

impl DynamicValue {
    // ── Constructors ──────────────────────────────────────────────────────

    pub fn unit() -> Self {
        DynamicValue::Primitive(PrimitiveValue::Unit)
    }

    pub fn boolean(b: bool) -> Self {
        DynamicValue::Primitive(PrimitiveValue::Boolean(b))
    }

    pub fn int(n: i32) -> Self {
        DynamicValue::Primitive(PrimitiveValue::Int(n))
    }

    pub fn long(n: i64) -> Self {
        DynamicValue::Primitive(PrimitiveValue::Long(n))
    }

    pub fn double(n: f64) -> Self {
        DynamicValue::Primitive(PrimitiveValue::Double(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        DynamicValue::Primitive(PrimitiveValue::String(s.into()))
    }

    /// Builds a record from `(name, value)` pairs, keeping their order.
    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, DynamicValue)>,
    {
        DynamicValue::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn variant(case: impl Into<String>, payload: DynamicValue) -> Self {
        DynamicValue::Variant(case.into(), Box::new(payload))
    }

    pub fn sequence<I: IntoIterator<Item = DynamicValue>>(items: I) -> Self {
        DynamicValue::Sequence(items.into_iter().collect())
    }

    pub fn map<I: IntoIterator<Item = (DynamicValue, DynamicValue)>>(entries: I) -> Self {
        DynamicValue::Map(entries.into_iter().collect())
    }

    // ── Inspection ────────────────────────────────────────────────────────

    /// Shape name used in type-mismatch reports: `"record"`, `"variant"`,
    /// `"sequence"`, `"map"`, or the primitive kind name.
    pub fn shape_name(&self) -> &'static str {
        match self {
            DynamicValue::Primitive(p) => p.type_name(),
            DynamicValue::Record(_) => "record",
            DynamicValue::Variant(..) => "variant",
            DynamicValue::Sequence(_) => "sequence",
            DynamicValue::Map(_) => "map",
        }
    }

    pub fn as_primitive(&self) -> Option<&PrimitiveValue> {
        match self {
            DynamicValue::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&[(String, DynamicValue)]> {
        match self {
            DynamicValue::Record(fields) => Some(fields.as_slice()),
            _ => None,
        }
    }

    pub fn as_variant(&self) -> Option<(&str, &DynamicValue)> {
        match self {
            DynamicValue::Variant(case, payload) => Some((case.as_str(), payload.as_ref())),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[DynamicValue]> {
        match self {
            DynamicValue::Sequence(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(DynamicValue, DynamicValue)]> {
        match self {
            DynamicValue::Map(entries) => Some(entries.as_slice()),
            _ => None,
        }
    }

    /// First field named `name`, if this is a record.
    pub fn field(&self, name: &str) -> Option<&DynamicValue> {
        self.as_record()?
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Value stored under a structurally equal key, if this is a map.
    pub fn get_map_value(&self, key: &DynamicValue) -> Option<&DynamicValue> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

// ── Conversions ───────────────────────────────────────────────────────────

impl From<PrimitiveValue> for DynamicValue {
    fn from(p: PrimitiveValue) -> Self {
        DynamicValue::Primitive(p)
    }
}

macro_rules! impl_from_via_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for DynamicValue {
                fn from(v: $ty) -> Self {
                    DynamicValue::Primitive(PrimitiveValue::from(v))
                }
            }
        )*
    };
}

impl_from_via_primitive!(bool, i8, i16, i32, i64, f32, f64, char, String, &str);

impl From<Vec<DynamicValue>> for DynamicValue {
    fn from(items: Vec<DynamicValue>) -> Self {
        DynamicValue::Sequence(items)
    }
}

// ── Display ───────────────────────────────────────────────────────────────

impl fmt::Display for DynamicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynamicValue::Primitive(p) => write!(f, "{p}"),
            DynamicValue::Record(fields) => {
                if fields.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str(" }")
            }
            DynamicValue::Variant(case, payload) => write!(f, "{case}({payload})"),
            DynamicValue::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            DynamicValue::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k} => {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str, age: i32) -> DynamicValue {
        DynamicValue::record([
            ("name", DynamicValue::string(name)),
            ("age", DynamicValue::int(age)),
        ])
    }

    #[test]
    fn field_lookup() {
        let p = person("Alice", 30);
        assert_eq!(p.field("age"), Some(&DynamicValue::int(30)));
        assert_eq!(p.field("missing"), None);
        assert_eq!(DynamicValue::int(1).field("age"), None);
    }

    #[test]
    fn map_lookup_is_structural() {
        let m = DynamicValue::map(vec![
            (person("k", 1), DynamicValue::int(10)),
            (DynamicValue::string("a"), DynamicValue::int(20)),
        ]);
        assert_eq!(m.get_map_value(&person("k", 1)), Some(&DynamicValue::int(10)));
        assert_eq!(m.get_map_value(&DynamicValue::string("b")), None);
    }

    #[test]
    fn record_equality_is_order_sensitive() {
        let a = DynamicValue::record([("x", DynamicValue::int(1)), ("y", DynamicValue::int(2))]);
        let b = DynamicValue::record([("y", DynamicValue::int(2)), ("x", DynamicValue::int(1))]);
        assert_ne!(a, b);
    }

    #[test]
    fn shape_names() {
        assert_eq!(person("a", 1).shape_name(), "record");
        assert_eq!(DynamicValue::variant("Some", DynamicValue::int(1)).shape_name(), "variant");
        assert_eq!(DynamicValue::Sequence(Vec::new()).shape_name(), "sequence");
        assert_eq!(DynamicValue::Map(Vec::new()).shape_name(), "map");
        assert_eq!(DynamicValue::string("s").shape_name(), "string");
    }

    #[test]
    fn display() {
        let v = DynamicValue::record([
            ("name", DynamicValue::string("Bob")),
            ("tags", DynamicValue::sequence(vec![DynamicValue::int(1), DynamicValue::int(2)])),
            ("opt", DynamicValue::variant("Some", DynamicValue::long(3))),
            ("m", DynamicValue::map(vec![(DynamicValue::string("k"), DynamicValue::boolean(true))])),
        ]);
        assert_eq!(
            v.to_string(),
            r#"{ name: "Bob", tags: [1, 2], opt: Some(3L), m: {"k" => true} }"#
        );
        assert_eq!(DynamicValue::Record(Vec::new()).to_string(), "{}");
    }

    #[test]
    fn serde_roundtrip() {
        let v = DynamicValue::record([
            ("name", DynamicValue::string("Bob")),
            ("opt", DynamicValue::variant("None", DynamicValue::unit())),
            ("m", DynamicValue::map(vec![(DynamicValue::int(1), DynamicValue::double(2.5))])),
        ]);
        let json = serde_json::to_string(&v).unwrap();
        let back: DynamicValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
