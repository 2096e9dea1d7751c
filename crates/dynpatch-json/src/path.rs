//! Paths into JSON documents.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of a [`JsonPath`]. Serializes as a bare string or integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    Index(usize),
    Key(String),
}

impl From<usize> for Segment {
    fn from(i: usize) -> Self {
        Segment::Index(i)
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

/// Escapes a JSON Pointer reference token (`~` → `~0`, `/` → `~1`).
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// A path of object keys and array indices. Renders as an RFC 6901 JSON
/// Pointer; the root renders as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn root() -> Self {
        Self { segments: Vec::new() }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(Segment::Key(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(Segment::Index(index));
        self
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn pop(&mut self) -> Option<Segment> {
        self.segments.pop()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The first `len` segments.
    pub fn prefix(&self, len: usize) -> Self {
        Self { segments: self.segments[..len.min(self.segments.len())].to_vec() }
    }

    pub fn to_pointer(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Index(i) => write!(f, "/{i}")?,
                Segment::Key(key) => write!(f, "/{}", escape_component(key))?,
            }
        }
        Ok(())
    }
}

impl FromIterator<Segment> for JsonPath {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self { segments: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_pointer() {
        assert_eq!(JsonPath::root().to_string(), "");
        let p = JsonPath::root().key("users").index(0).key("a/b~c");
        assert_eq!(p.to_pointer(), "/users/0/a~1b~0c");
        assert_eq!(p.prefix(1), JsonPath::root().key("users"));
    }

    #[test]
    fn serializes_as_mixed_array() {
        let p = JsonPath::root().key("a").index(2);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"["a",2]"#);
        let back: JsonPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn numeric_looking_keys_stay_keys() {
        let p: JsonPath = serde_json::from_str(r#"["0", 0]"#).unwrap();
        assert_eq!(p.segments(), &[Segment::Key("0".into()), Segment::Index(0)]);
    }
}
