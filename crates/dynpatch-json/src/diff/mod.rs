//! JSON structural diff.
//!
//! Objects are diffed key by key, arrays and strings are aligned with an
//! LCS so that elements common to both sides are never touched. The result
//! always satisfies `diff(a, b).apply(a, Strict) == Ok(b)`.

pub mod lcs;

use serde_json::{Map, Number, Value};
use tracing::{debug, trace};

use crate::patch::apply::{add_numbers, as_integer, integer_number};
use crate::patch::{ArrayOp, JsonOperation, JsonPatch, JsonPatchOp, ObjectOp, StringOp};
use crate::path::{JsonPath, Segment};
use lcs::{common_prefix, common_suffix, gaps, lcs_pairs, Gap};

// ── Options ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonDiffOptions {
    /// Emit string edits instead of replacing changed strings.
    pub string_edits: bool,
    /// Largest LCS table (old length × new length, after trimming) the
    /// differ will build. Larger inputs are aligned by position.
    pub max_lcs_cells: usize,
}

impl Default for JsonDiffOptions {
    fn default() -> Self {
        Self { string_edits: true, max_lcs_cells: 4_000_000 }
    }
}

// ── Public API ────────────────────────────────────────────────────────────

/// Computes a patch turning `old` into `new`.
pub fn diff(old: &Value, new: &Value) -> JsonPatch {
    diff_with(old, new, &JsonDiffOptions::default())
}

pub fn diff_with(old: &Value, new: &Value, options: &JsonDiffOptions) -> JsonPatch {
    let mut differ = Differ { options, ops: Vec::new() };
    let mut path = JsonPath::root();
    differ.diff_at(&mut path, old, new);
    JsonPatch::from(differ.ops)
}

impl JsonPatch {
    pub fn diff(old: &Value, new: &Value) -> JsonPatch {
        diff(old, new)
    }
}

/// A delta that reproduces `new` exactly when added to `old`, down to the
/// float bit pattern.
fn number_delta(old: &Number, new: &Number) -> Option<Number> {
    let delta = match (as_integer(old), as_integer(new)) {
        (Some(a), Some(b)) => integer_number(b - a)?,
        _ => Number::from_f64(new.as_f64()? - old.as_f64()?)?,
    };
    let sum = add_numbers(old, &delta)?;
    let same_bits = sum.as_f64().map(f64::to_bits) == new.as_f64().map(f64::to_bits);
    (sum == *new && same_bits).then_some(delta)
}

/// Edits turning `old` into `new`, or `None` when the strings share nothing.
fn string_edits(old: &str, new: &str, max_cells: usize) -> Option<Vec<StringOp>> {
    let a: Vec<char> = old.chars().collect();
    let b: Vec<char> = new.chars().collect();
    let prefix = common_prefix(&a, &b);
    let suffix = common_suffix(&a[prefix..], &b[prefix..]);
    let old_mid = &a[prefix..a.len() - suffix];
    let new_mid = &b[prefix..b.len() - suffix];
    let pairs = lcs_pairs(old_mid, new_mid, max_cells).unwrap_or_default();
    if prefix == 0 && suffix == 0 && pairs.is_empty() {
        return None;
    }
    let mut edits = Vec::new();
    for gap in gaps(&pairs, old_mid.len(), new_mid.len()).iter().rev() {
        let at = prefix + gap.old_start;
        if gap.old_len() > 0 {
            edits.push(StringOp::Delete { at, len: gap.old_len() });
        }
        if gap.new_len() > 0 {
            edits.push(StringOp::Insert { at, text: new_mid[gap.new_start..gap.new_end].iter().collect() });
        }
    }
    Some(edits)
}

// ── Differ ────────────────────────────────────────────────────────────────

struct Differ<'o> {
    options: &'o JsonDiffOptions,
    ops: Vec<JsonPatchOp>,
}

impl Differ<'_> {
    fn emit(&mut self, path: &JsonPath, op: JsonOperation) {
        trace!(path = %path, op = op.op_name(), "json diff emitted op");
        self.ops.push(JsonPatchOp::new(path.clone(), op));
    }

    fn set(&mut self, path: &JsonPath, new: &Value) {
        self.emit(path, JsonOperation::Set { value: new.clone() });
    }

    fn descend(&mut self, path: &mut JsonPath, segment: Segment, old: &Value, new: &Value) {
        path.push(segment);
        self.diff_at(path, old, new);
        path.pop();
    }

    fn diff_at(&mut self, path: &mut JsonPath, old: &Value, new: &Value) {
        if old == new {
            return;
        }
        match (old, new) {
            (Value::Number(a), Value::Number(b)) => match number_delta(a, b) {
                Some(delta) => self.emit(path, JsonOperation::NumberDelta { delta }),
                None => self.set(path, new),
            },
            (Value::String(a), Value::String(b)) if self.options.string_edits => {
                match string_edits(a, b, self.options.max_lcs_cells) {
                    Some(edits) => self.emit(path, JsonOperation::StringEdit { edits }),
                    None => self.set(path, new),
                }
            }
            (Value::Object(a), Value::Object(b)) => self.diff_object(path, a, b),
            (Value::Array(a), Value::Array(b)) => self.diff_array(path, a, b),
            _ => self.set(path, new),
        }
    }

    /// Removes keep the remaining keys in order and adds append, so when
    /// that cannot reproduce `b`'s key order the object is replaced whole.
    fn diff_object(&mut self, path: &mut JsonPath, a: &Map<String, Value>, b: &Map<String, Value>) {
        let kept = a.keys().filter(|k| b.contains_key(*k));
        let added = b.keys().filter(|k| !a.contains_key(*k));
        if !kept.chain(added).eq(b.keys()) {
            self.emit(path, JsonOperation::Set { value: Value::Object(b.clone()) });
            return;
        }
        let mut edits: Vec<ObjectOp> = a
            .keys()
            .filter(|k| !b.contains_key(*k))
            .map(|k| ObjectOp::Remove { key: k.clone() })
            .collect();
        edits.extend(
            b.iter()
                .filter(|(k, _)| !a.contains_key(*k))
                .map(|(k, v)| ObjectOp::Add { key: k.clone(), value: v.clone() }),
        );
        if !edits.is_empty() {
            self.emit(path, JsonOperation::ObjectEdit { edits });
        }
        for (key, new) in b {
            if let Some(old) = a.get(key) {
                self.descend(path, Segment::Key(key.clone()), old, new);
            }
        }
    }

    /// Gaps are emitted right to left, so no op shifts the indices used by
    /// the ops after it.
    fn diff_array(&mut self, path: &mut JsonPath, a: &[Value], b: &[Value]) {
        let prefix = common_prefix(a, b);
        let suffix = common_suffix(&a[prefix..], &b[prefix..]);
        let old_mid = &a[prefix..a.len() - suffix];
        let new_mid = &b[prefix..b.len() - suffix];

        let pairs = match lcs_pairs(old_mid, new_mid, self.options.max_lcs_cells) {
            Some(pairs) => pairs,
            None => {
                debug!(
                    path = %path,
                    old_len = old_mid.len(),
                    new_len = new_mid.len(),
                    "array too large for LCS; aligning by position"
                );
                Vec::new()
            }
        };

        for gap in gaps(&pairs, old_mid.len(), new_mid.len()).iter().rev() {
            self.diff_gap(path, prefix, suffix, old_mid, new_mid, gap);
        }
    }

    /// Pairs the gap's elements by position, then deletes or inserts the
    /// excess.
    fn diff_gap(
        &mut self,
        path: &mut JsonPath,
        prefix: usize,
        suffix: usize,
        old_mid: &[Value],
        new_mid: &[Value],
        gap: &Gap,
    ) {
        let paired = gap.old_len().min(gap.new_len());
        let at = prefix + gap.old_start + paired;
        if gap.old_len() > paired {
            let edit = ArrayOp::Delete { at, count: gap.old_len() - paired };
            self.emit(path, JsonOperation::ArrayEdit { edits: vec![edit] });
        } else if gap.new_len() > paired {
            let values = new_mid[gap.new_start + paired..gap.new_end].to_vec();
            let at_end = suffix == 0 && gap.old_end == old_mid.len();
            let edit = if at_end { ArrayOp::Append { values } } else { ArrayOp::Insert { at, values } };
            self.emit(path, JsonOperation::ArrayEdit { edits: vec![edit] });
        }
        for t in (0..paired).rev() {
            let old = &old_mid[gap.old_start + t];
            let new = &new_mid[gap.new_start + t];
            self.descend(path, Segment::Index(prefix + gap.old_start + t), old, new);
        }
    }
}
