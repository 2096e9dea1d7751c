//! String edit generation.
//!
//! Produces at most one delete followed by one insert covering the span
//! between the common prefix and the common suffix.

use crate::patch::StringOp;

use super::{common_prefix, common_suffix};

/// Returns the edits turning `old` into `new`, or `None` when the two
/// strings share neither a prefix nor a suffix (a plain replacement is
/// then no larger).
pub fn string_edit(old: &str, new: &str) -> Option<Vec<StringOp>> {
    let a: Vec<char> = old.chars().collect();
    let b: Vec<char> = new.chars().collect();
    let prefix = common_prefix(&a, &b);
    let suffix = common_suffix(&a[prefix..], &b[prefix..]);
    if prefix == 0 && suffix == 0 {
        return None;
    }
    let deleted = a.len() - prefix - suffix;
    let inserted: String = b[prefix..b.len() - suffix].iter().collect();
    let mut ops = Vec::with_capacity(2);
    if deleted > 0 {
        ops.push(StringOp::Delete { at: prefix, len: deleted });
    }
    if !inserted.is_empty() {
        ops.push(StringOp::Insert { at: prefix, text: inserted });
    }
    Some(ops)
}
