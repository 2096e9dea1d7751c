//! Patch algebra and structural diff for JSON documents.
//!
//! The JSON counterpart of `dynpatch`: the same laws (monoid under
//! concatenation, `diff(a, b).apply(a) == Ok(b)`, empty self-diff, Strict
//! and Lenient modes) over [`serde_json::Value`], with array and string
//! diffs aligned by longest common subsequence.
//!
//! # Example
//!
//! ```
//! use dynpatch_json::{diff, PatchMode};
//! use serde_json::json;
//!
//! let old = json!({"tags": [1, 2, 3, 4]});
//! let new = json!({"tags": [1, 3, 4, 5]});
//! let patch = diff(&old, &new);
//! assert_eq!(patch.to_string(), "\"/tags\" append [5]\n\"/tags\" delete@1 x1");
//! assert_eq!(patch.apply(&old, PatchMode::Strict).unwrap(), new);
//! ```

pub mod diff;
pub mod patch;
pub mod path;

pub use diff::{diff, diff_with, JsonDiffOptions};
pub use patch::{
    apply_patch, ArrayOp, JsonOperation, JsonPatch, JsonPatchError, JsonPatchOp, ObjectOp, PatchMode, StringOp,
};
pub use path::{JsonPath, Segment};
