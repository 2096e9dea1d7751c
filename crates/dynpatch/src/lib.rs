//! Path-addressed patches over dynamic values.
//!
//! A [`DynamicPatch`] is an ordered list of `(path, operation)` pairs that
//! rewrites a [`DynamicValue`] into another. Patches compose by
//! concatenation, apply in [`PatchMode::Strict`] or [`PatchMode::Lenient`],
//! and can be computed from two values with [`diff`].
//!
//! # Example
//!
//! ```
//! use dynpatch::{diff, DynamicValue, PatchMode};
//!
//! let old = DynamicValue::record([
//!     ("name", DynamicValue::string("Alice")),
//!     ("age", DynamicValue::int(30)),
//! ]);
//! let new = DynamicValue::record([
//!     ("name", DynamicValue::string("Alice")),
//!     ("age", DynamicValue::int(31)),
//! ]);
//!
//! let patch = diff(&old, &new);
//! assert_eq!(patch.to_string(), ".age delta 1");
//! assert_eq!(patch.apply(&old, PatchMode::Strict).unwrap(), new);
//! ```

pub mod diff;
pub mod patch;

pub use dynpatch_optic as optic;
pub use dynpatch_value as value;

pub use diff::{diff, diff_with, DiffOptions};
pub use dynpatch_optic::{DynamicOptic, Node};
pub use dynpatch_value::{DynamicValue, PrimitiveValue};
pub use patch::{
    apply_patch, DynamicPatch, DynamicPatchOp, MapOp, Operation, PatchError, PatchMode, PrimitiveOp, SeqOp,
    StringOp,
};
