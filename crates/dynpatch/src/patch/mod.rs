//! Patch representation and application.

pub mod apply;
pub mod navigate;
pub mod types;

pub use apply::{apply_op, apply_patch};
pub use navigate::{for_each_target_mut, select};
pub use types::*;
