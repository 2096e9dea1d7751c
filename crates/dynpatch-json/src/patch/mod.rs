//! JSON patch representation and application.

pub mod apply;
pub mod types;

pub use apply::{apply_op, apply_patch, resolve};
pub use types::*;
