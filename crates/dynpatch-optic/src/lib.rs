//! Optics: symbolic paths into dynamic values.
//!
//! A [`DynamicOptic`] is an ordered list of [`Node`] steps. It renders to a
//! canonical, format-stable string used in error messages, and parses back
//! from that string.
//!
//! | step | rendering |
//! |---|---|
//! | root | `.` |
//! | `Field("name")` | `.name` |
//! | `Case("Some")` | `<Some>` |
//! | `AtIndex(3)` / `AtIndices([0,2])` | `[3]` / `[0,2]` |
//! | `AtMapKey("k")` / `AtMapKeys([1,2])` | `{"k"}` / `{1,2}` |
//! | `Elements` / `MapKeys` / `MapValues` / `Wrapped` | `[*]` / `{*:}` / `{*}` / `.~` |
//!
//! # Example
//!
//! ```
//! use dynpatch_optic::DynamicOptic;
//!
//! let path: DynamicOptic = ".orders[*]<Shipped>.total".parse().unwrap();
//! assert_eq!(path, DynamicOptic::root().field("orders").elements().case("Shipped").field("total"));
//! assert_eq!(path.to_string(), ".orders[*]<Shipped>.total");
//! ```

pub mod node;
pub mod optic;
pub mod parse;

pub use node::{is_identifier, Node};
pub use optic::DynamicOptic;
pub use parse::{parse_optic, OpticParseError};
