//! Schema-free dynamic values.
//!
//! A [`DynamicValue`] is a recursive tree of primitives, records, variants,
//! sequences and maps. It is the interchange representation consumed and
//! produced by the path, patch and diff layers.
//!
//! # Example
//!
//! ```
//! use dynpatch_value::{DynamicValue, PrimitiveValue};
//!
//! let person = DynamicValue::record([
//!     ("name", DynamicValue::string("Alice")),
//!     ("age", DynamicValue::int(30)),
//! ]);
//! assert_eq!(person.field("age"), Some(&DynamicValue::Primitive(PrimitiveValue::Int(30))));
//! assert_eq!(person.to_string(), r#"{ name: "Alice", age: 30 }"#);
//! ```

pub mod primitive;
pub mod temporal;
pub mod value;

pub use primitive::PrimitiveValue;
pub use temporal::{serde_time_delta, MonthDay, OffsetTime, Period, YearMonth, ZonedDateTime};
pub use value::DynamicValue;
