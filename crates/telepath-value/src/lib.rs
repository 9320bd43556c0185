//! Live values for telepath unpacking.
//!
//! This crate holds the types that sit on both sides of an adapter rule:
//!
//! - [`Value`]: what the reconstructor hands back to callers, and what
//!   adapter rules receive as their (already reconstructed) arguments
//! - [`Object`]: the capability set of an adapter-built instance
//! - [`FromArgs`]: the adapter contract, usually derived with
//!   `#[derive(Adapter)]` (behind the `derive` feature)
//! - [`FromValue`] / [`ConversionError`]: typed extraction of arguments
//!
//! # Example
//!
//! ```ignore
//! use std::fmt;
//! use telepath_value::{Adapter, FromArgs, Value};
//!
//! #[derive(Debug, Adapter)]
//! #[telepath(tag = "Point")]
//! struct Point {
//!     x: i64,
//!     y: i64,
//! }
//!
//! impl fmt::Display for Point {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         write!(f, "({}, {})", self.x, self.y)
//!     }
//! }
//!
//! let point = Point::from_args(vec![Value::from(1), Value::from(2)])?;
//! assert_eq!(point.to_string(), "(1, 2)");
//! ```

mod conversion;
mod value;

pub use conversion::{check_arity, next_arg, ConversionError, FromArgs, FromValue};
pub use value::{AsAny, Map, Number, Object, Value};

#[cfg(feature = "derive")]
pub use telepath_derive::Adapter;
