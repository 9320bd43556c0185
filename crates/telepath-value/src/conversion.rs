//! Typed extraction of adapter arguments

use std::sync::Arc;

use thiserror::Error;

use crate::value::{Map, Object, Value};

/// Failure to turn reconstructed arguments into an adapter's fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("expected {expected} argument(s), got {got}")]
    WrongArity { expected: usize, got: usize },

    #[error("missing argument {0}")]
    MissingIndex(usize),

    #[error("argument {0}: {1}")]
    IndexError(usize, Box<ConversionError>),

    #[error("{0}")]
    Custom(String),
}

impl ConversionError {
    pub fn custom(message: impl Into<String>) -> Self {
        ConversionError::Custom(message.into())
    }

    fn mismatch(expected: &str, got: &Value) -> Self {
        ConversionError::TypeMismatch {
            expected: expected.to_string(),
            got: got.kind().to_string(),
        }
    }
}

/// The adapter contract: how a tagged wire node becomes an instance.
///
/// `from_args` receives the node's arguments in wire order, already
/// reconstructed. It must not keep state between calls.
pub trait FromArgs: Object + Sized {
    /// Tag this type is registered under.
    const TAG: &'static str;

    fn from_args(args: Vec<Value>) -> Result<Self, ConversionError>;
}

/// Fail unless exactly `expected` arguments were supplied.
pub fn check_arity(args: &[Value], expected: usize) -> Result<(), ConversionError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ConversionError::WrongArity {
            expected,
            got: args.len(),
        })
    }
}

/// Take the next positional argument and convert it.
pub fn next_arg<T: FromValue>(
    args: &mut impl Iterator<Item = Value>,
    index: usize,
) -> Result<T, ConversionError> {
    let value = args.next().ok_or(ConversionError::MissingIndex(index))?;
    T::from_value(value).map_err(|e| ConversionError::IndexError(index, Box::new(e)))
}

// ============================================================================
// FromValue
// ============================================================================

/// Conversion from a reconstructed value into a Rust type.
pub trait FromValue: Sized {
    fn from_value(v: Value) -> Result<Self, ConversionError>;
}

impl FromValue for Value {
    fn from_value(v: Value) -> Result<Self, ConversionError> {
        Ok(v)
    }
}

impl FromValue for bool {
    fn from_value(v: Value) -> Result<Self, ConversionError> {
        v.as_bool().ok_or_else(|| ConversionError::mismatch("bool", &v))
    }
}

impl FromValue for String {
    fn from_value(v: Value) -> Result<Self, ConversionError> {
        match v {
            Value::String(s) => Ok(s),
            other => Err(ConversionError::mismatch("string", &other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(v: Value) -> Result<Self, ConversionError> {
        v.as_i64().ok_or_else(|| ConversionError::mismatch("i64", &v))
    }
}

impl FromValue for u64 {
    fn from_value(v: Value) -> Result<Self, ConversionError> {
        v.as_u64().ok_or_else(|| ConversionError::mismatch("u64", &v))
    }
}

impl FromValue for i32 {
    fn from_value(v: Value) -> Result<Self, ConversionError> {
        v.as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| ConversionError::mismatch("i32", &v))
    }
}

impl FromValue for u32 {
    fn from_value(v: Value) -> Result<Self, ConversionError> {
        v.as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| ConversionError::mismatch("u32", &v))
    }
}

/// Accepts integers as well as floats.
impl FromValue for f64 {
    fn from_value(v: Value) -> Result<Self, ConversionError> {
        v.as_f64().ok_or_else(|| ConversionError::mismatch("f64", &v))
    }
}

/// `null` converts to `None`.
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(v: Value) -> Result<Self, ConversionError> {
        match v {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(v: Value) -> Result<Self, ConversionError> {
        match v {
            Value::List(items) => items
                .iter()
                .cloned()
                .enumerate()
                .map(|(i, item)| {
                    T::from_value(item).map_err(|e| ConversionError::IndexError(i, Box::new(e)))
                })
                .collect(),
            other => Err(ConversionError::mismatch("list", &other)),
        }
    }
}

impl FromValue for Map {
    fn from_value(v: Value) -> Result<Self, ConversionError> {
        match v {
            Value::Map(entries) => Ok(Arc::unwrap_or_clone(entries)),
            other => Err(ConversionError::mismatch("map", &other)),
        }
    }
}

/// Keeps the shared instance; use this for arguments that are themselves
/// adapter-built objects.
impl FromValue for Arc<dyn Object> {
    fn from_value(v: Value) -> Result<Self, ConversionError> {
        match v {
            Value::Object(object) => Ok(object),
            other => Err(ConversionError::mismatch("object", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_narrow_with_range_checks() {
        assert_eq!(i32::from_value(Value::from(7)), Ok(7));
        assert!(i32::from_value(Value::from(i64::MAX)).is_err());
        assert!(u32::from_value(Value::from(-1)).is_err());
        assert_eq!(f64::from_value(Value::from(2)), Ok(2.0));
    }

    #[test]
    fn option_maps_null_to_none() {
        assert_eq!(Option::<String>::from_value(Value::Null), Ok(None));
        assert_eq!(
            Option::<String>::from_value(Value::from("x")),
            Ok(Some("x".to_string()))
        );
    }

    #[test]
    fn list_errors_carry_the_element_index() {
        let value = Value::from(vec![Value::from(1), Value::from("two")]);
        let err = Vec::<i64>::from_value(value).unwrap_err();
        assert_eq!(
            err,
            ConversionError::IndexError(
                1,
                Box::new(ConversionError::TypeMismatch {
                    expected: "i64".to_string(),
                    got: "string".to_string(),
                })
            )
        );
        assert_eq!(err.to_string(), "argument 1: expected i64, got string");
    }

    #[test]
    fn next_arg_reports_missing_positions() {
        let mut args = vec![Value::from("only")].into_iter();
        let first: String = next_arg(&mut args, 0).unwrap();
        assert_eq!(first, "only");
        let second = next_arg::<String>(&mut args, 1);
        assert_eq!(second, Err(ConversionError::MissingIndex(1)));
    }

    #[test]
    fn arity_must_match_exactly() {
        assert!(check_arity(&[Value::Null], 1).is_ok());
        assert_eq!(
            check_arity(&[], 1),
            Err(ConversionError::WrongArity { expected: 1, got: 0 })
        );
    }
}
