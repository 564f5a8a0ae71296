//! Structural equality and deep copy over plain data values.
//!
//! Change detection snapshots watched values with [`deep_clone`] and compares
//! them with [`deep_equals`]. Both operate on the closed set of scalars,
//! arrays and key-ordered objects; a function anywhere inside a value is an
//! explicit [`RtError::NotComparable`] instead of being silently dropped.

use crate::error::{RtError, RtResult};
use crate::value::Value;

/// Compares two values structurally.
///
/// `NaN` equals `NaN` so that a watched `NaN` does not look dirty on every pass.
///
/// # Examples
///
/// ```rust
/// use nglite::{Value, equality::deep_equals};
///
/// let a = Value::object([("xs", Value::from(vec![Value::from(1), Value::from(2)]))]);
/// let b = Value::object([("xs", Value::from(vec![Value::from(1), Value::from(2)]))]);
/// assert!(deep_equals(&a, &b).unwrap());
///
/// let f = Value::function(|_, _| Ok(Value::Undefined));
/// assert!(deep_equals(&f, &f).is_err());
/// ```
pub fn deep_equals(a: &Value, b: &Value) -> RtResult<bool> {
    match (a, b) {
        (Value::Function(_), _) | (_, Value::Function(_)) => Err(RtError::NotComparable("function")),
        (Value::Array(xs), Value::Array(ys)) => {
            // Walk both sides fully so a function anywhere is reported.
            let mut equal = xs.len() == ys.len();
            for (x, y) in xs.iter().zip(ys.iter()) {
                equal &= deep_equals(x, y)?;
            }
            if equal {
                Ok(true)
            } else {
                ensure_comparable(a)?;
                ensure_comparable(b)?;
                Ok(false)
            }
        }
        (Value::Object(xs), Value::Object(ys)) => {
            let mut equal = xs.len() == ys.len();
            for ((kx, x), (ky, y)) in xs.iter().zip(ys.iter()) {
                equal &= kx == ky && deep_equals(x, y)?;
            }
            if equal {
                Ok(true)
            } else {
                ensure_comparable(a)?;
                ensure_comparable(b)?;
                Ok(false)
            }
        }
        (Value::Number(x), Value::Number(y)) => Ok(x == y || (x.is_nan() && y.is_nan())),
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => Ok(true),
        (Value::Bool(x), Value::Bool(y)) => Ok(x == y),
        (Value::String(x), Value::String(y)) => Ok(x == y),
        _ => {
            ensure_comparable(a)?;
            ensure_comparable(b)?;
            Ok(false)
        }
    }
}

/// Copies a value so later mutation of the original cannot affect the copy.
pub fn deep_clone(value: &Value) -> RtResult<Value> {
    Ok(match value {
        Value::Function(_) => return Err(RtError::NotComparable("function")),
        Value::Array(items) => Value::Array(items.iter().map(deep_clone).collect::<RtResult<_>>()?),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), deep_clone(v)?)))
                .collect::<RtResult<_>>()?,
        ),
        scalar => scalar.clone(),
    })
}

/// Fails if the value contains a function at any depth.
pub fn ensure_comparable(value: &Value) -> RtResult<()> {
    match value {
        Value::Function(_) => Err(RtError::NotComparable("function")),
        Value::Array(items) => items.iter().try_for_each(ensure_comparable),
        Value::Object(map) => map.values().try_for_each(ensure_comparable),
        _ => Ok(()),
    }
}
