//! Dynamically typed SQL values.
//!
//! Every literal that reaches the compiler travels as a [`Value`] and is bound
//! as a parameter; values are never rendered into SQL text.

use crate::error::RelqError;

/// A SQL value
#[derive(Debug, Clone, PartialEq, PartialOrd, Default)]
pub enum Value {
    /// NULL value
    #[default]
    Null,
    /// Integer value (i64)
    Integer(i64),
    /// Real value (f64)
    Real(f64),
    /// Text value
    Text(String),
    /// Blob value
    Blob(Vec<u8>),
}

impl Value {
    /// Returns true if this value is NULL.
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the integer value if this is an INTEGER.
    #[inline]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the real value if this is a REAL.
    #[inline]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the text value if this is TEXT.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns the blob value if this is BLOB.
    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(value) => Some(value.as_slice()),
            _ => None,
        }
    }

    /// Convert this value to a Rust type using the [`FromValue`] trait.
    ///
    /// # Example
    /// ```
    /// use relq_core::Value;
    ///
    /// let n: i64 = Value::Integer(42).convert().unwrap();
    /// assert_eq!(n, 42);
    /// ```
    pub fn convert<T: FromValue>(&self) -> Result<T, RelqError> {
        T::from_value(self)
    }

    /// Short name of the storage class, used in mapping errors.
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INTEGER",
            Value::Real(_) => "REAL",
            Value::Text(_) => "TEXT",
            Value::Blob(_) => "BLOB",
        }
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => write!(f, "'{s}'"),
            Value::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

//------------------------------------------------------------------------------
// Into Value
//------------------------------------------------------------------------------

macro_rules! impl_from_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Value::Integer(i64::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f32> for Value {
    #[inline]
    fn from(value: f32) -> Self {
        Value::Real(f64::from(value))
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&String> for Value {
    #[inline]
    fn from(value: &String) -> Self {
        Value::Text(value.clone())
    }
}

impl From<Vec<u8>> for Value {
    #[inline]
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<&[u8]> for Value {
    #[inline]
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<&Value> for Value {
    #[inline]
    fn from(value: &Value) -> Self {
        value.clone()
    }
}

//------------------------------------------------------------------------------
// FromValue
//------------------------------------------------------------------------------

/// Reads a Rust type back out of a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, RelqError>;
}

fn mismatch<T>(expected: &str, value: &Value) -> Result<T, RelqError> {
    Err(RelqError::Mapping(format!(
        "expected {expected}, found {}",
        value.kind()
    )))
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, RelqError> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, RelqError> {
        match value {
            Value::Integer(i) => Ok(*i),
            other => mismatch("INTEGER", other),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self, RelqError> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|e| RelqError::Mapping(e.to_string()))
    }
}

impl FromValue for u64 {
    fn from_value(value: &Value) -> Result<Self, RelqError> {
        let wide = i64::from_value(value)?;
        u64::try_from(wide).map_err(|e| RelqError::Mapping(e.to_string()))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, RelqError> {
        match value {
            Value::Real(r) => Ok(*r),
            #[allow(clippy::cast_precision_loss)]
            Value::Integer(i) => Ok(*i as f64),
            other => mismatch("REAL", other),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, RelqError> {
        match value {
            Value::Integer(i) => Ok(*i != 0),
            other => mismatch("INTEGER (boolean)", other),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, RelqError> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            other => mismatch("TEXT", other),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self, RelqError> {
        match value {
            Value::Blob(b) => Ok(b.clone()),
            other => mismatch("BLOB", other),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, RelqError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
