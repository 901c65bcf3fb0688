use std::any::Any;
use std::fmt;

use thiserror::Error;

/// A generated value on its way into a target field.
pub enum Value {
    /// Reset the target to its zero value.
    Zero,
    Bool(bool),
    Int(i128),
    Float(f64),
    Text(String),
    /// Resize a sequence to this many default elements.
    Length(usize),
    /// Replace a sequence with these elements.
    List(Vec<Value>),
    /// Point an empty pointer at a fresh default value.
    Allocate,
    /// A ready-made value of the target's exact type.
    Opaque(Box<dyn Any + Send>),
}

impl Value {
    pub fn opaque<T: Any + Send>(value: T) -> Self {
        Value::Opaque(Box::new(value))
    }

    /// Unwraps an `Opaque` holding a `T`; anything else is handed back.
    pub fn downcast<T: Any>(self) -> Result<T, Value> {
        match self {
            Value::Opaque(boxed) => boxed.downcast::<T>().map(|value| *value).map_err(Value::Opaque),
            other => Err(other),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Zero => "zero",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Length(_) => "length",
            Value::List(_) => "list",
            Value::Allocate => "allocate",
            Value::Opaque(_) => "opaque",
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Value::Zero)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Zero => f.write_str("Zero"),
            Value::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            Value::Int(value) => f.debug_tuple("Int").field(value).finish(),
            Value::Float(value) => f.debug_tuple("Float").field(value).finish(),
            Value::Text(value) => f.debug_tuple("Text").field(value).finish(),
            Value::Length(value) => f.debug_tuple("Length").field(value).finish(),
            Value::List(values) => f.debug_tuple("List").field(values).finish(),
            Value::Allocate => f.write_str("Allocate"),
            Value::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(i128::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

/// Failure to store a generated value into a field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignError {
    #[error("cannot assign {found} value to {target}")]
    Mismatch {
        target: &'static str,
        found: &'static str,
    },
    #[error("value {value} out of range for {target}")]
    OutOfRange { value: i128, target: &'static str },
    #[error("cannot allocate {len} elements for {target}")]
    Capacity { len: usize, target: &'static str },
}

impl AssignError {
    pub fn mismatch(target: &'static str, found: &Value) -> Self {
        AssignError::Mismatch {
            target,
            found: found.kind_name(),
        }
    }
}
