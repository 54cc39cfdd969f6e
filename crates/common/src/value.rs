//! Runtime value representation for the IPPcode19 interpreter.
//!
//! Values are what live in initialised variable slots and on the data
//! stack. An uninitialised slot holds no `Value` at all; that state is
//! modelled by the frame store, not here.

use crate::value_type::ValueType;
use std::fmt;

/// A typed runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    /// Signed 64-bit integer.
    Int(i64),
    /// Boolean value.
    Bool(bool),
    /// String with all escape sequences already decoded.
    Str(String),
    /// The `nil` value.
    Nil,
    /// 64-bit float, produced by `INT2FLOAT` and `DIV`.
    Float(f64),
}

// Floats compare by bit pattern so that Value stays Eq. The interpreter
// never produces NaN (division by zero is rejected before it happens).
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Value {
    /// Returns the dynamic type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::Bool(_) => ValueType::Bool,
            Value::Str(_) => ValueType::String,
            Value::Nil => ValueType::Nil,
            Value::Float(_) => ValueType::Float,
        }
    }

    /// The default value `READ` substitutes for missing or unparsable input.
    pub fn default_for(value_type: ValueType) -> Value {
        match value_type {
            ValueType::Int => Value::Int(0),
            ValueType::Bool => Value::Bool(false),
            ValueType::String => Value::Str(String::new()),
            ValueType::Nil => Value::Nil,
            ValueType::Float => Value::Float(0.0),
        }
    }
}

/// Formats the value the way `WRITE` prints it: `nil` prints nothing.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => f.write_str(s),
            Value::Nil => Ok(()),
            Value::Float(x) => write!(f, "{x}"),
        }
    }
}
