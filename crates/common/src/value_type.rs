//! Dynamic types of IPPcode19 values.

use crate::error::NameError;
use std::fmt;
use std::str::FromStr;

/// The dynamic type of an initialised variable slot or a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Signed 64-bit integer.
    Int,
    /// Boolean.
    Bool,
    /// Unicode string (escape sequences already decoded).
    String,
    /// The single value `nil`.
    Nil,
    /// IEEE 754 64-bit float. Only produced at runtime.
    Float,
}

/// All value types, in definition order.
pub const ALL_VALUE_TYPES: [ValueType; 5] = [
    ValueType::Int,
    ValueType::Bool,
    ValueType::String,
    ValueType::Nil,
    ValueType::Float,
];

impl ValueType {
    /// Returns the language-level name of this type.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Bool => "bool",
            ValueType::String => "string",
            ValueType::Nil => "nil",
            ValueType::Float => "float",
        }
    }

    /// Returns true if `READ` may produce this type.
    pub fn is_readable(&self) -> bool {
        matches!(self, ValueType::Int | ValueType::Bool | ValueType::String)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueType {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_VALUE_TYPES
            .iter()
            .find(|t| t.name() == s)
            .copied()
            .ok_or_else(|| NameError::Type(s.to_string()))
    }
}
