//! Runtime errors for the IPPcode19 interpreter.
//!
//! Every error carries the order (`at`) of the instruction that failed.
//! Execution stops at the first error; output already written stands.

use ippcode_common::{FrameKind, VarRef};
use thiserror::Error;

/// Errors that occur during program execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// TF accessed while absent, or LF with an empty local stack.
    #[error("instruction {at}: frame {frame} does not exist")]
    FrameAbsent { at: usize, frame: FrameKind },

    /// DEFVAR on a name already present in the frame.
    #[error("instruction {at}: variable {var} already declared")]
    VariableRedeclared { at: usize, var: VarRef },

    /// Variable not declared in its frame.
    #[error("instruction {at}: variable {var} is not defined")]
    VariableUndefined { at: usize, var: VarRef },

    /// Variable declared but never assigned.
    #[error("instruction {at}: variable {var} is uninitialized")]
    ValueUninitialized { at: usize, var: VarRef },

    /// Jump or call to a label with no LABEL definition.
    #[error("instruction {at}: label '{label}' is not defined")]
    LabelUndefined { at: usize, label: String },

    /// Operand types do not fit the opcode.
    #[error("instruction {at}: type mismatch: {detail}")]
    TypeMismatch { at: usize, detail: String },

    /// IDIV by 0 or DIV by 0.0.
    #[error("instruction {at}: division by zero")]
    DivisionByZero { at: usize },

    /// EXIT operand outside [0, 49].
    #[error("instruction {at}: exit code {code} is out of range 0..=49")]
    InvalidExitCode { at: usize, code: i64 },

    /// String index outside [0, length).
    #[error("instruction {at}: index {index} out of range (length {length})")]
    IndexOutOfRange { at: usize, index: i64, length: usize },

    /// INT2CHAR argument is not a Unicode scalar value.
    #[error("instruction {at}: {code} is not a valid character code")]
    InvalidCodePoint { at: usize, code: i64 },

    /// SETCHAR with an empty replacement string.
    #[error("instruction {at}: empty replacement string")]
    EmptyReplacement { at: usize },

    /// RETURN with an empty call stack.
    #[error("instruction {at}: return with empty call stack")]
    MissingReturnTarget { at: usize },

    /// POPS with an empty data stack.
    #[error("instruction {at}: pops from empty data stack")]
    EmptyDataStack { at: usize },

    /// Operands do not match the opcode signature. Unreachable for
    /// programs built by the verifier.
    #[error("instruction {at}: malformed instruction")]
    MalformedInstruction { at: usize },

    /// Reading input or writing output failed.
    #[error("instruction {at}: i/o error: {message}")]
    Io { at: usize, message: String },
}

impl RuntimeError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            RuntimeError::VariableRedeclared { .. } | RuntimeError::LabelUndefined { .. } => 52,
            RuntimeError::TypeMismatch { .. } => 53,
            RuntimeError::VariableUndefined { .. } => 54,
            RuntimeError::FrameAbsent { .. } => 55,
            RuntimeError::ValueUninitialized { .. }
            | RuntimeError::MissingReturnTarget { .. }
            | RuntimeError::EmptyDataStack { .. } => 56,
            RuntimeError::DivisionByZero { .. } | RuntimeError::InvalidExitCode { .. } => 57,
            RuntimeError::IndexOutOfRange { .. }
            | RuntimeError::InvalidCodePoint { .. }
            | RuntimeError::EmptyReplacement { .. } => 58,
            RuntimeError::MalformedInstruction { .. } => 32,
            RuntimeError::Io { .. } => 99,
        }
    }

    /// Order of the instruction that failed.
    pub fn at(&self) -> usize {
        match self {
            RuntimeError::FrameAbsent { at, .. }
            | RuntimeError::VariableRedeclared { at, .. }
            | RuntimeError::VariableUndefined { at, .. }
            | RuntimeError::ValueUninitialized { at, .. }
            | RuntimeError::LabelUndefined { at, .. }
            | RuntimeError::TypeMismatch { at, .. }
            | RuntimeError::DivisionByZero { at }
            | RuntimeError::InvalidExitCode { at, .. }
            | RuntimeError::IndexOutOfRange { at, .. }
            | RuntimeError::InvalidCodePoint { at, .. }
            | RuntimeError::EmptyReplacement { at }
            | RuntimeError::MissingReturnTarget { at }
            | RuntimeError::EmptyDataStack { at }
            | RuntimeError::MalformedInstruction { at }
            | RuntimeError::Io { at, .. } => *at,
        }
    }
}
