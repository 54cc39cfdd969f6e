//! Validation errors for IPPcode19 programs.
//!
//! Validation is fail-fast: the first violation found is returned and no
//! partial program is produced. Every error carries the `order` of the
//! offending instruction where one exists.

use ippcode_common::{Opcode, ParamKind};
use thiserror::Error;

/// Errors found while validating a raw instruction list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    // --- Per-instruction ---
    /// Opcode name is not in the instruction set.
    #[error("instruction {order}: unknown opcode '{opcode}'")]
    UnknownOpcode { order: i64, opcode: String },

    /// Wrong number of operands for the opcode.
    #[error("instruction {order}: {opcode} expects {expected} operand(s), found {found}")]
    OperandCount {
        order: i64,
        opcode: Opcode,
        expected: usize,
        found: usize,
    },

    /// Operand kind tag does not fit the signature slot.
    #[error("instruction {order}: operand {position} should be {expected}, found '{found}'")]
    OperandKind {
        order: i64,
        position: usize,
        expected: ParamKind,
        found: String,
    },

    /// Operand text does not match the lexical grammar of its kind.
    #[error("instruction {order}: malformed {kind} operand {position}: '{text}'")]
    MalformedOperand {
        order: i64,
        position: usize,
        kind: String,
        text: String,
    },

    // --- Whole program ---
    /// Order number below 1.
    #[error("invalid instruction order {order}")]
    InvalidOrder { order: i64 },

    /// Two instructions share an order number.
    #[error("duplicate instruction order {order}")]
    DuplicateOrder { order: i64 },

    /// Order numbers skip a value.
    #[error("instruction order is not contiguous: missing {missing}")]
    OrderGap { missing: i64 },

    /// A label is defined twice.
    #[error("instruction {order}: label '{label}' already exists")]
    DuplicateLabel { order: i64, label: String },
}

impl VerifyError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            VerifyError::DuplicateLabel { .. } => 52,
            _ => 32,
        }
    }
}
