//! Error types for the IPPcode19 front ends.

use ippcode_verifier::VerifyError;
use thiserror::Error;

/// Errors produced while assembling source text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// The first non-empty line is not `.IPPcode19`.
    #[error("line {line}: missing .IPPcode19 header")]
    MissingHeader { line: usize },

    /// An unrecognized opcode mnemonic was encountered.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// The operand count does not match the opcode signature.
    #[error("line {line}: {opcode} expects {expected} operand(s), found {found}")]
    OperandCount {
        line: usize,
        opcode: &'static str,
        expected: usize,
        found: usize,
    },

    /// A symbol operand without a `kind@` prefix.
    #[error("line {line}: malformed operand '{token}'")]
    MalformedOperand { line: usize, token: String },

    /// The operand grammar rejected the instruction.
    #[error("line {line}: {source}")]
    Invalid {
        line: usize,
        #[source]
        source: VerifyError,
    },
}

impl AsmError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AsmError::MissingHeader { .. } => 21,
            AsmError::UnknownOpcode { .. } | AsmError::OperandCount { .. } => 22,
            AsmError::MalformedOperand { .. } | AsmError::Invalid { .. } => 23,
        }
    }
}

/// Errors produced while reading the XML transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    /// The document is not well-formed XML.
    #[error("line {line}: malformed XML: {message}")]
    Malformed { line: usize, message: String },

    /// Well-formed XML that is not a valid program document.
    #[error("invalid program structure: {0}")]
    Structure(String),
}

impl XmlError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            XmlError::Malformed { .. } => 31,
            XmlError::Structure(_) => 32,
        }
    }
}
