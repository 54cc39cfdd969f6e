//! IPPcode19 verifier: turns raw instruction records into a [`Program`].
//!
//! Validation runs once, before anything executes, and stops at the first
//! violation:
//!
//! 1. **Operands**: opcode lookup, signature (arity and kinds), lexical
//!    grammar of each operand, escape decoding of string literals
//! 2. **Order**: order numbers form exactly 1..=N
//! 3. **Labels**: label table pre-pass, duplicate definitions rejected
//!
//! # Usage
//!
//! ```
//! use ippcode_common::{RawArg, RawInstruction};
//! use ippcode_verifier::verify;
//!
//! let raw = vec![
//!     RawInstruction::new(1, "DEFVAR", vec![RawArg::new("var", "GF@x")]),
//!     RawInstruction::new(2, "WRITE", vec![RawArg::new("string", "hi\\010")]),
//! ];
//!
//! let program = verify(&raw).unwrap();
//! assert_eq!(program.len(), 2);
//! ```

pub mod error;
pub mod grammar;
pub mod labels;
pub mod operands;
pub mod order;

pub use error::VerifyError;
pub use labels::build_label_table;
pub use operands::check_instruction;

use ippcode_common::{Instruction, Program, RawInstruction};
use tracing::debug;

/// Validate every instruction and the ordering, without building labels.
///
/// Returns the instructions sorted by order.
pub fn validate_instructions(raw: &[RawInstruction]) -> Result<Vec<Instruction>, VerifyError> {
    let checked = raw
        .iter()
        .map(|r| check_instruction(r).map(|instr| (r.order, instr)))
        .collect::<Result<Vec<_>, _>>()?;

    order::check_order(checked)
}

/// Validate a raw instruction list and build the program model.
///
/// # Errors
///
/// Returns the first [`VerifyError`] found.
pub fn verify(raw: &[RawInstruction]) -> Result<Program, VerifyError> {
    let instructions = validate_instructions(raw)?;
    let labels = build_label_table(&instructions)?;
    debug!(
        instructions = instructions.len(),
        labels = labels.len(),
        "program verified"
    );
    Ok(Program::new(instructions, labels))
}
