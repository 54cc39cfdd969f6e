//! IPPcode19 common types.
//!
//! This crate provides the data model shared by the loader, the validator
//! and the interpreter:
//!
//! - [`Opcode`]: the 38 opcodes and their operand signatures
//! - [`ValueType`]: the dynamic types (`int`, `bool`, `string`, `nil`, `float`)
//! - [`Value`]: runtime values
//! - [`RawInstruction`]: unvalidated transport records
//! - [`Instruction`] / [`Operand`]: validated instructions
//! - [`Program`]: validated instructions plus the label table
//!
//! # Dependencies
//!
//! This crate uses `thiserror` and has no other dependencies.

pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;
pub mod value;
pub mod value_type;

// Re-export commonly used types at the crate root.
pub use error::NameError;
pub use instruction::{FrameKind, Instruction, Operand, RawArg, RawInstruction, VarRef};
pub use opcode::{Opcode, ParamKind};
pub use program::Program;
pub use value::Value;
pub use value_type::ValueType;
