//! Opcode definitions for the IPPcode19 instruction set.
//!
//! The opcode set is closed: every instruction the loader accepts maps to
//! exactly one [`Opcode`] variant, and every variant carries a fixed operand
//! signature (see [`Opcode::params`]).

use crate::error::NameError;
use std::fmt;
use std::str::FromStr;

/// Syntactic role of one operand position in an opcode signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// A variable reference, `FRAME@name`.
    Var,
    /// A variable reference or a typed literal.
    Symb,
    /// A label name.
    Label,
    /// A type name (`int`, `string` or `bool`).
    Type,
}

impl ParamKind {
    /// Human-readable name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ParamKind::Var => "var",
            ParamKind::Symb => "symb",
            ParamKind::Label => "label",
            ParamKind::Type => "type",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifies the operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Frames and calls
    /// Copy a symbol into a variable.
    Move,
    /// Replace the temporary frame with a fresh, empty one.
    CreateFrame,
    /// Move the temporary frame onto the local frame stack.
    PushFrame,
    /// Move the top local frame into the temporary slot.
    PopFrame,
    /// Declare a variable in a frame.
    DefVar,
    /// Push the return position and jump to a label.
    Call,
    /// Pop the return position and jump to it.
    Return,

    // Data stack
    /// Push a symbol onto the data stack.
    PushS,
    /// Pop the data stack into a variable.
    PopS,

    // Arithmetic
    /// Integer addition.
    Add,
    /// Integer subtraction.
    Sub,
    /// Integer multiplication.
    Mul,
    /// Float division.
    Div,
    /// Integer (floor) division.
    IDiv,
    /// Convert an int to a float.
    Int2Float,
    /// Convert a float to an int, truncating toward zero.
    Float2Int,

    // Relational and boolean
    /// Less-than.
    Lt,
    /// Greater-than.
    Gt,
    /// Equality. The only comparison that accepts `nil`.
    Eq,
    /// Boolean conjunction.
    And,
    /// Boolean disjunction.
    Or,
    /// Boolean negation.
    Not,

    // Conversions and strings
    /// Code point to one-character string.
    Int2Char,
    /// Code point of the character at an index.
    Stri2Int,
    /// Read one line of input, coerced to a type.
    Read,
    /// Print a symbol to the output sink.
    Write,
    /// String concatenation.
    Concat,
    /// String length in characters.
    StrLen,
    /// One-character string at an index.
    GetChar,
    /// Replace the character at an index.
    SetChar,
    /// Dynamic type name of a symbol.
    Type,

    // Control flow
    /// Label definition. No-op at runtime.
    Label,
    /// Unconditional jump.
    Jump,
    /// Jump if two symbols are equal.
    JumpIfEq,
    /// Jump if two symbols are not equal.
    JumpIfNeq,
    /// Terminate with an exit code in `0..=49`.
    Exit,

    // Debugging
    /// Print a symbol to the diagnostic sink.
    DPrint,
    /// Dump interpreter state to the diagnostic sink.
    Break,
}

/// All opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 38] = [
    Opcode::Move,
    Opcode::CreateFrame,
    Opcode::PushFrame,
    Opcode::PopFrame,
    Opcode::DefVar,
    Opcode::Call,
    Opcode::Return,
    Opcode::PushS,
    Opcode::PopS,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::IDiv,
    Opcode::Int2Float,
    Opcode::Float2Int,
    Opcode::Lt,
    Opcode::Gt,
    Opcode::Eq,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Int2Char,
    Opcode::Stri2Int,
    Opcode::Read,
    Opcode::Write,
    Opcode::Concat,
    Opcode::StrLen,
    Opcode::GetChar,
    Opcode::SetChar,
    Opcode::Type,
    Opcode::Label,
    Opcode::Jump,
    Opcode::JumpIfEq,
    Opcode::JumpIfNeq,
    Opcode::Exit,
    Opcode::DPrint,
    Opcode::Break,
];

use ParamKind::{Label as L, Symb as S, Type as T, Var as V};

impl Opcode {
    /// Returns the canonical (uppercase) name of this opcode.
    pub fn name(&self) -> &'static str {
        match self {
            Opcode::Move => "MOVE",
            Opcode::CreateFrame => "CREATEFRAME",
            Opcode::PushFrame => "PUSHFRAME",
            Opcode::PopFrame => "POPFRAME",
            Opcode::DefVar => "DEFVAR",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::PushS => "PUSHS",
            Opcode::PopS => "POPS",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::IDiv => "IDIV",
            Opcode::Int2Float => "INT2FLOAT",
            Opcode::Float2Int => "FLOAT2INT",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Int2Char => "INT2CHAR",
            Opcode::Stri2Int => "STRI2INT",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Concat => "CONCAT",
            Opcode::StrLen => "STRLEN",
            Opcode::GetChar => "GETCHAR",
            Opcode::SetChar => "SETCHAR",
            Opcode::Type => "TYPE",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfNeq => "JUMPIFNEQ",
            Opcode::Exit => "EXIT",
            Opcode::DPrint => "DPRINT",
            Opcode::Break => "BREAK",
        }
    }

    /// Look up an opcode by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Opcode> {
        ALL_OPCODES
            .iter()
            .find(|op| op.name().eq_ignore_ascii_case(name))
            .copied()
    }

    /// The operand signature of this opcode, in operand order.
    pub fn params(&self) -> &'static [ParamKind] {
        match self {
            Opcode::CreateFrame
            | Opcode::PushFrame
            | Opcode::PopFrame
            | Opcode::Return
            | Opcode::Break => &[],

            Opcode::DefVar | Opcode::PopS => &[V],
            Opcode::Call | Opcode::Label | Opcode::Jump => &[L],
            Opcode::PushS | Opcode::Write | Opcode::Exit | Opcode::DPrint => &[S],

            Opcode::Move
            | Opcode::Int2Float
            | Opcode::Float2Int
            | Opcode::Not
            | Opcode::Int2Char
            | Opcode::StrLen
            | Opcode::Type => &[V, S],

            Opcode::Read => &[V, T],

            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::IDiv
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Eq
            | Opcode::And
            | Opcode::Or
            | Opcode::Stri2Int
            | Opcode::Concat
            | Opcode::GetChar
            | Opcode::SetChar => &[V, S, S],

            Opcode::JumpIfEq | Opcode::JumpIfNeq => &[L, S, S],
        }
    }

    /// Returns true for opcodes that transfer control (counted as jumps
    /// in source statistics).
    pub fn is_jump(&self) -> bool {
        matches!(
            self,
            Opcode::Call | Opcode::Return | Opcode::Jump | Opcode::JumpIfEq | Opcode::JumpIfNeq
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Opcode {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Opcode::from_name(s).ok_or_else(|| NameError::Opcode(s.to_string()))
    }
}
