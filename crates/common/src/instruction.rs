//! Instruction records, raw and validated.
//!
//! A [`RawInstruction`] is what a transport layer (source text, XML)
//! produces: an order number, an opcode name and up to three
//! `(kind, text)` operand pairs, none of it checked. The validator turns a
//! list of raw instructions into [`Instruction`]s whose operands are
//! already typed.

use crate::error::NameError;
use crate::opcode::Opcode;
use crate::value::Value;
use crate::value_type::ValueType;
use std::fmt;
use std::str::FromStr;

/// Which frame a variable reference addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// `GF`: the global frame.
    Global,
    /// `LF`: the top of the local frame stack.
    Local,
    /// `TF`: the temporary frame.
    Temporary,
}

impl FrameKind {
    /// Returns the two-letter prefix used in variable references.
    pub fn prefix(&self) -> &'static str {
        match self {
            FrameKind::Global => "GF",
            FrameKind::Local => "LF",
            FrameKind::Temporary => "TF",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for FrameKind {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GF" => Ok(FrameKind::Global),
            "LF" => Ok(FrameKind::Local),
            "TF" => Ok(FrameKind::Temporary),
            _ => Err(NameError::Frame(s.to_string())),
        }
    }
}

/// A reference to a variable: frame plus name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarRef {
    /// The frame the variable lives in.
    pub frame: FrameKind,
    /// The variable name (without the frame prefix).
    pub name: String,
}

impl VarRef {
    /// Create a new variable reference.
    pub fn new(frame: FrameKind, name: impl Into<String>) -> Self {
        Self {
            frame,
            name: name.into(),
        }
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.frame, self.name)
    }
}

/// A validated operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A variable reference.
    Var(VarRef),
    /// A literal constant. String literals are already unescaped.
    Const(Value),
    /// A label name.
    Label(String),
    /// A type name, one of the readable types.
    Type(ValueType),
}

/// Re-escape decoded string text so it reads back as one source token.
fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    for c in text.chars() {
        let code = c as u32;
        if (c.is_whitespace() || c.is_control() || c == '#' || c == '\\') && code < 1000 {
            write!(f, "\\{code:03}")?;
        } else {
            write!(f, "{c}")?;
        }
    }
    Ok(())
}

/// Source-text form of the operand, as the assembler accepts it.
impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Var(var) => write!(f, "{var}"),
            Operand::Const(Value::Nil) => f.write_str("nil@nil"),
            Operand::Const(Value::Str(text)) => {
                f.write_str("string@")?;
                write_escaped(f, text)
            }
            Operand::Const(value) => write!(f, "{}@{value}", value.value_type()),
            Operand::Label(label) => f.write_str(label),
            Operand::Type(t) => write!(f, "{t}"),
        }
    }
}

/// An unvalidated operand: the transport's kind tag and raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArg {
    /// `var`, `label`, `type`, `int`, `bool`, `string` or `nil`, as written.
    pub kind: String,
    /// The raw operand text. For `var` this includes the frame prefix.
    pub text: String,
}

impl RawArg {
    /// Create a new raw operand.
    pub fn new(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
        }
    }
}

/// An unvalidated instruction as produced by a transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInstruction {
    /// Position of the instruction in the program (expected 1..N).
    pub order: i64,
    /// The opcode name, any case.
    pub opcode: String,
    /// Operands in position order.
    pub args: Vec<RawArg>,
}

impl RawInstruction {
    /// Create a new raw instruction.
    pub fn new(order: i64, opcode: impl Into<String>, args: Vec<RawArg>) -> Self {
        Self {
            order,
            opcode: opcode.into(),
            args,
        }
    }
}

/// A validated instruction. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// Operands, matching `opcode.params()` in count and kind.
    pub operands: Vec<Operand>,
}

impl Instruction {
    /// Create a new instruction.
    pub fn new(opcode: Opcode, operands: Vec<Operand>) -> Self {
        Self { opcode, operands }
    }

    /// The operand at `index`, if present.
    pub fn operand(&self, index: usize) -> Option<&Operand> {
        self.operands.get(index)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode.name())?;
        for operand in &self.operands {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}
