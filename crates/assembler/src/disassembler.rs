//! Disassembler: raw instructions → canonical source text.
//!
//! Output is the header followed by one instruction per line, operands
//! separated by single spaces. No comments, no blank lines.

use ippcode_common::{RawArg, RawInstruction};

/// Render one operand the way it is written in source text.
fn operand(arg: &RawArg) -> String {
    match arg.kind.as_str() {
        "var" | "label" | "type" => arg.text.clone(),
        kind => format!("{kind}@{}", arg.text),
    }
}

/// Disassemble instructions into canonical source text.
///
/// Instructions are written in the order given. For instructions that
/// came from the assembler, `assemble(disassemble(x))` reproduces `x`.
pub fn disassemble(instructions: &[RawInstruction]) -> String {
    let mut text = String::from(".IPPcode19\n");
    for instr in instructions {
        text.push_str(&instr.opcode.to_uppercase());
        for arg in &instr.args {
            text.push(' ');
            text.push_str(&operand(arg));
        }
        text.push('\n');
    }
    text
}
