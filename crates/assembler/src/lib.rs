//! IPPcode19 front ends: source text and XML in, raw instructions out.
//!
//! The assembler reads the textual language (`.IPPcode19` header, one
//! instruction per line, `#` comments) and produces [`RawInstruction`]s
//! numbered in source order. The [`xml`] module writes and reads the XML
//! transport document. Neither builds a [`Program`]: that is the
//! verifier's job.
//!
//! # Usage
//!
//! ```
//! use ippcode_assembler::{assemble, disassemble};
//!
//! let text = ".IPPcode19\nDEFVAR GF@x\nWRITE string@hi\n";
//! let assembled = assemble(text).unwrap();
//! assert_eq!(assembled.instructions.len(), 2);
//! assert_eq!(disassemble(&assembled.instructions), text);
//! ```
//!
//! [`Program`]: ippcode_common::Program

pub mod error;
pub mod xml;

mod disassembler;
mod lexer;
mod parser;

pub use disassembler::disassemble;
pub use error::{AsmError, XmlError};
pub use xml::{read_xml, to_xml};

use ippcode_common::{Opcode, RawInstruction};
use lexer::{is_header, tokenize_line};
use parser::parse_line;
use tracing::debug;

/// Counters collected while scanning source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    /// Lines holding an instruction.
    pub loc: usize,
    /// Lines holding a comment, the header line included.
    pub comments: usize,
    /// `LABEL` definitions.
    pub labels: usize,
    /// `CALL`, `RETURN`, `JUMP`, `JUMPIFEQ` and `JUMPIFNEQ` instructions.
    pub jumps: usize,
}

/// The result of assembling source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    /// Instructions numbered 1..=N in source order.
    pub instructions: Vec<RawInstruction>,
    pub stats: SourceStats,
}

/// Assemble source text into raw instructions.
///
/// Returns the first error encountered.
pub fn assemble(text: &str) -> Result<Assembled, AsmError> {
    let mut instructions = Vec::new();
    let mut stats = SourceStats::default();
    let mut seen_header = false;
    let mut last_line = 0;

    for (idx, source) in text.lines().enumerate() {
        let line_num = idx + 1;
        last_line = line_num;
        let line = tokenize_line(source);
        if line.has_comment {
            stats.comments += 1;
        }
        if line.tokens.is_empty() {
            continue;
        }

        if !seen_header {
            if !is_header(&line.tokens) {
                return Err(AsmError::MissingHeader { line: line_num });
            }
            seen_header = true;
            continue;
        }

        let order = instructions.len() as i64 + 1;
        let raw = parse_line(&line.tokens, line_num, order)?;
        stats.loc += 1;
        match Opcode::from_name(&raw.opcode) {
            Some(Opcode::Label) => stats.labels += 1,
            Some(op) if op.is_jump() => stats.jumps += 1,
            _ => {}
        }
        instructions.push(raw);
    }

    if !seen_header {
        return Err(AsmError::MissingHeader {
            line: last_line + 1,
        });
    }

    debug!(instructions = instructions.len(), "source assembled");
    Ok(Assembled {
        instructions,
        stats,
    })
}
