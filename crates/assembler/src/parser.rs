//! Parser for IPPcode19 tokens → raw instructions.
//!
//! Each operand token is classified by the slot it fills in the opcode
//! signature, then the whole instruction goes through the operand grammar.

use crate::error::AsmError;
use ippcode_common::{Opcode, ParamKind, RawArg, RawInstruction};
use ippcode_verifier::check_instruction;

/// Parse the tokens of one instruction line.
///
/// `order` is the number the instruction gets in the program.
pub(crate) fn parse_line(
    tokens: &[&str],
    line: usize,
    order: i64,
) -> Result<RawInstruction, AsmError> {
    let (mnemonic, operands) = match tokens.split_first() {
        Some(split) => split,
        None => {
            return Err(AsmError::MalformedOperand {
                line,
                token: String::new(),
            })
        }
    };

    let opcode = Opcode::from_name(mnemonic).ok_or_else(|| AsmError::UnknownOpcode {
        line,
        token: mnemonic.to_string(),
    })?;

    let params = opcode.params();
    if operands.len() != params.len() {
        return Err(AsmError::OperandCount {
            line,
            opcode: opcode.name(),
            expected: params.len(),
            found: operands.len(),
        });
    }

    let args = params
        .iter()
        .zip(operands)
        .map(|(&param, token)| classify(param, token, line))
        .collect::<Result<Vec<_>, _>>()?;

    let raw = RawInstruction::new(order, opcode.name(), args);
    check_instruction(&raw).map_err(|source| AsmError::Invalid { line, source })?;
    Ok(raw)
}

/// Turn a token into a `(kind, text)` operand for its signature slot.
fn classify(param: ParamKind, token: &str, line: usize) -> Result<RawArg, AsmError> {
    match param {
        ParamKind::Var => Ok(RawArg::new("var", token)),
        ParamKind::Label => Ok(RawArg::new("label", token)),
        ParamKind::Type => Ok(RawArg::new("type", token)),
        ParamKind::Symb => match token.split_once('@') {
            Some(("GF" | "LF" | "TF", _)) => Ok(RawArg::new("var", token)),
            Some((kind, text)) => Ok(RawArg::new(kind, text)),
            None => Err(AsmError::MalformedOperand {
                line,
                token: token.to_string(),
            }),
        },
    }
}
