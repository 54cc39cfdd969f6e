//! Per-instruction validation: opcode lookup, signature, operand grammar.

use crate::error::VerifyError;
use crate::grammar;
use ippcode_common::{Instruction, Opcode, Operand, ParamKind, RawArg, RawInstruction};

/// Validate one raw instruction and build its typed form.
pub fn check_instruction(raw: &RawInstruction) -> Result<Instruction, VerifyError> {
    let opcode = Opcode::from_name(&raw.opcode).ok_or_else(|| VerifyError::UnknownOpcode {
        order: raw.order,
        opcode: raw.opcode.clone(),
    })?;

    let params = opcode.params();
    if raw.args.len() != params.len() {
        return Err(VerifyError::OperandCount {
            order: raw.order,
            opcode,
            expected: params.len(),
            found: raw.args.len(),
        });
    }

    let operands = params
        .iter()
        .zip(&raw.args)
        .enumerate()
        .map(|(i, (&param, arg))| check_operand(raw.order, i + 1, param, arg))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Instruction::new(opcode, operands))
}

fn check_operand(
    order: i64,
    position: usize,
    param: ParamKind,
    arg: &RawArg,
) -> Result<Operand, VerifyError> {
    let kind = arg.kind.as_str();
    let malformed = || VerifyError::MalformedOperand {
        order,
        position,
        kind: arg.kind.clone(),
        text: arg.text.clone(),
    };
    let wrong_kind = || VerifyError::OperandKind {
        order,
        position,
        expected: param,
        found: arg.kind.clone(),
    };

    match (param, kind) {
        (ParamKind::Var | ParamKind::Symb, "var") => grammar::parse_var(&arg.text)
            .map(Operand::Var)
            .ok_or_else(malformed),
        (ParamKind::Symb, "int" | "bool" | "string" | "nil") => {
            grammar::parse_literal(kind, &arg.text)
                .map(Operand::Const)
                .ok_or_else(malformed)
        }
        (ParamKind::Label, "label") => {
            if grammar::is_identifier(&arg.text) {
                Ok(Operand::Label(arg.text.clone()))
            } else {
                Err(malformed())
            }
        }
        (ParamKind::Type, "type") => grammar::parse_type(&arg.text)
            .map(Operand::Type)
            .ok_or_else(malformed),
        _ => Err(wrong_kind()),
    }
}
