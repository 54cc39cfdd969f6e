//! Label pre-pass: build the label table before anything executes.

use crate::error::VerifyError;
use ippcode_common::{Instruction, Opcode, Operand};
use std::collections::HashMap;

/// Map every `LABEL` name to its 1-based instruction index.
///
/// A name defined twice is an error at this point, not at use time.
pub fn build_label_table(
    instructions: &[Instruction],
) -> Result<HashMap<String, usize>, VerifyError> {
    let mut labels = HashMap::new();

    for (i, instr) in instructions.iter().enumerate() {
        if instr.opcode != Opcode::Label {
            continue;
        }
        let index = i + 1;
        if let Some(Operand::Label(name)) = instr.operand(0) {
            if labels.insert(name.clone(), index).is_some() {
                return Err(VerifyError::DuplicateLabel {
                    order: index as i64,
                    label: name.clone(),
                });
            }
        }
    }

    Ok(labels)
}
