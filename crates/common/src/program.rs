//! Program model: validated instructions plus the label table.
//!
//! Instructions are addressed 1..=N. The label table is built once by the
//! validator; lookups never change it.

use crate::instruction::Instruction;
use std::collections::HashMap;

/// A validated IPPcode19 program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// The instruction stream; `instructions[0]` is instruction 1.
    pub instructions: Vec<Instruction>,
    /// Label name → 1-based index of the `LABEL` instruction.
    pub labels: HashMap<String, usize>,
}

impl Program {
    /// Create a new program from instructions and a prebuilt label table.
    pub fn new(instructions: Vec<Instruction>, labels: HashMap<String, usize>) -> Self {
        Self {
            instructions,
            labels,
        }
    }

    /// Fetch instruction `index` (1-based).
    pub fn get(&self, index: usize) -> Option<&Instruction> {
        index
            .checked_sub(1)
            .and_then(|i| self.instructions.get(i))
    }

    /// Index of the `LABEL` instruction defining `name`.
    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Operand;
    use crate::opcode::Opcode;

    fn sample() -> Program {
        let instructions = vec![
            Instruction::new(Opcode::Label, vec![Operand::Label("top".into())]),
            Instruction::new(Opcode::Break, vec![]),
        ];
        let labels = HashMap::from([("top".to_string(), 1)]);
        Program::new(instructions, labels)
    }

    #[test]
    fn one_based_indexing() {
        let program = sample();
        assert_eq!(program.get(0), None);
        assert_eq!(program.get(1).map(|i| i.opcode), Some(Opcode::Label));
        assert_eq!(program.get(2).map(|i| i.opcode), Some(Opcode::Break));
        assert_eq!(program.get(3), None);
    }

    #[test]
    fn label_lookup() {
        let program = sample();
        assert_eq!(program.label("top"), Some(1));
        assert_eq!(program.label("bottom"), None);
    }

    #[test]
    fn empty_program() {
        let program = Program::new(vec![], HashMap::new());
        assert!(program.is_empty());
        assert_eq!(program.len(), 0);
    }
}
