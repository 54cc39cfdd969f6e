//! Interpreter state: program counter, frames, both stacks and the I/O
//! endpoints, plus the operand access helpers every handler goes through.

use crate::error::RuntimeError;
use crate::frames::{FrameError, FrameStore};
use crate::inspect::Snapshot;
use ippcode_common::{Instruction, Operand, Program, Value, ValueType, VarRef};
use std::io;

/// Counters collected while a program runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecStats {
    /// Executed instructions, including the one that stopped the run.
    pub insts: u64,
    /// Maximum number of initialised variables alive at once, across the
    /// global, temporary and every local frame.
    pub vars: usize,
}

/// What the current instruction asks the main loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Fall through to `pc + 1`.
    Next,
    /// Continue at this 1-based instruction index.
    Jump(usize),
    /// Stop with this exit code.
    Exit(i32),
}

/// The IPPcode19 interpreter.
///
/// Owns every piece of mutable run state. `R` supplies lines for `READ`,
/// `W` receives `WRITE` output and `D` receives `DPRINT` and `BREAK`.
pub struct Interpreter<'p, R, W, D> {
    /// The program being executed.
    pub(crate) program: &'p Program,
    /// 1-based index of the current instruction.
    pub(crate) pc: usize,
    pub(crate) frames: FrameStore,
    /// Return targets pushed by CALL.
    pub(crate) call_stack: Vec<usize>,
    /// Values pushed by PUSHS.
    pub(crate) data_stack: Vec<Value>,
    pub(crate) input: R,
    pub(crate) output: W,
    pub(crate) diag: D,
    pub(crate) stats: ExecStats,
}

impl<'p, R, W, D> Interpreter<'p, R, W, D> {
    /// Create an interpreter positioned at instruction 1 with empty state.
    pub fn new(program: &'p Program, input: R, output: W, diag: D) -> Self {
        Self {
            program,
            pc: 1,
            frames: FrameStore::new(),
            call_stack: Vec::new(),
            data_stack: Vec::new(),
            input,
            output,
            diag,
            stats: ExecStats::default(),
        }
    }

    /// Statistics collected so far.
    pub fn stats(&self) -> ExecStats {
        self.stats
    }

    /// The frame store, for inspection.
    pub fn frames(&self) -> &FrameStore {
        &self.frames
    }

    /// Read-only view of the current state.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            executed: self.stats.insts,
            order: self.pc,
            global: self.frames.global(),
            temporary: self.frames.temporary(),
            local: self.frames.top_local(),
            local_depth: self.frames.local_depth(),
            call_depth: self.call_stack.len(),
            data_stack: &self.data_stack,
        }
    }

    // --- Error helpers ---

    pub(crate) fn frame_error(&self, err: FrameError) -> RuntimeError {
        err.at(self.pc)
    }

    pub(crate) fn io_error(&self, err: io::Error) -> RuntimeError {
        RuntimeError::Io {
            at: self.pc,
            message: err.to_string(),
        }
    }

    pub(crate) fn malformed(&self) -> RuntimeError {
        RuntimeError::MalformedInstruction { at: self.pc }
    }

    pub(crate) fn type_mismatch(&self, detail: impl Into<String>) -> RuntimeError {
        RuntimeError::TypeMismatch {
            at: self.pc,
            detail: detail.into(),
        }
    }

    // --- Operand access ---

    pub(crate) fn operand<'i>(
        &self,
        instr: &'i Instruction,
        index: usize,
    ) -> Result<&'i Operand, RuntimeError> {
        instr.operand(index).ok_or_else(|| self.malformed())
    }

    /// Operand `index` as a variable reference.
    pub(crate) fn var<'i>(
        &self,
        instr: &'i Instruction,
        index: usize,
    ) -> Result<&'i VarRef, RuntimeError> {
        match self.operand(instr, index)? {
            Operand::Var(var) => Ok(var),
            _ => Err(self.malformed()),
        }
    }

    /// Operand 0 as a destination: the frame must exist and the variable
    /// must be declared. Checked before any source operand is read.
    pub(crate) fn dest<'i>(&self, instr: &'i Instruction) -> Result<&'i VarRef, RuntimeError> {
        let var = self.var(instr, 0)?;
        self.frames
            .check_declared(var)
            .map_err(|e| self.frame_error(e))?;
        Ok(var)
    }

    /// Operand `index` as a type name.
    pub(crate) fn type_name(
        &self,
        instr: &Instruction,
        index: usize,
    ) -> Result<ValueType, RuntimeError> {
        match self.operand(instr, index)? {
            Operand::Type(t) => Ok(*t),
            _ => Err(self.malformed()),
        }
    }

    /// Resolve operand `index` to a value. Variables must be initialised.
    pub(crate) fn symb(&self, instr: &Instruction, index: usize) -> Result<Value, RuntimeError> {
        match self.operand(instr, index)? {
            Operand::Const(value) => Ok(value.clone()),
            Operand::Var(var) => self
                .frames
                .read(var)
                .cloned()
                .map_err(|e| self.frame_error(e)),
            _ => Err(self.malformed()),
        }
    }

    /// Resolve operand `index` as an `int`.
    pub(crate) fn int(&self, instr: &Instruction, index: usize) -> Result<i64, RuntimeError> {
        match self.symb(instr, index)? {
            Value::Int(n) => Ok(n),
            other => Err(self.expected(ValueType::Int, &other)),
        }
    }

    /// Resolve operand `index` as a `bool`.
    pub(crate) fn bool(&self, instr: &Instruction, index: usize) -> Result<bool, RuntimeError> {
        match self.symb(instr, index)? {
            Value::Bool(b) => Ok(b),
            other => Err(self.expected(ValueType::Bool, &other)),
        }
    }

    /// Resolve operand `index` as a `string`.
    pub(crate) fn string(&self, instr: &Instruction, index: usize) -> Result<String, RuntimeError> {
        match self.symb(instr, index)? {
            Value::Str(s) => Ok(s),
            other => Err(self.expected(ValueType::String, &other)),
        }
    }

    /// Resolve operand `index` as a `float`.
    pub(crate) fn float(&self, instr: &Instruction, index: usize) -> Result<f64, RuntimeError> {
        match self.symb(instr, index)? {
            Value::Float(x) => Ok(x),
            other => Err(self.expected(ValueType::Float, &other)),
        }
    }

    pub(crate) fn expected(&self, want: ValueType, got: &Value) -> RuntimeError {
        self.type_mismatch(format!("expected {want}, found {}", got.value_type()))
    }

    /// Assign a destination already checked by [`Self::dest`].
    pub(crate) fn store(&mut self, var: &VarRef, value: Value) -> Result<(), RuntimeError> {
        self.frames
            .write(var, value)
            .map_err(|e| self.frame_error(e))
    }

    /// Resolve a LABEL operand to its instruction index.
    pub(crate) fn label_target(
        &self,
        instr: &Instruction,
        index: usize,
    ) -> Result<usize, RuntimeError> {
        match self.operand(instr, index)? {
            Operand::Label(name) => {
                self.program
                    .label(name)
                    .ok_or_else(|| RuntimeError::LabelUndefined {
                        at: self.pc,
                        label: name.clone(),
                    })
            }
            _ => Err(self.malformed()),
        }
    }
}
