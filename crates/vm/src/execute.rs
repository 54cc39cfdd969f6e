//! Main execution loop and opcode dispatch.

use crate::error::RuntimeError;
use crate::machine::{Interpreter, Step};
use ippcode_common::{Instruction, Opcode, Operand, Value, ValueType};
use std::cmp::Ordering;
use std::io::{BufRead, Write};
use tracing::{debug, trace, warn};

impl<'p, R: BufRead, W: Write, D: Write> Interpreter<'p, R, W, D> {
    /// Execute from the current instruction until the program falls off
    /// the end, hits `EXIT`, or fails. Returns the exit code.
    pub fn execute(&mut self) -> Result<i32, RuntimeError> {
        debug!(instructions = self.program.len(), "run started");
        let program = self.program;

        while let Some(instr) = program.get(self.pc) {
            self.stats.insts += 1;
            trace!(pc = self.pc, %instr, "step");

            let step = self.step(instr)?;
            self.stats.vars = self.stats.vars.max(self.frames.initialized_count());

            match step {
                Step::Next => self.pc += 1,
                Step::Jump(target) => self.pc = target,
                Step::Exit(code) => {
                    debug!(code, executed = self.stats.insts, "run exited");
                    return Ok(code);
                }
            }
        }

        debug!(executed = self.stats.insts, "run finished");
        Ok(0)
    }

    /// Flush both output sinks.
    pub fn flush(&mut self) -> Result<(), RuntimeError> {
        self.output.flush().map_err(|e| self.io_error(e))?;
        self.diag.flush().map_err(|e| self.io_error(e))
    }

    fn step(&mut self, instr: &Instruction) -> Result<Step, RuntimeError> {
        match instr.opcode {
            // Frames and variables
            Opcode::Move => {
                let dest = self.dest(instr)?;
                let value = self.symb(instr, 1)?;
                self.store(dest, value)?;
            }
            Opcode::CreateFrame => self.frames.create_temporary(),
            Opcode::PushFrame => {
                if let Err(e) = self.frames.push_temporary() {
                    return Err(self.frame_error(e));
                }
            }
            Opcode::PopFrame => {
                if let Err(e) = self.frames.pop_local() {
                    return Err(self.frame_error(e));
                }
            }
            Opcode::DefVar => {
                let var = self.var(instr, 0)?;
                if let Err(e) = self.frames.declare(var) {
                    return Err(self.frame_error(e));
                }
            }

            // Calls
            Opcode::Call => {
                let target = self.label_target(instr, 0)?;
                self.call_stack.push(self.pc + 1);
                return Ok(Step::Jump(target));
            }
            Opcode::Return => {
                let target = self
                    .call_stack
                    .pop()
                    .ok_or(RuntimeError::MissingReturnTarget { at: self.pc })?;
                return Ok(Step::Jump(target));
            }

            // Data stack
            Opcode::PushS => {
                let value = self.symb(instr, 0)?;
                self.data_stack.push(value);
            }
            Opcode::PopS => {
                let dest = self.dest(instr)?;
                let value = self
                    .data_stack
                    .pop()
                    .ok_or(RuntimeError::EmptyDataStack { at: self.pc })?;
                self.store(dest, value)?;
            }

            // Arithmetic
            Opcode::Add => self.exec_int_arith(instr, i64::wrapping_add)?,
            Opcode::Sub => self.exec_int_arith(instr, i64::wrapping_sub)?,
            Opcode::Mul => self.exec_int_arith(instr, i64::wrapping_mul)?,
            Opcode::IDiv => self.exec_idiv(instr)?,
            Opcode::Div => self.exec_div(instr)?,
            Opcode::Int2Float => {
                let dest = self.dest(instr)?;
                let n = self.int(instr, 1)?;
                self.store(dest, Value::Float(n as f64))?;
            }
            Opcode::Float2Int => {
                let dest = self.dest(instr)?;
                let x = self.float(instr, 1)?;
                self.store(dest, Value::Int(x.trunc() as i64))?;
            }

            // Relational
            Opcode::Lt => self.exec_ordering(instr, Ordering::Less)?,
            Opcode::Gt => self.exec_ordering(instr, Ordering::Greater)?,
            Opcode::Eq => {
                let dest = self.dest(instr)?;
                let a = self.symb(instr, 1)?;
                let b = self.symb(instr, 2)?;
                let equal = self.equal(&a, &b)?;
                self.store(dest, Value::Bool(equal))?;
            }

            // Boolean
            Opcode::And => {
                let dest = self.dest(instr)?;
                let a = self.bool(instr, 1)?;
                let b = self.bool(instr, 2)?;
                self.store(dest, Value::Bool(a && b))?;
            }
            Opcode::Or => {
                let dest = self.dest(instr)?;
                let a = self.bool(instr, 1)?;
                let b = self.bool(instr, 2)?;
                self.store(dest, Value::Bool(a || b))?;
            }
            Opcode::Not => {
                let dest = self.dest(instr)?;
                let a = self.bool(instr, 1)?;
                self.store(dest, Value::Bool(!a))?;
            }

            // Strings
            Opcode::Int2Char => {
                let dest = self.dest(instr)?;
                let code = self.int(instr, 1)?;
                let c = u32::try_from(code)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or(RuntimeError::InvalidCodePoint { at: self.pc, code })?;
                self.store(dest, Value::Str(c.to_string()))?;
            }
            Opcode::Stri2Int => {
                let dest = self.dest(instr)?;
                let c = self.char_at(instr)?;
                self.store(dest, Value::Int(i64::from(u32::from(c))))?;
            }
            Opcode::GetChar => {
                let dest = self.dest(instr)?;
                let c = self.char_at(instr)?;
                self.store(dest, Value::Str(c.to_string()))?;
            }
            Opcode::SetChar => self.exec_setchar(instr)?,
            Opcode::Concat => {
                let dest = self.dest(instr)?;
                let mut a = self.string(instr, 1)?;
                let b = self.string(instr, 2)?;
                a.push_str(&b);
                self.store(dest, Value::Str(a))?;
            }
            Opcode::StrLen => {
                let dest = self.dest(instr)?;
                let s = self.string(instr, 1)?;
                self.store(dest, Value::Int(s.chars().count() as i64))?;
            }

            // Types
            Opcode::Type => {
                let dest = self.dest(instr)?;
                let name = match self.operand(instr, 1)? {
                    Operand::Var(var) => match self.frames.slot(var) {
                        Ok(slot) => slot
                            .as_ref()
                            .map_or("", |value| value.value_type().name()),
                        Err(e) => return Err(self.frame_error(e)),
                    },
                    Operand::Const(value) => value.value_type().name(),
                    _ => return Err(self.malformed()),
                };
                self.store(dest, Value::Str(name.to_string()))?;
            }

            // I/O
            Opcode::Read => self.exec_read(instr)?,
            Opcode::Write => {
                let value = self.symb(instr, 0)?;
                if let Err(e) = write!(self.output, "{value}") {
                    return Err(self.io_error(e));
                }
            }

            // Control flow
            Opcode::Label => {}
            Opcode::Jump => return Ok(Step::Jump(self.label_target(instr, 0)?)),
            Opcode::JumpIfEq | Opcode::JumpIfNeq => {
                let target = self.label_target(instr, 0)?;
                let a = self.symb(instr, 1)?;
                let b = self.symb(instr, 2)?;
                let equal = self.equal(&a, &b)?;
                if equal == (instr.opcode == Opcode::JumpIfEq) {
                    return Ok(Step::Jump(target));
                }
            }
            Opcode::Exit => {
                return match self.symb(instr, 0)? {
                    Value::Int(code @ 0..=49) => Ok(Step::Exit(code as i32)),
                    Value::Int(code) => Err(RuntimeError::InvalidExitCode { at: self.pc, code }),
                    other => Err(self.expected(ValueType::Int, &other)),
                };
            }

            // Debugging
            Opcode::DPrint => {
                let value = self.symb(instr, 0)?;
                if let Err(e) = write!(self.diag, "{value}") {
                    return Err(self.io_error(e));
                }
            }
            Opcode::Break => {
                let report = self.snapshot().to_string();
                if let Err(e) = self.diag.write_all(report.as_bytes()) {
                    return Err(self.io_error(e));
                }
            }
        }

        Ok(Step::Next)
    }

    // --- Handlers ---

    fn exec_int_arith(
        &mut self,
        instr: &Instruction,
        op: fn(i64, i64) -> i64,
    ) -> Result<(), RuntimeError> {
        let dest = self.dest(instr)?;
        let a = self.int(instr, 1)?;
        let b = self.int(instr, 2)?;
        self.store(dest, Value::Int(op(a, b)))
    }

    /// Integer division rounding toward negative infinity.
    fn exec_idiv(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.dest(instr)?;
        let a = self.int(instr, 1)?;
        let b = self.int(instr, 2)?;
        if b == 0 {
            return Err(RuntimeError::DivisionByZero { at: self.pc });
        }
        self.store(dest, Value::Int(floor_div(a, b)))
    }

    fn exec_div(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.dest(instr)?;
        let a = self.float(instr, 1)?;
        let b = self.float(instr, 2)?;
        if b == 0.0 {
            return Err(RuntimeError::DivisionByZero { at: self.pc });
        }
        self.store(dest, Value::Float(a / b))
    }

    /// LT / GT: operands of one type, never `nil`.
    fn exec_ordering(&mut self, instr: &Instruction, want: Ordering) -> Result<(), RuntimeError> {
        let dest = self.dest(instr)?;
        let a = self.symb(instr, 1)?;
        let b = self.symb(instr, 2)?;
        let ordering = match (&a, &b) {
            (Value::Int(x), Value::Int(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (Value::Str(x), Value::Str(y)) => x.cmp(y),
            (Value::Float(x), Value::Float(y)) => x.total_cmp(y),
            _ => {
                return Err(self.type_mismatch(format!(
                    "cannot order {} and {}",
                    a.value_type(),
                    b.value_type()
                )))
            }
        };
        self.store(dest, Value::Bool(ordering == want))
    }

    /// EQ rule: same type, or either side `nil`.
    fn equal(&self, a: &Value, b: &Value) -> Result<bool, RuntimeError> {
        if a.value_type() == b.value_type() || *a == Value::Nil || *b == Value::Nil {
            Ok(a == b)
        } else {
            Err(self.type_mismatch(format!(
                "cannot compare {} with {}",
                a.value_type(),
                b.value_type()
            )))
        }
    }

    /// The character selected by a `string, int` operand pair (1 and 2).
    fn char_at(&self, instr: &Instruction) -> Result<char, RuntimeError> {
        let s = self.string(instr, 1)?;
        let index = self.int(instr, 2)?;
        let length = s.chars().count();
        usize::try_from(index)
            .ok()
            .and_then(|i| s.chars().nth(i))
            .ok_or(RuntimeError::IndexOutOfRange {
                at: self.pc,
                index,
                length,
            })
    }

    fn exec_setchar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let var = self.var(instr, 0)?;
        let target = match self.frames.read(var) {
            Ok(value) => value.clone(),
            Err(e) => return Err(self.frame_error(e)),
        };
        let index = self.symb(instr, 1)?;
        let replacement = self.symb(instr, 2)?;

        let (mut chars, index, replacement) = match (target, index, replacement) {
            (Value::Str(s), Value::Int(i), Value::Str(r)) => (s.chars().collect::<Vec<_>>(), i, r),
            (t, i, r) => {
                return Err(self.type_mismatch(format!(
                    "SETCHAR expects string, int, string; found {}, {}, {}",
                    t.value_type(),
                    i.value_type(),
                    r.value_type()
                )))
            }
        };

        let length = chars.len();
        let slot = usize::try_from(index)
            .ok()
            .filter(|&i| i < length)
            .ok_or(RuntimeError::IndexOutOfRange {
                at: self.pc,
                index,
                length,
            })?;
        let c = replacement
            .chars()
            .next()
            .ok_or(RuntimeError::EmptyReplacement { at: self.pc })?;

        chars[slot] = c;
        self.store(var, Value::Str(chars.into_iter().collect()))
    }

    fn exec_read(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.dest(instr)?;
        let wanted = self.type_name(instr, 1)?;

        let mut buf = Vec::new();
        let read = match self.input.read_until(b'\n', &mut buf) {
            Ok(n) => n,
            Err(e) => return Err(self.io_error(e)),
        };

        let value = if read == 0 {
            warn!(pc = self.pc, "READ at end of input, using default");
            Value::default_for(wanted)
        } else {
            match String::from_utf8(buf) {
                Ok(line) => {
                    let line = line
                        .strip_suffix('\n')
                        .map(|l| l.strip_suffix('\r').unwrap_or(l))
                        .unwrap_or(&line);
                    coerce_input(line, wanted).unwrap_or_else(|| {
                        warn!(pc = self.pc, input = line, ty = %wanted, "READ could not convert input, using default");
                        Value::default_for(wanted)
                    })
                }
                Err(_) => {
                    warn!(pc = self.pc, "READ input is not valid UTF-8, using default");
                    Value::default_for(wanted)
                }
            }
        };

        self.store(dest, value)
    }
}

/// Floor division; `i64::MIN / -1` wraps.
pub(crate) fn floor_div(a: i64, b: i64) -> i64 {
    let q = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

/// Convert one input line to `wanted`, or `None` if it does not parse.
pub(crate) fn coerce_input(line: &str, wanted: ValueType) -> Option<Value> {
    match wanted {
        ValueType::Int => line.trim().parse().ok().map(Value::Int),
        ValueType::Bool => Some(Value::Bool(line.trim().eq_ignore_ascii_case("true"))),
        ValueType::String => Some(Value::Str(line.to_string())),
        ValueType::Nil | ValueType::Float => None,
    }
}
