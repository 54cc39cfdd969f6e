//! IPPcode19 interpreter: executes validated programs.
//!
//! The interpreter is a frame machine with:
//! - A global frame, an optional temporary frame and a stack of local frames
//! - A call stack of return targets
//! - A data stack for `PUSHS`/`POPS`
//!
//! All state lives in one [`Interpreter`]; every failure is a
//! [`RuntimeError`] propagated up to [`run`], which never exits the process.
//!
//! # Usage
//!
//! ```
//! use ippcode_common::{RawArg, RawInstruction};
//! use ippcode_vm::run;
//!
//! let raw = vec![
//!     RawInstruction::new(1, "WRITE", vec![RawArg::new("string", "hello\\010")]),
//!     RawInstruction::new(2, "EXIT", vec![RawArg::new("int", "3")]),
//! ];
//! let program = ippcode_verifier::verify(&raw).unwrap();
//!
//! let mut out = Vec::new();
//! let outcome = run(&program, &b""[..], &mut out, std::io::sink()).unwrap();
//! assert_eq!(out, b"hello\n");
//! assert_eq!(outcome.exit_code, 3);
//! ```

pub mod error;
pub mod execute;
pub mod frames;
pub mod inspect;
pub mod machine;

pub use error::RuntimeError;
pub use frames::{Frame, FrameStore};
pub use inspect::Snapshot;
pub use machine::{ExecStats, Interpreter};

use ippcode_common::Program;
use std::io::{BufRead, Write};

/// How a completed run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// 0 when the program ran off its end, else the `EXIT` operand.
    pub exit_code: i32,
    pub stats: ExecStats,
}

/// Execute a program from instruction 1.
///
/// `input` feeds `READ` one line at a time, `output` receives `WRITE` and
/// `diag` receives `DPRINT` and `BREAK`. Both sinks are flushed before
/// returning, on failure too, so output written before an error stands.
///
/// # Errors
///
/// Returns the first [`RuntimeError`]; [`RuntimeError::exit_code`] gives
/// the process exit code.
pub fn run<R: BufRead, W: Write, D: Write>(
    program: &Program,
    input: R,
    output: W,
    diag: D,
) -> Result<Outcome, RuntimeError> {
    let mut interpreter = Interpreter::new(program, input, output, diag);
    let result = interpreter.execute();
    let flushed = interpreter.flush();
    let exit_code = result?;
    flushed?;
    Ok(Outcome {
        exit_code,
        stats: interpreter.stats(),
    })
}
