//! IPPcode19 CLI: parse, interpret, run, check and disassemble programs.
//!
//! Exit codes follow the toolchain contract:
//! - 0: Success, or the program's `EXIT` operand
//! - 10: Bad command-line usage
//! - 11: Input file cannot be read
//! - 12: Statistics file cannot be written
//! - 21–23: Source text errors
//! - 31–32: XML and validation errors
//! - 52–58: Runtime errors
//! - 99: Internal error

pub mod cli;
pub mod commands;

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise logging to stderr. `RUST_LOG` overrides the default `warn`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
