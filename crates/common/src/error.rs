//! Name lookup errors for the IPPcode19 data model.

use thiserror::Error;

/// A textual name did not match any known opcode, type or frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// Not one of the opcode names.
    #[error("unknown opcode '{0}'")]
    Opcode(String),

    /// Not one of the type names.
    #[error("unknown type '{0}'")]
    Type(String),

    /// Not one of `GF`, `LF`, `TF`.
    #[error("unknown frame '{0}'")]
    Frame(String),
}
