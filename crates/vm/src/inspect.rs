//! Read-only view of interpreter state, printed by `BREAK`.

use crate::frames::Frame;
use ippcode_common::Value;
use std::fmt;

/// A borrowed snapshot of the interpreter at an instruction boundary.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    /// Instructions executed so far, including the current one.
    pub executed: u64,
    /// Order of the current instruction.
    pub order: usize,
    pub global: &'a Frame,
    pub temporary: Option<&'a Frame>,
    /// Top of the local frame stack.
    pub local: Option<&'a Frame>,
    pub local_depth: usize,
    pub call_depth: usize,
    /// Bottom first.
    pub data_stack: &'a [Value],
}

/// `type@value`, with `nil@nil` for nil.
fn typed(value: &Value) -> String {
    match value {
        Value::Nil => "nil@nil".to_string(),
        other => format!("{}@{other}", other.value_type()),
    }
}

fn write_frame(f: &mut fmt::Formatter<'_>, title: &str, frame: Option<&Frame>) -> fmt::Result {
    let Some(frame) = frame else {
        return writeln!(f, "{title}: <absent>");
    };
    writeln!(f, "{title}: {} variable(s)", frame.len())?;
    for (name, slot) in frame {
        match slot {
            Some(value) => writeln!(f, "    {name} = {}", typed(value))?,
            None => writeln!(f, "    {name} = <uninitialized>")?,
        }
    }
    Ok(())
}

impl fmt::Display for Snapshot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "--- BREAK at instruction {} ({} executed) ---",
            self.order, self.executed
        )?;
        write_frame(f, "global frame", Some(self.global))?;
        write_frame(f, "temporary frame", self.temporary)?;
        write_frame(
            f,
            &format!("local frame (depth {})", self.local_depth),
            self.local,
        )?;
        writeln!(f, "call stack depth: {}", self.call_depth)?;
        writeln!(f, "data stack: {} value(s)", self.data_stack.len())?;
        for value in self.data_stack.iter().rev() {
            writeln!(f, "    {}", typed(value))?;
        }
        Ok(())
    }
}
