//! Frame and value store: the global frame, the temporary slot and the
//! local frame stack.
//!
//! A frame maps names to slots in declaration order. A slot is `None`
//! while the variable is declared but not yet assigned. Frames move
//! between the temporary slot and the local stack; they are never copied.

use crate::error::RuntimeError;
use indexmap::IndexMap;
use ippcode_common::{FrameKind, Value, VarRef};
use thiserror::Error;

/// One frame: variable name → slot, in declaration order.
pub type Frame = IndexMap<String, Option<Value>>;

/// Store-level failures. The interpreter attaches the instruction order
/// with [`FrameError::at`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame {0} does not exist")]
    Absent(FrameKind),
    #[error("variable {0} already declared")]
    Redeclared(VarRef),
    #[error("variable {0} is not defined")]
    Undefined(VarRef),
    #[error("variable {0} is uninitialized")]
    Uninitialized(VarRef),
}

impl FrameError {
    /// Convert into a [`RuntimeError`] raised at instruction `at`.
    pub fn at(self, at: usize) -> RuntimeError {
        match self {
            FrameError::Absent(frame) => RuntimeError::FrameAbsent { at, frame },
            FrameError::Redeclared(var) => RuntimeError::VariableRedeclared { at, var },
            FrameError::Undefined(var) => RuntimeError::VariableUndefined { at, var },
            FrameError::Uninitialized(var) => RuntimeError::ValueUninitialized { at, var },
        }
    }
}

/// All frames visible to a running program.
#[derive(Debug, Clone, Default)]
pub struct FrameStore {
    global: Frame,
    temporary: Option<Frame>,
    locals: Vec<Frame>,
}

impl FrameStore {
    /// Empty global frame, no temporary frame, empty local stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// CREATEFRAME: replace the temporary frame with a fresh one.
    pub fn create_temporary(&mut self) {
        self.temporary = Some(Frame::new());
    }

    /// PUSHFRAME: move the temporary frame onto the local stack.
    pub fn push_temporary(&mut self) -> Result<(), FrameError> {
        let frame = self
            .temporary
            .take()
            .ok_or(FrameError::Absent(FrameKind::Temporary))?;
        self.locals.push(frame);
        Ok(())
    }

    /// POPFRAME: move the top local frame into the temporary slot.
    pub fn pop_local(&mut self) -> Result<(), FrameError> {
        let frame = self
            .locals
            .pop()
            .ok_or(FrameError::Absent(FrameKind::Local))?;
        self.temporary = Some(frame);
        Ok(())
    }

    /// The frame addressed by `kind`, without removing it.
    pub fn resolve(&self, kind: FrameKind) -> Result<&Frame, FrameError> {
        match kind {
            FrameKind::Global => Ok(&self.global),
            FrameKind::Temporary => self.temporary.as_ref().ok_or(FrameError::Absent(kind)),
            FrameKind::Local => self.locals.last().ok_or(FrameError::Absent(kind)),
        }
    }

    /// Mutable access to the frame addressed by `kind`.
    pub fn resolve_mut(&mut self, kind: FrameKind) -> Result<&mut Frame, FrameError> {
        match kind {
            FrameKind::Global => Ok(&mut self.global),
            FrameKind::Temporary => self.temporary.as_mut().ok_or(FrameError::Absent(kind)),
            FrameKind::Local => self.locals.last_mut().ok_or(FrameError::Absent(kind)),
        }
    }

    /// DEFVAR: add an uninitialised slot.
    pub fn declare(&mut self, var: &VarRef) -> Result<(), FrameError> {
        let frame = self.resolve_mut(var.frame)?;
        if frame.contains_key(&var.name) {
            return Err(FrameError::Redeclared(var.clone()));
        }
        frame.insert(var.name.clone(), None);
        Ok(())
    }

    /// Read an initialised variable.
    pub fn read(&self, var: &VarRef) -> Result<&Value, FrameError> {
        self.slot(var)?
            .as_ref()
            .ok_or_else(|| FrameError::Uninitialized(var.clone()))
    }

    /// Assign a declared variable, initialised or not.
    pub fn write(&mut self, var: &VarRef, value: Value) -> Result<(), FrameError> {
        let slot = self
            .resolve_mut(var.frame)?
            .get_mut(&var.name)
            .ok_or_else(|| FrameError::Undefined(var.clone()))?;
        *slot = Some(value);
        Ok(())
    }

    /// The raw slot: `None` inside means declared but uninitialised.
    pub fn slot(&self, var: &VarRef) -> Result<&Option<Value>, FrameError> {
        self.resolve(var.frame)?
            .get(&var.name)
            .ok_or_else(|| FrameError::Undefined(var.clone()))
    }

    /// Check that `var` exists, without reading it.
    pub fn check_declared(&self, var: &VarRef) -> Result<(), FrameError> {
        self.slot(var).map(|_| ())
    }

    /// The global frame.
    pub fn global(&self) -> &Frame {
        &self.global
    }

    /// The temporary frame, if one exists.
    pub fn temporary(&self) -> Option<&Frame> {
        self.temporary.as_ref()
    }

    /// The top local frame, if any.
    pub fn top_local(&self) -> Option<&Frame> {
        self.locals.last()
    }

    /// Number of frames on the local stack.
    pub fn local_depth(&self) -> usize {
        self.locals.len()
    }

    /// Initialised variables across every frame, including buried locals.
    pub fn initialized_count(&self) -> usize {
        let count = |frame: &Frame| frame.values().filter(|slot| slot.is_some()).count();
        count(&self.global)
            + self.temporary.as_ref().map_or(0, count)
            + self.locals.iter().map(count).sum::<usize>()
    }
}
