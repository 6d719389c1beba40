//! Call stack of activation records.

use std::fmt;

use crate::env::{Environment, ScopeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Program,
    Function,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FrameKind::Program => "PROGRAM",
            FrameKind::Function => "FUNCTION",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivationRecord {
    pub name: String,
    pub kind: FrameKind,
    /// `1` for the program frame, one more than the caller's for every call.
    pub nesting_level: usize,
    /// The scope created with the frame. Parameters are bound here.
    pub base_scope: ScopeId,
    /// The innermost scope of the frame. Moves inwards and back out as blocks are entered and left.
    pub scope: ScopeId,
}

impl ActivationRecord {
    pub fn new(name: impl Into<String>, kind: FrameKind, nesting_level: usize, scope: ScopeId) -> Self {
        Self {
            name: name.into(),
            kind,
            nesting_level,
            base_scope: scope,
            scope,
        }
    }
}

#[derive(Debug, Default)]
pub struct CallStack {
    records: Vec<ActivationRecord>,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ActivationRecord) {
        self.records.push(record);
    }

    pub fn pop(&mut self) -> Option<ActivationRecord> {
        self.records.pop()
    }

    pub fn peek(&self) -> Option<&ActivationRecord> {
        self.records.last()
    }

    pub fn peek_mut(&mut self) -> Option<&mut ActivationRecord> {
        self.records.last_mut()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns a [`fmt::Display`] implementation rendering every frame with its variables.
    pub fn display<'a>(&'a self, env: &'a Environment) -> StackDisplay<'a> {
        StackDisplay { stack: self, env }
    }
}

pub struct StackDisplay<'a> {
    stack: &'a CallStack,
    env: &'a Environment,
}

impl fmt::Display for StackDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CALL STACK")?;
        for record in self.stack.records.iter().rev() {
            writeln!(
                f,
                "{}: {} {}",
                record.nesting_level, record.kind, record.name
            )?;
            for bindings in self.env.chain(record.scope) {
                for (name, value) in bindings.iter() {
                    writeln!(f, "  {:<16} ({:<6}): {:?}", name, value.type_name(), value)?;
                }
            }
        }
        Ok(())
    }
}
