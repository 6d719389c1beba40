//! Tree-walking interpreter for Nyr programs.

pub mod env;
pub mod error;
pub mod interpreter;
mod ops;
pub mod stack;

pub use env::Bindings;
pub use error::{LoopKind, RuntimeError};
pub use interpreter::{Interpreter, Limits};

use nyr_parser::ast::Program;

/// Runs `program` with the default [`Limits`] and returns its top level variables.
pub fn interpret(program: &Program) -> Result<Bindings, RuntimeError> {
    Interpreter::new().interpret(program)
}

pub fn interpret_with_limits(program: &Program, limits: Limits) -> Result<Bindings, RuntimeError> {
    Interpreter::with_limits(limits).interpret(program)
}
