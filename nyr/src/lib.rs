//! The Nyr scripting language: lexing, parsing and interpretation of source text.

pub mod logger;

use std::fmt;

pub use nyr_interpreter::{Bindings, Interpreter, Limits, LoopKind, RuntimeError};
pub use nyr_parser::ast::Program;
pub use nyr_parser::{LexError, SyntaxError};
pub use nyr_source::Position;
pub use nyr_value::Value;

/// Any error produced while running Nyr source.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Lex(LexError),
    Syntax(SyntaxError),
    Runtime(RuntimeError),
}

impl Error {
    /// Where in the source the error happened. Runtime errors carry no position.
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::Lex(err) => Some(err.position()),
            Error::Syntax(err) => Some(err.position()),
            Error::Runtime(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lex(err) => write!(f, "LexError: {}", err),
            Error::Syntax(err) => write!(f, "SyntaxError: {}", err),
            Error::Runtime(err) => write!(f, "RuntimeError: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Lex(err) => Some(err),
            Error::Syntax(err) => Some(err),
            Error::Runtime(err) => Some(err),
        }
    }
}

impl From<LexError> for Error {
    fn from(err: LexError) -> Self {
        Error::Lex(err)
    }
}

impl From<SyntaxError> for Error {
    fn from(err: SyntaxError) -> Self {
        Error::Syntax(err)
    }
}

impl From<RuntimeError> for Error {
    fn from(err: RuntimeError) -> Self {
        Error::Runtime(err)
    }
}

/// Tokenizes and parses `source`.
pub fn parse_source(source: &str) -> Result<Program, Error> {
    let tokens = nyr_parser::tokenize(source)?;
    Ok(nyr_parser::parse(tokens)?)
}

/// Runs `source` with the default [`Limits`] and returns its top level variables.
pub fn run(source: &str) -> Result<Bindings, Error> {
    run_with_limits(source, Limits::default())
}

pub fn run_with_limits(source: &str, limits: Limits) -> Result<Bindings, Error> {
    let program = parse_source(source)?;
    Ok(nyr_interpreter::interpret_with_limits(&program, limits)?)
}
