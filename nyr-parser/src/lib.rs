//! Lexer, syntax tree and parser for the Nyr language.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use error::SyntaxError;
pub use lexer::{tokenize, LexError};
pub use parser::parse;
