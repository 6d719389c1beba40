//! Syntax errors.

use std::fmt;

use nyr_source::Position;

use crate::ast::Expr;
use crate::lexer::{Token, TokenKind};

/// What the parser was looking for when it gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Token(TokenKind),
    Expression,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Token(kind) => write!(f, "\"{}\"", kind),
            Expected::Expression => f.write_str("expression"),
        }
    }
}

impl From<TokenKind> for Expected {
    fn from(kind: TokenKind) -> Self {
        Expected::Token(kind)
    }
}

/// Represents a syntax error (compile time error).
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxError {
    /// Only `EOF` was left.
    UnexpectedEndOfInput {
        expected: Expected,
        position: Position,
    },
    UnexpectedToken {
        found: Token,
        expected: Expected,
        position: Position,
    },
    /// The left hand side of an assignment is neither an identifier nor a member expression.
    InvalidAssignmentTarget { node: Box<Expr>, position: Position },
}

impl SyntaxError {
    pub fn position(&self) -> Position {
        match self {
            SyntaxError::UnexpectedEndOfInput { position, .. }
            | SyntaxError::UnexpectedToken { position, .. }
            | SyntaxError::InvalidAssignmentTarget { position, .. } => *position,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::UnexpectedEndOfInput { expected, position } => write!(
                f,
                "unexpected end of input, expected {} at {}",
                expected, position
            ),
            SyntaxError::UnexpectedToken {
                found,
                expected,
                position,
            } => write!(
                f,
                "unexpected token \"{}\", expected {} at {}",
                found, expected, position
            ),
            SyntaxError::InvalidAssignmentTarget { node, position } => write!(
                f,
                "invalid left-hand side in assignment expression: {}; expected: Identifier, MemberExpression at {}",
                node.kind(),
                position
            ),
        }
    }
}

impl std::error::Error for SyntaxError {}
