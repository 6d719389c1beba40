use std::collections::HashMap;
use std::mem;

use crate::ast::{FunctionSignature, Program};
use crate::error::{Expected, SyntaxError};
use crate::lexer::{SpannedToken, Token, TokenKind};
use nyr_source::Position;

mod expr;
mod stmt;

pub type ParseResult<T> = Result<T, SyntaxError>;

/// Signatures of the functions declared so far, by name.
pub type FunctionTable = HashMap<String, FunctionSignature>;

/// Parses a whole token stream (as produced by [`crate::lexer::tokenize`]) into a [`Program`].
pub fn parse(tokens: Vec<SpannedToken>) -> ParseResult<Program> {
    Parser::new(tokens).parse_program()
}

pub struct Parser {
    /// Cached token for peeking.
    current_token: SpannedToken,
    tokens: std::vec::IntoIter<SpannedToken>,
    /// Function signatures, registered as soon as a declaration's parameter list is parsed.
    functions: FunctionTable,
}

impl Parser {
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        let mut tokens = tokens.into_iter();
        let current_token = tokens
            .next()
            .unwrap_or_else(|| eof_token(Position::default()));
        Self {
            current_token,
            tokens,
            functions: FunctionTable::new(),
        }
    }

    /// Returns the parse-time function table.
    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }
}

fn eof_token(position: Position) -> SpannedToken {
    SpannedToken {
        token: Token::Eof,
        span: position.offset..position.offset,
        position,
    }
}

/// Parse utilities
impl Parser {
    /// Advances to the next token and returns the one that was current.
    /// Once the stream is exhausted, `EOF` is repeated.
    fn next(&mut self) -> SpannedToken {
        let next = match self.tokens.next() {
            Some(token) => token,
            None => eof_token(self.current_token.position),
        };
        mem::replace(&mut self.current_token, next)
    }

    /// Predicate that tests whether the current token is of kind `kind`.
    fn check(&self, kind: TokenKind) -> bool {
        self.current_token.kind() == kind
    }

    /// Predicate that tests whether the current token is of kind `kind` and eats it if yes as a side effect.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.next(); // eat token
            true
        } else {
            false
        }
    }

    /// Eats a token of kind `kind` or fails with a syntax error.
    fn expect(&mut self, kind: TokenKind) -> ParseResult<SpannedToken> {
        if self.check(kind) {
            Ok(self.next())
        } else {
            Err(self.unexpected(kind))
        }
    }

    /// Creates an unexpected token error for the current token.
    fn unexpected(&self, expected: impl Into<Expected>) -> SyntaxError {
        let expected = expected.into();
        let position = self.current_token.position;
        match &self.current_token.token {
            Token::Eof => SyntaxError::UnexpectedEndOfInput { expected, position },
            found => SyntaxError::UnexpectedToken {
                found: found.clone(),
                expected,
                position,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOperator, Expr, Literal, Stmt};
    use crate::lexer::tokenize;

    fn parse_err(source: &str) -> SyntaxError {
        parse(tokenize(source).unwrap()).unwrap_err()
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(parse(tokenize("").unwrap()), Ok(Program::default()));
        assert_eq!(
            parse(tokenize("  // nothing\n").unwrap()),
            Ok(Program::default())
        );
        assert_eq!(parse(Vec::new()), Ok(Program::default()));
    }

    #[test]
    fn test_statement_list() {
        let program = parse(tokenize("1; 2 + 3;").unwrap()).unwrap();
        assert_eq!(
            program.body,
            vec![
                Stmt::Expression {
                    expression: Expr::Literal(Literal::Int(1)),
                },
                Stmt::Expression {
                    expression: Expr::Binary {
                        op: BinaryOperator::Add,
                        left: Box::new(Expr::Literal(Literal::Int(2))),
                        right: Box::new(Expr::Literal(Literal::Int(3))),
                    },
                },
            ]
        );
    }

    #[test]
    fn test_unexpected_end_of_input() {
        let err = parse_err("let x = 1");
        assert_eq!(
            err,
            SyntaxError::UnexpectedEndOfInput {
                expected: Expected::Token(TokenKind::Semi),
                position: Position {
                    line: 1,
                    column: 9,
                    offset: 9
                },
            }
        );
        assert_eq!(
            err.to_string(),
            "unexpected end of input, expected \";\" at 1:9"
        );

        assert!(matches!(
            parse_err("{ let x;"),
            SyntaxError::UnexpectedEndOfInput {
                expected: Expected::Token(TokenKind::CloseBrace),
                ..
            }
        ));
    }

    #[test]
    fn test_unexpected_token() {
        let err = parse_err("let x = ;");
        assert_eq!(
            err,
            SyntaxError::UnexpectedToken {
                found: Token::Semi,
                expected: Expected::Expression,
                position: Position {
                    line: 1,
                    column: 8,
                    offset: 8
                },
            }
        );
        assert_eq!(
            err.to_string(),
            "unexpected token \";\", expected expression at 1:8"
        );

        assert!(matches!(
            parse_err("let 1 = 2;"),
            SyntaxError::UnexpectedToken {
                found: Token::Integer(1),
                expected: Expected::Token(TokenKind::Identifier),
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = parse_err("1 + 2 = 3;");
        match &err {
            SyntaxError::InvalidAssignmentTarget { node, position } => {
                assert_eq!(node.kind(), "BinaryExpression");
                assert_eq!(position.column, 6);
            }
            err => panic!("unexpected error {:?}", err),
        }
        assert!(err
            .to_string()
            .contains("BinaryExpression; expected: Identifier, MemberExpression"));

        assert!(matches!(
            parse_err("f() = 1;"),
            SyntaxError::InvalidAssignmentTarget { .. }
        ));
    }
}
