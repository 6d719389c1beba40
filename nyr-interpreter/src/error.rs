//! Runtime errors.

use std::fmt;

use nyr_parser::ast::UnaryOperator;

/// The statement that exceeded the iteration limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    While,
    DoWhile,
    For,
}

impl fmt::Display for LoopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoopKind::While => "while",
            LoopKind::DoWhile => "do-while",
            LoopKind::For => "for",
        })
    }
}

/// Represents an error raised while evaluating a program.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    AlreadyDeclaredVariable {
        name: String,
    },
    UndeclaredVariable {
        name: String,
    },
    AlreadyDeclaredFunction {
        name: String,
    },
    UnknownFunction {
        name: String,
    },
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    DivideByZero,
    UnaryOnNull {
        operator: UnaryOperator,
    },
    /// A condition, logical operand or unary operand of the wrong type.
    TypeMismatch {
        expected: &'static str,
        got: &'static str,
    },
    /// A binary or bitwise operator applied to operands it is not defined for.
    UnsupportedOperands {
        operator: &'static str,
        left: &'static str,
        right: &'static str,
    },
    IterationLimitExceeded {
        loop_kind: LoopKind,
        limit: usize,
    },
    RecursionLimitExceeded {
        function_name: String,
        limit: usize,
    },
    IntegerOverflow {
        operator: &'static str,
    },
    /// Syntax the interpreter does not execute (classes, `this`, `super`, member access).
    Unsupported {
        feature: &'static str,
    },
    /// The thread running the program could not be started with a stack of `size` bytes.
    StackUnavailable {
        size: usize,
    },
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::AlreadyDeclaredVariable { name } => {
                write!(f, "Variable \"{}\" already exists in available scope", name)
            }
            RuntimeError::UndeclaredVariable { name } => {
                write!(f, "Variable \"{}\" does not exist in available scope", name)
            }
            RuntimeError::AlreadyDeclaredFunction { name } => {
                write!(f, "Function \"{}\" already exists in available scope", name)
            }
            RuntimeError::UnknownFunction { name } => {
                write!(f, "Function \"{}\" does not exist in available scope", name)
            }
            RuntimeError::ArityMismatch {
                name,
                expected,
                got,
            } => write!(
                f,
                "Incorrect amount of arguments given to \"{}\". Expected {}, got {}",
                name, expected, got
            ),
            RuntimeError::DivideByZero => f.write_str("Cannot divide by 0"),
            RuntimeError::UnaryOnNull { operator } => {
                write!(f, "Cannot use {} on \"null\"", operator)
            }
            RuntimeError::TypeMismatch { expected, got } => {
                write!(f, "Expected {}, got {} instead", expected, got)
            }
            RuntimeError::UnsupportedOperands {
                operator,
                left,
                right,
            } => write!(
                f,
                "Unsupported operand types for {}: {} and {}",
                operator, left, right
            ),
            RuntimeError::IterationLimitExceeded { loop_kind, limit } => {
                write!(f, "Exceeded {} iterations in {} statement", limit, loop_kind)
            }
            RuntimeError::RecursionLimitExceeded {
                function_name,
                limit,
            } => write!(
                f,
                "Exceeded recursion depth of {} in function \"{}\"",
                limit, function_name
            ),
            RuntimeError::IntegerOverflow { operator } => {
                write!(f, "Integer overflow in {}", operator)
            }
            RuntimeError::Unsupported { feature } => {
                write!(f, "Unsupported feature: {}", feature)
            }
            RuntimeError::StackUnavailable { size } => {
                write!(f, "Could not reserve {} bytes of stack to run the program", size)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(RuntimeError::DivideByZero.to_string(), "Cannot divide by 0");
        assert_eq!(
            RuntimeError::IterationLimitExceeded {
                loop_kind: LoopKind::DoWhile,
                limit: 65536
            }
            .to_string(),
            "Exceeded 65536 iterations in do-while statement"
        );
        assert_eq!(
            RuntimeError::RecursionLimitExceeded {
                function_name: "f".to_string(),
                limit: 128
            }
            .to_string(),
            "Exceeded recursion depth of 128 in function \"f\""
        );
        assert_eq!(
            RuntimeError::UnaryOnNull {
                operator: UnaryOperator::Minus
            }
            .to_string(),
            "Cannot use - on \"null\""
        );
        assert_eq!(
            RuntimeError::ArityMismatch {
                name: "f".to_string(),
                expected: 1,
                got: 2
            }
            .to_string(),
            "Incorrect amount of arguments given to \"f\". Expected 1, got 2"
        );
        assert_eq!(
            RuntimeError::StackUnavailable { size: 1024 }.to_string(),
            "Could not reserve 1024 bytes of stack to run the program"
        );
    }
}
