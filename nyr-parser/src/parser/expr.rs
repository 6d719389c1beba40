use super::*;
use crate::ast::{
    AssignmentOperator, BinaryOperator, BitwiseOperator, Expr, Identifier, Literal,
    LogicalOperator, UnaryOperator,
};

impl Parser {
    /* Expressions */
    /// Parses any expression.
    /// This is equivalent to calling [`Self::parse_assignment_expr`].
    pub fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_assignment_expr()
    }

    /// Parses an assignment expression. Assignment is right associative (`a = b = c` is `a = (b = c)`).
    pub fn parse_assignment_expr(&mut self) -> ParseResult<Expr> {
        let left = self.parse_logical_or_expr()?;

        let op = match assignment_operator(&self.current_token.token) {
            Some(op) => op,
            None => return Ok(left),
        };
        match left {
            Expr::Identifier { .. } | Expr::Member { .. } => {}
            _ => {
                return Err(SyntaxError::InvalidAssignmentTarget {
                    node: Box::new(left),
                    position: self.current_token.position,
                })
            }
        }
        self.next(); // eat operator

        let value = self.parse_assignment_expr()?;
        Ok(Expr::Assignment {
            op,
            target: Box::new(left),
            value: Box::new(value),
        })
    }

    /// Parses one precedence level of left associative binary operators.
    /// `operand` parses the next (tighter binding) level and `operator` maps the lookahead to this level's operator.
    fn parse_binary_level<O>(
        &mut self,
        operand: fn(&mut Self) -> ParseResult<Expr>,
        operator: fn(&Token) -> Option<O>,
        build: fn(O, Box<Expr>, Box<Expr>) -> Expr,
    ) -> ParseResult<Expr> {
        let mut left = operand(self)?;

        while let Some(op) = operator(&self.current_token.token) {
            self.next(); // eat operator
            let right = operand(self)?;
            left = build(op, Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    fn parse_logical_or_expr(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(
            Self::parse_logical_and_expr,
            |token| match token {
                Token::OrOr => Some(LogicalOperator::Or),
                _ => None,
            },
            logical,
        )
    }

    fn parse_logical_and_expr(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(
            Self::parse_bitwise_or_expr,
            |token| match token {
                Token::AndAnd => Some(LogicalOperator::And),
                _ => None,
            },
            logical,
        )
    }

    fn parse_bitwise_or_expr(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(
            Self::parse_bitwise_xor_expr,
            |token| match token {
                Token::Pipe => Some(BitwiseOperator::Or),
                _ => None,
            },
            bitwise,
        )
    }

    fn parse_bitwise_xor_expr(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(
            Self::parse_bitwise_and_expr,
            |token| match token {
                Token::Caret => Some(BitwiseOperator::Xor),
                _ => None,
            },
            bitwise,
        )
    }

    fn parse_bitwise_and_expr(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(
            Self::parse_equality_expr,
            |token| match token {
                Token::Ampersand => Some(BitwiseOperator::And),
                _ => None,
            },
            bitwise,
        )
    }

    fn parse_equality_expr(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(
            Self::parse_relational_expr,
            |token| match token {
                Token::EqualsEquals => Some(BinaryOperator::Eq),
                Token::NotEquals => Some(BinaryOperator::NotEq),
                _ => None,
            },
            binary,
        )
    }

    fn parse_relational_expr(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(
            Self::parse_additive_expr,
            |token| match token {
                Token::LessThan => Some(BinaryOperator::Lt),
                Token::LessThanEquals => Some(BinaryOperator::LtEq),
                Token::GreaterThan => Some(BinaryOperator::Gt),
                Token::GreaterThanEquals => Some(BinaryOperator::GtEq),
                _ => None,
            },
            binary,
        )
    }

    fn parse_additive_expr(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(
            Self::parse_multiplicative_expr,
            |token| match token {
                Token::Plus => Some(BinaryOperator::Add),
                Token::Minus => Some(BinaryOperator::Sub),
                _ => None,
            },
            binary,
        )
    }

    fn parse_multiplicative_expr(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(
            Self::parse_unary_expr,
            |token| match token {
                Token::Asterisk => Some(BinaryOperator::Mul),
                Token::Slash => Some(BinaryOperator::Div),
                Token::Percent => Some(BinaryOperator::Mod),
                _ => None,
            },
            binary,
        )
    }

    /// Parses a prefix `+`, `-` or `!` expression.
    fn parse_unary_expr(&mut self) -> ParseResult<Expr> {
        let op = match self.current_token.token {
            Token::Plus => UnaryOperator::Plus,
            Token::Minus => UnaryOperator::Minus,
            Token::Bang => UnaryOperator::Not,
            _ => return self.parse_left_hand_side_expr(),
        };
        self.next(); // eat operator

        Ok(Expr::Unary {
            op,
            argument: Box::new(self.parse_unary_expr()?),
        })
    }

    /// Parses a primary expression followed by any run of `.name`, `[expr]` and `(args)` suffixes.
    fn parse_left_hand_side_expr(&mut self) -> ParseResult<Expr> {
        let mut expr = if self.eat(TokenKind::Super) {
            if !self.check(TokenKind::OpenParen) {
                return Err(self.unexpected(TokenKind::OpenParen));
            }
            Expr::Super
        } else {
            self.parse_primary_expr()?
        };

        loop {
            match self.current_token.kind() {
                TokenKind::Dot => {
                    self.next();
                    let property = self.parse_identifier()?;
                    expr = Expr::Member {
                        computed: false,
                        object: Box::new(expr),
                        property: Box::new(Expr::Identifier {
                            name: property.name,
                        }),
                    };
                }
                TokenKind::OpenBracket => {
                    self.next();
                    let property = self.parse_expr()?;
                    self.expect(TokenKind::CloseBracket)?;
                    expr = Expr::Member {
                        computed: true,
                        object: Box::new(expr),
                        property: Box::new(property),
                    };
                }
                TokenKind::OpenParen => {
                    let arguments = self.parse_arguments()?;
                    let resolved = match &expr {
                        Expr::Identifier { name } => self.functions.get(name).cloned(),
                        _ => None,
                    };
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        arguments,
                        resolved,
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Parses `(a, b, ...)`.
    fn parse_arguments(&mut self) -> ParseResult<Vec<Expr>> {
        self.expect(TokenKind::OpenParen)?;

        let mut arguments = Vec::new();
        if self.eat(TokenKind::CloseParen) {
            return Ok(arguments);
        }
        loop {
            arguments.push(self.parse_assignment_expr()?);

            if self.eat(TokenKind::CloseParen) {
                break;
            }
            self.expect(TokenKind::Comma)?;
        }

        Ok(arguments)
    }

    /// Parses a literal, a parenthesized expression, an identifier or `this`.
    fn parse_primary_expr(&mut self) -> ParseResult<Expr> {
        let literal = match &self.current_token.token {
            Token::Integer(val) => Literal::Int(*val),
            Token::Float(val) => Literal::Float(*val),
            Token::String(val) => Literal::String(val.clone()),
            Token::True => Literal::Bool(true),
            Token::False => Literal::Bool(false),
            Token::Null => Literal::Null,
            Token::OpenParen => {
                self.next();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::CloseParen)?;
                return Ok(expr);
            }
            Token::Identifier(_) => {
                let Identifier { name } = self.parse_identifier()?;
                return Ok(Expr::Identifier { name });
            }
            Token::This => {
                self.next();
                return Ok(Expr::This);
            }
            _ => return Err(self.unexpected(Expected::Expression)),
        };
        self.next(); // eat literal

        Ok(Expr::Literal(literal))
    }

    pub fn parse_identifier(&mut self) -> ParseResult<Identifier> {
        match self.expect(TokenKind::Identifier)?.token {
            Token::Identifier(name) => Ok(Identifier { name }),
            _ => unreachable!(),
        }
    }
}

fn assignment_operator(token: &Token) -> Option<AssignmentOperator> {
    match token {
        Token::Equals => Some(AssignmentOperator::Assign),
        Token::PlusEquals => Some(AssignmentOperator::AddAssign),
        Token::MinusEquals => Some(AssignmentOperator::SubAssign),
        Token::AsteriskEquals => Some(AssignmentOperator::MulAssign),
        Token::SlashEquals => Some(AssignmentOperator::DivAssign),
        Token::PercentEquals => Some(AssignmentOperator::ModAssign),
        _ => None,
    }
}

fn binary(op: BinaryOperator, left: Box<Expr>, right: Box<Expr>) -> Expr {
    Expr::Binary { op, left, right }
}

fn logical(op: LogicalOperator, left: Box<Expr>, right: Box<Expr>) -> Expr {
    Expr::Logical { op, left, right }
}

fn bitwise(op: BitwiseOperator, left: Box<Expr>, right: Box<Expr>) -> Expr {
    Expr::Bitwise { op, left, right }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use insta::assert_debug_snapshot;

    fn expr(source: &str) -> Expr {
        let mut parser = Parser::new(tokenize(source).unwrap());
        let ast = parser.parse_expr().unwrap();
        assert!(parser.check(TokenKind::Eof), "trailing input in {:?}", source);
        ast
    }

    fn int(val: i64) -> Box<Expr> {
        Box::new(Expr::Literal(Literal::Int(val)))
    }

    fn ident(name: &str) -> Box<Expr> {
        Box::new(Expr::identifier(name))
    }

    #[test]
    fn test_literal() {
        assert_eq!(expr("42"), Expr::Literal(Literal::Int(42)));
        assert_eq!(expr("2.5"), Expr::Literal(Literal::Float(2.5)));
        assert_eq!(
            expr("\"hello\""),
            Expr::Literal(Literal::String("hello".to_string()))
        );
        assert_eq!(expr("true"), Expr::Literal(Literal::Bool(true)));
        assert_eq!(expr("false"), Expr::Literal(Literal::Bool(false)));
        assert_eq!(expr("null"), Expr::Literal(Literal::Null));
    }

    #[test]
    fn test_binary_expr() {
        assert_debug_snapshot!("binary-precedence", expr("1 + 2 * 3"));
        assert_debug_snapshot!("binary-associativity", expr("1 * 2 * 3")); // should be (1 * 2) * 3
        assert_eq!(
            expr("(1 + 2) * 3"),
            Expr::Binary {
                op: BinaryOperator::Mul,
                left: Box::new(Expr::Binary {
                    op: BinaryOperator::Add,
                    left: int(1),
                    right: int(2),
                }),
                right: int(3),
            }
        );
        assert_eq!(
            expr("x % 2 == 0"),
            Expr::Binary {
                op: BinaryOperator::Eq,
                left: Box::new(Expr::Binary {
                    op: BinaryOperator::Mod,
                    left: ident("x"),
                    right: int(2),
                }),
                right: int(0),
            }
        );
    }

    #[test]
    fn test_relational_binds_tighter_than_equality() {
        assert_eq!(
            expr("a < b == c >= d"),
            Expr::Binary {
                op: BinaryOperator::Eq,
                left: Box::new(Expr::Binary {
                    op: BinaryOperator::Lt,
                    left: ident("a"),
                    right: ident("b"),
                }),
                right: Box::new(Expr::Binary {
                    op: BinaryOperator::GtEq,
                    left: ident("c"),
                    right: ident("d"),
                }),
            }
        );
    }

    #[test]
    fn test_logical_and_bitwise_precedence() {
        // `||` < `&&` < `|` < `^` < `&` < `==`
        assert_eq!(
            expr("a || b && c"),
            Expr::Logical {
                op: LogicalOperator::Or,
                left: ident("a"),
                right: Box::new(Expr::Logical {
                    op: LogicalOperator::And,
                    left: ident("b"),
                    right: ident("c"),
                }),
            }
        );
        assert_eq!(
            expr("a | b ^ c & d"),
            Expr::Bitwise {
                op: BitwiseOperator::Or,
                left: ident("a"),
                right: Box::new(Expr::Bitwise {
                    op: BitwiseOperator::Xor,
                    left: ident("b"),
                    right: Box::new(Expr::Bitwise {
                        op: BitwiseOperator::And,
                        left: ident("c"),
                        right: ident("d"),
                    }),
                }),
            }
        );
        assert_eq!(
            expr("a && b | c"),
            Expr::Logical {
                op: LogicalOperator::And,
                left: ident("a"),
                right: Box::new(Expr::Bitwise {
                    op: BitwiseOperator::Or,
                    left: ident("b"),
                    right: ident("c"),
                }),
            }
        );
        assert_eq!(
            expr("a & b == c"),
            Expr::Bitwise {
                op: BitwiseOperator::And,
                left: ident("a"),
                right: Box::new(Expr::Binary {
                    op: BinaryOperator::Eq,
                    left: ident("b"),
                    right: ident("c"),
                }),
            }
        );
    }

    #[test]
    fn test_unary_expr() {
        assert_eq!(
            expr("-x * 2"),
            Expr::Binary {
                op: BinaryOperator::Mul,
                left: Box::new(Expr::Unary {
                    op: UnaryOperator::Minus,
                    argument: ident("x"),
                }),
                right: int(2),
            }
        );
        assert_eq!(
            expr("!!true"),
            Expr::Unary {
                op: UnaryOperator::Not,
                argument: Box::new(Expr::Unary {
                    op: UnaryOperator::Not,
                    argument: Box::new(Expr::Literal(Literal::Bool(true))),
                }),
            }
        );
        assert_eq!(
            expr("+1"),
            Expr::Unary {
                op: UnaryOperator::Plus,
                argument: int(1),
            }
        );
    }

    #[test]
    fn test_assignment_expr() {
        assert_debug_snapshot!("assignment-associativity", expr("x = y = 42")); // should be x = (y = 42)
        assert_eq!(
            expr("x += 1 + 2"),
            Expr::Assignment {
                op: AssignmentOperator::AddAssign,
                target: ident("x"),
                value: Box::new(Expr::Binary {
                    op: BinaryOperator::Add,
                    left: int(1),
                    right: int(2),
                }),
            }
        );
        assert_eq!(
            expr("a.b = 1"),
            Expr::Assignment {
                op: AssignmentOperator::Assign,
                target: Box::new(Expr::Member {
                    computed: false,
                    object: ident("a"),
                    property: ident("b"),
                }),
                value: int(1),
            }
        );
    }

    #[test]
    fn test_member_expr() {
        assert_eq!(
            expr("a.b[\"c\"]"),
            Expr::Member {
                computed: true,
                object: Box::new(Expr::Member {
                    computed: false,
                    object: ident("a"),
                    property: ident("b"),
                }),
                property: Box::new(Expr::Literal(Literal::String("c".to_string()))),
            }
        );
        assert_eq!(expr("this.x").kind(), "MemberExpression");
    }

    #[test]
    fn test_fn_call() {
        assert_eq!(
            expr("foo()"),
            Expr::Call {
                callee: ident("foo"),
                arguments: vec![],
                resolved: None,
            }
        );
        assert_eq!(
            expr("foo(1, bar)"),
            Expr::Call {
                callee: ident("foo"),
                arguments: vec![Expr::Literal(Literal::Int(1)), Expr::identifier("bar")],
                resolved: None,
            }
        );
        // chained
        assert_eq!(
            expr("foo(x)()"),
            Expr::Call {
                callee: Box::new(Expr::Call {
                    callee: ident("foo"),
                    arguments: vec![Expr::identifier("x")],
                    resolved: None,
                }),
                arguments: vec![],
                resolved: None,
            }
        );
        assert_eq!(
            expr("a.b(1)"),
            Expr::Call {
                callee: Box::new(Expr::Member {
                    computed: false,
                    object: ident("a"),
                    property: ident("b"),
                }),
                arguments: vec![Expr::Literal(Literal::Int(1))],
                resolved: None,
            }
        );
    }

    #[test]
    fn test_super_call() {
        assert_eq!(
            expr("super(1)"),
            Expr::Call {
                callee: Box::new(Expr::Super),
                arguments: vec![Expr::Literal(Literal::Int(1))],
                resolved: None,
            }
        );

        let mut parser = Parser::new(tokenize("super.x").unwrap());
        assert!(matches!(
            parser.parse_expr(),
            Err(SyntaxError::UnexpectedToken {
                found: Token::Dot,
                expected: Expected::Token(TokenKind::OpenParen),
                ..
            })
        ));
    }

    #[test]
    fn test_missing_operand() {
        let mut parser = Parser::new(tokenize("1 +").unwrap());
        assert!(matches!(
            parser.parse_expr(),
            Err(SyntaxError::UnexpectedEndOfInput {
                expected: Expected::Expression,
                ..
            })
        ));
    }
}
