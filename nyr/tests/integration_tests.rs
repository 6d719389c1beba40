use nyr::{Bindings, Error, Limits, LoopKind, RuntimeError, Value};
use nyr_parser::ast::{BinaryOperator, Expr, Literal, Program, Stmt};
use nyr_parser::{tokenize, LexError, SyntaxError};

fn interpret(source: &str) -> Bindings {
    match nyr::run(source) {
        Ok(bindings) => bindings,
        Err(err) => panic!("{}", err),
    }
}

fn runtime_error(source: &str) -> RuntimeError {
    match nyr::run(source) {
        Err(Error::Runtime(err)) => err,
        result => panic!("expected a runtime error, got {:?}", result),
    }
}

fn bindings(entries: &[(&str, Value)]) -> Bindings {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

fn single_expression(program: &Program) -> &Expr {
    match program.body.as_slice() {
        [Stmt::Expression { expression }] => expression,
        body => panic!("expected a single expression statement, got {:?}", body),
    }
}

mod demos {
    use super::*;

    #[test]
    fn factorial() {
        assert_eq!(
            interpret(include_str!("../../demos/Factorial.nyr")),
            bindings(&[("fac1", Value::Int(1)), ("fac10", Value::Int(3628800))])
        );
    }

    #[test]
    fn fibonacci() {
        assert_eq!(
            interpret(include_str!("../../demos/Fibonacci.nyr")),
            bindings(&[("fib1", Value::Int(1)), ("fib10", Value::Int(55))])
        );
    }

    #[test]
    fn functions() {
        assert_eq!(
            interpret(include_str!("../../demos/Functions.nyr")),
            bindings(&[
                ("twoSquared", Value::Int(4)),
                ("tenSquared", Value::Int(100)),
                ("fourCubed", Value::Int(64)),
            ])
        );
    }

    #[test]
    fn variables() {
        assert_eq!(
            interpret(include_str!("../../demos/Variables.nyr")),
            bindings(&[
                ("a", Value::from("Hello")),
                ("b", Value::from("Hello, World!")),
                ("x", Value::Int(10)),
                ("y", Value::Int(7)),
                ("z", Value::Bool(false)),
            ])
        );
    }
}

#[test]
fn token_spans_cover_input() {
    let source = "let total = 0;\nfor (let i = 0; i < 10; i += 1) {\n\ttotal += i * 2.5;\n}";
    let tokens = tokenize(source).unwrap();
    let concatenated: String = tokens
        .iter()
        .map(|token| &source[token.span.clone()])
        .collect();
    let expected: String = source.split_whitespace().collect();
    assert_eq!(concatenated, expected);
}

#[test]
fn precedence() {
    let program = nyr::parse_source("1 + 2 * 3;").unwrap();
    assert_eq!(
        single_expression(&program),
        &Expr::Binary {
            op: BinaryOperator::Add,
            left: Box::new(Expr::Literal(Literal::Int(1))),
            right: Box::new(Expr::Binary {
                op: BinaryOperator::Mul,
                left: Box::new(Expr::Literal(Literal::Int(2))),
                right: Box::new(Expr::Literal(Literal::Int(3))),
            }),
        }
    );

    let program = nyr::parse_source("(1 + 2) * 3;").unwrap();
    match single_expression(&program) {
        Expr::Binary {
            op: BinaryOperator::Mul,
            left,
            ..
        } => assert_eq!(left.kind(), "BinaryExpression"),
        expr => panic!("unexpected expression {:?}", expr),
    }
}

#[test]
fn associativity() {
    let program = nyr::parse_source("1 * 2 * 3;").unwrap();
    match single_expression(&program) {
        Expr::Binary { left, right, .. } => {
            assert_eq!(left.kind(), "BinaryExpression");
            assert_eq!(**right, Expr::Literal(Literal::Int(3)));
        }
        expr => panic!("unexpected expression {:?}", expr),
    }

    let program = nyr::parse_source("x = y = 42;").unwrap();
    match single_expression(&program) {
        Expr::Assignment { target, value, .. } => {
            assert_eq!(**target, Expr::identifier("x"));
            assert_eq!(value.kind(), "AssignmentExpression");
        }
        expr => panic!("unexpected expression {:?}", expr),
    }
}

#[test]
fn division() {
    assert_eq!(interpret("let r = 9 / 3;").get("r"), Some(&Value::Int(3)));
    assert_eq!(interpret("let r = 3 / 2;").get("r"), Some(&Value::Float(1.5)));
    assert_eq!(runtime_error("1 / 0;"), RuntimeError::DivideByZero);
    assert_eq!(runtime_error("1 / 0;").to_string(), "Cannot divide by 0");
}

#[test]
fn scoping() {
    assert_eq!(
        runtime_error(
            r#"
            let counter = 0;
            def bump() {
                counter += 1;
            }
            bump();"#
        ),
        RuntimeError::UndeclaredVariable {
            name: "counter".to_string()
        }
    );
    assert_eq!(
        runtime_error("let x; let x;"),
        RuntimeError::AlreadyDeclaredVariable {
            name: "x".to_string()
        }
    );
}

#[test]
fn for_init_declarations_stay_in_loop() {
    assert_eq!(
        interpret(
            r#"
            let x = 0;
            for (let i = 0; i < 10; i += 2) {
                x += i;
            }"#
        ),
        bindings(&[("x", Value::Int(20))])
    );
}

mod limits {
    use super::*;

    #[test]
    fn iterations() {
        assert_eq!(
            runtime_error("for (;;) { }"),
            RuntimeError::IterationLimitExceeded {
                loop_kind: LoopKind::For,
                limit: 65536
            }
        );

        let limits = Limits {
            max_iterations: 100,
            ..Limits::default()
        };
        assert!(nyr::run_with_limits("let i = 0; while (i < 100) { i += 1; }", limits).is_ok());
        assert_eq!(
            nyr::run_with_limits("let i = 0; while (i < 101) { i += 1; }", limits),
            Err(Error::Runtime(RuntimeError::IterationLimitExceeded {
                loop_kind: LoopKind::While,
                limit: 100
            }))
        );
    }

    #[test]
    fn recursion() {
        assert_eq!(
            nyr::run("def forever(n) { return forever(n + 1); } forever(0);"),
            Err(Error::Runtime(RuntimeError::RecursionLimitExceeded {
                function_name: "forever".to_string(),
                limit: 128
            }))
        );
    }

    #[test]
    fn recursion_through_loops_and_blocks() {
        assert_eq!(
            runtime_error(
                r#"
                def f(n) {
                    while (true) {
                        if (true) {
                            {
                                return f(n + 1);
                            }
                        }
                    }
                }
                f(0);"#
            ),
            RuntimeError::RecursionLimitExceeded {
                function_name: "f".to_string(),
                limit: 128
            }
        );
    }
}

#[test]
fn serialization_is_stable() {
    for source in &[
        include_str!("../../demos/Factorial.nyr"),
        include_str!("../../demos/Variables.nyr"),
        "class A : B { def f() { return this.x[\"y\"]; } } let f = 1.25; do ; while (!true | false);",
    ] {
        let json = nyr::parse_source(source).unwrap().to_json().unwrap();
        let reparsed = Program::from_json(&json).unwrap();
        assert_eq!(reparsed.to_json().unwrap(), json);
    }
}

#[test]
fn unbound_identifier_falls_back_to_its_name() {
    assert_eq!(
        interpret("let greeting = hello;").get("greeting"),
        Some(&Value::from("hello"))
    );
}

#[test]
fn errors_carry_positions() {
    match nyr::run("let s = \"abc;") {
        Err(err @ Error::Lex(LexError::UnterminatedString { .. })) => {
            assert_eq!(err.position().map(|position| position.column), Some(8));
        }
        result => panic!("expected a lex error, got {:?}", result),
    }

    match nyr::run("let x = 1;\nlet y = ;") {
        Err(Error::Syntax(err @ SyntaxError::UnexpectedToken { .. })) => {
            assert_eq!(err.position().line, 2);
            assert_eq!(
                err.to_string(),
                "unexpected token \";\", expected expression at 2:8"
            );
        }
        result => panic!("expected a syntax error, got {:?}", result),
    }

    assert_eq!(Error::from(RuntimeError::DivideByZero).position(), None);
}
