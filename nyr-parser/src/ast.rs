//! Abstract syntax tree.
//!
//! Every node serializes to a map tagged with its node name under the `"type"` key, for example
//! `{"type": "BinaryExpression", "op": "+", "left": ..., "right": ...}`.

use serde::{Deserialize, Serialize};

/// The root of every parsed source file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Program")]
pub struct Program {
    pub body: Vec<Stmt>,
}

impl Program {
    /// Serializes the tree as pretty printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Reads back a tree produced by [`Program::to_json`].
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// A name in declaration position (variable, parameter, function or class name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Identifier")]
pub struct Identifier {
    pub name: String,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A `{ ... }` block in function and class bodies.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename = "BlockStatement")]
pub struct Block {
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "VariableDeclaration")]
pub struct VariableDeclaration {
    pub id: Identifier,
    /// `None` declares the variable as `null`.
    pub init: Option<Expr>,
}

/// The signature of a function known to the parser when a call was parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<Identifier>,
}

impl FunctionSignature {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Stmt {
    #[serde(rename = "EmptyStatement")]
    Empty,
    #[serde(rename = "BlockStatement")]
    Block { body: Vec<Stmt> },
    #[serde(rename = "VariableStatement")]
    Variable {
        declarations: Vec<VariableDeclaration>,
    },
    #[serde(rename = "IfStatement")]
    If {
        test: Expr,
        consequent: Box<Stmt>,
        alternative: Option<Box<Stmt>>,
    },
    #[serde(rename = "WhileStatement")]
    While { test: Expr, body: Box<Stmt> },
    #[serde(rename = "DoWhileStatement")]
    DoWhile { body: Box<Stmt>, test: Expr },
    #[serde(rename = "ForStatement")]
    For {
        /// Either a [`Stmt::Variable`] or a [`Stmt::Expression`].
        init: Option<Box<Stmt>>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    #[serde(rename = "ReturnStatement")]
    Return { argument: Option<Expr> },
    #[serde(rename = "FunctionDeclaration")]
    Function {
        name: Identifier,
        params: Vec<Identifier>,
        body: Block,
    },
    #[serde(rename = "ClassDeclaration")]
    Class {
        id: Identifier,
        #[serde(rename = "superClass")]
        super_class: Option<Identifier>,
        body: Block,
    },
    #[serde(rename = "ExpressionStatement")]
    Expression { expression: Expr },
}

impl Stmt {
    /// Returns the node name used in the serialized tree.
    pub fn kind(&self) -> &'static str {
        match self {
            Stmt::Empty => "EmptyStatement",
            Stmt::Block { .. } => "BlockStatement",
            Stmt::Variable { .. } => "VariableStatement",
            Stmt::If { .. } => "IfStatement",
            Stmt::While { .. } => "WhileStatement",
            Stmt::DoWhile { .. } => "DoWhileStatement",
            Stmt::For { .. } => "ForStatement",
            Stmt::Return { .. } => "ReturnStatement",
            Stmt::Function { .. } => "FunctionDeclaration",
            Stmt::Class { .. } => "ClassDeclaration",
            Stmt::Expression { .. } => "ExpressionStatement",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expr {
    /// An identifier (e.g. `foo`).
    Identifier { name: String },
    Literal(Literal),
    /// An arithmetic, equality or relational expression (e.g. `1+1`).
    #[serde(rename = "BinaryExpression")]
    Binary {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `&&` or `||`.
    #[serde(rename = "LogicalExpression")]
    Logical {
        op: LogicalOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    #[serde(rename = "BitwiseExpression")]
    Bitwise {
        op: BitwiseOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    #[serde(rename = "AssignmentExpression")]
    Assignment {
        op: AssignmentOperator,
        /// Either an [`Expr::Identifier`] or an [`Expr::Member`].
        target: Box<Expr>,
        value: Box<Expr>,
    },
    #[serde(rename = "UnaryExpression")]
    Unary {
        op: UnaryOperator,
        argument: Box<Expr>,
    },
    /// `object.property` or, when `computed`, `object[property]`.
    #[serde(rename = "MemberExpression")]
    Member {
        computed: bool,
        object: Box<Expr>,
        property: Box<Expr>,
    },
    #[serde(rename = "CallExpression")]
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
        #[serde(rename = "resolvedFn")]
        resolved: Option<FunctionSignature>,
    },
    #[serde(rename = "ThisExpression")]
    This,
    Super,
}

impl Expr {
    /// Returns the node name used in the serialized tree.
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Identifier { .. } => "Identifier",
            Expr::Literal(_) => "Literal",
            Expr::Binary { .. } => "BinaryExpression",
            Expr::Logical { .. } => "LogicalExpression",
            Expr::Bitwise { .. } => "BitwiseExpression",
            Expr::Assignment { .. } => "AssignmentExpression",
            Expr::Unary { .. } => "UnaryExpression",
            Expr::Member { .. } => "MemberExpression",
            Expr::Call { .. } => "CallExpression",
            Expr::This => "ThisExpression",
            Expr::Super => "Super",
        }
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Expr::Identifier { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Null,
}

/// Generates an operator enum that serializes as its source spelling.
macro_rules! operator_enum {
    ($(#[$meta: meta])* $name: ident { $($variant: ident => $symbol: literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $symbol)]
                $variant,
            )*
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $symbol,)*
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

operator_enum!(BinaryOperator {
    Add => "+",
    Sub => "-",
    Mul => "*",
    Div => "/",
    Mod => "%",
    Eq => "==",
    NotEq => "!=",
    Lt => "<",
    LtEq => "<=",
    Gt => ">",
    GtEq => ">=",
});

operator_enum!(LogicalOperator {
    And => "&&",
    Or => "||",
});

operator_enum!(BitwiseOperator {
    And => "&",
    Xor => "^",
    Or => "|",
});

operator_enum!(
    /// `=` or a compound assignment.
    AssignmentOperator {
        Assign => "=",
        AddAssign => "+=",
        SubAssign => "-=",
        MulAssign => "*=",
        DivAssign => "/=",
        ModAssign => "%=",
    }
);

operator_enum!(UnaryOperator {
    Plus => "+",
    Minus => "-",
    Not => "!",
});

impl AssignmentOperator {
    /// Returns the binary operator applied by a compound assignment, `None` for `=`.
    pub fn binary_operator(self) -> Option<BinaryOperator> {
        match self {
            AssignmentOperator::Assign => None,
            AssignmentOperator::AddAssign => Some(BinaryOperator::Add),
            AssignmentOperator::SubAssign => Some(BinaryOperator::Sub),
            AssignmentOperator::MulAssign => Some(BinaryOperator::Mul),
            AssignmentOperator::DivAssign => Some(BinaryOperator::Div),
            AssignmentOperator::ModAssign => Some(BinaryOperator::Mod),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(val: i64) -> Box<Expr> {
        Box::new(Expr::Literal(Literal::Int(val)))
    }

    #[test]
    fn test_binary_expression_json() {
        let program = Program {
            body: vec![Stmt::Expression {
                expression: Expr::Binary {
                    op: BinaryOperator::Add,
                    left: int(1),
                    right: int(2),
                },
            }],
        };
        let json: serde_json::Value = serde_json::to_value(&program).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "Program",
                "body": [{
                    "type": "ExpressionStatement",
                    "expression": {
                        "type": "BinaryExpression",
                        "op": "+",
                        "left": {"type": "Literal", "kind": "Int", "value": 1},
                        "right": {"type": "Literal", "kind": "Int", "value": 2},
                    },
                }],
            })
        );
    }

    #[test]
    fn test_every_field_is_serialized() {
        let stmt = Stmt::Variable {
            declarations: vec![VariableDeclaration {
                id: Identifier::new("x"),
                init: None,
            }],
        };
        let json = serde_json::to_value(&stmt).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "VariableStatement",
                "declarations": [{
                    "type": "VariableDeclaration",
                    "id": {"type": "Identifier", "name": "x"},
                    "init": null,
                }],
            })
        );

        let call = Expr::Call {
            callee: Box::new(Expr::identifier("f")),
            arguments: Vec::new(),
            resolved: None,
        };
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["resolvedFn"], serde_json::Value::Null);
        assert_eq!(json["callee"]["type"], "Identifier");
    }

    #[test]
    fn test_literals_json() {
        let null = serde_json::to_value(&Expr::Literal(Literal::Null)).unwrap();
        assert_eq!(null, serde_json::json!({"type": "Literal", "kind": "Null"}));

        let float = serde_json::to_value(&Expr::Literal(Literal::Float(1.5))).unwrap();
        assert_eq!(
            float,
            serde_json::json!({"type": "Literal", "kind": "Float", "value": 1.5})
        );
    }

    #[test]
    fn test_json_round_trip() {
        let program = Program {
            body: vec![
                Stmt::Empty,
                Stmt::Function {
                    name: Identifier::new("f"),
                    params: vec![Identifier::new("a")],
                    body: Block {
                        body: vec![Stmt::Return {
                            argument: Some(Expr::Unary {
                                op: UnaryOperator::Minus,
                                argument: Box::new(Expr::Literal(Literal::Float(2.0))),
                            }),
                        }],
                    },
                },
                Stmt::Expression {
                    expression: Expr::Assignment {
                        op: AssignmentOperator::AddAssign,
                        target: Box::new(Expr::identifier("x")),
                        value: Box::new(Expr::Literal(Literal::String("s".to_string()))),
                    },
                },
            ],
        };

        let json = program.to_json().unwrap();
        let parsed = Program::from_json(&json).unwrap();
        assert_eq!(parsed, program);
        assert_eq!(parsed.to_json().unwrap(), json);
    }

    #[test]
    fn test_compound_assignment_operator() {
        assert_eq!(
            AssignmentOperator::ModAssign.binary_operator(),
            Some(BinaryOperator::Mod)
        );
        assert_eq!(AssignmentOperator::Assign.binary_operator(), None);
        assert_eq!(BinaryOperator::LtEq.to_string(), "<=");
    }
}
