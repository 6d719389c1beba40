//! Tree-walking evaluation of a [`Program`].

use std::collections::HashMap;
use std::{panic, thread};

use log::{debug, trace};
use nyr_parser::ast::{
    AssignmentOperator, Block, Expr, FunctionSignature, Identifier, Literal, LogicalOperator,
    Program, Stmt,
};
use nyr_value::Value;

use crate::env::{Bindings, Environment, ScopeId};
use crate::error::{LoopKind, RuntimeError};
use crate::ops;
use crate::stack::{ActivationRecord, CallStack, FrameKind};

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Safety limits bounding runaway programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of times a single loop statement may run its body.
    pub max_iterations: usize,
    /// Maximum nesting level of a call. The program frame is level `1`.
    pub max_recursion_depth: usize,
}

impl Limits {
    pub const DEFAULT_MAX_ITERATIONS: usize = 1 << 16;
    pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 128;
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            max_recursion_depth: Self::DEFAULT_MAX_RECURSION_DEPTH,
        }
    }
}

/// Host stack for the program frame and everything above its first call.
const BASE_STACK_SIZE: usize = 8 * 1024 * 1024;
/// Host stack reserved for every call nesting level.
const STACK_SIZE_PER_LEVEL: usize = 256 * 1024;

/// Stack size of the thread running a program under `limits`.
fn stack_size(limits: &Limits) -> usize {
    STACK_SIZE_PER_LEVEL
        .saturating_mul(limits.max_recursion_depth)
        .saturating_add(BASE_STACK_SIZE)
}

/// How a statement finished.
#[derive(Debug, Clone, PartialEq)]
enum Signal {
    Normal,
    /// `break;` was evaluated. Consumed by the nearest enclosing loop.
    Break,
    Return(Value),
}

#[derive(Debug, Clone, Copy)]
struct FunctionRecord<'ast> {
    params: &'ast [Identifier],
    body: &'ast Block,
}

struct LoopCounter {
    kind: LoopKind,
    limit: usize,
    iterations: usize,
}

impl LoopCounter {
    fn new(kind: LoopKind, limit: usize) -> Self {
        Self {
            kind,
            limit,
            iterations: 0,
        }
    }

    /// Counts one more run of the loop body.
    fn tick(&mut self) -> RuntimeResult<()> {
        if self.iterations >= self.limit {
            return Err(RuntimeError::IterationLimitExceeded {
                loop_kind: self.kind,
                limit: self.limit,
            });
        }
        self.iterations += 1;
        Ok(())
    }
}

pub struct Interpreter<'ast> {
    env: Environment,
    stack: CallStack,
    /// Functions declared so far, by name.
    functions: HashMap<&'ast str, FunctionRecord<'ast>>,
    limits: Limits,
}

impl<'ast> Default for Interpreter<'ast> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'ast> Interpreter<'ast> {
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self {
            env: Environment::new(),
            stack: CallStack::new(),
            functions: HashMap::new(),
            limits,
        }
    }

    /// Runs `program` and returns the variables of its top level scope.
    ///
    /// The program runs on its own thread, with a stack large enough to reach
    /// [`Limits::max_recursion_depth`].
    pub fn interpret(&mut self, program: &'ast Program) -> RuntimeResult<Bindings> {
        let stack_size = stack_size(&self.limits);
        thread::scope(|scope| {
            let spawned = thread::Builder::new()
                .name("nyr-interpreter".to_string())
                .stack_size(stack_size)
                .spawn_scoped(scope, || self.run_program(program));
            match spawned {
                Ok(handle) => handle
                    .join()
                    .unwrap_or_else(|payload| panic::resume_unwind(payload)),
                Err(_) => Err(RuntimeError::StackUnavailable { size: stack_size }),
            }
        })
    }

    fn run_program(&mut self, program: &'ast Program) -> RuntimeResult<Bindings> {
        self.env = Environment::new();
        self.stack = CallStack::new();
        self.functions.clear();

        trace!("enter Program");
        self.with_frame("Program", FrameKind::Program, 1, |this| {
            debug!("{}", this.stack.display(&this.env));
            for stmt in &program.body {
                // signals of top level statements are ignored
                this.exec_stmt(stmt)?;
            }
            Ok(this.env.bindings(this.frame().base_scope).clone())
        })
    }

    fn frame(&self) -> &ActivationRecord {
        self.stack.peek().unwrap() // the program frame is never popped while running
    }

    fn frame_mut(&mut self) -> &mut ActivationRecord {
        self.stack.peek_mut().unwrap()
    }

    fn current_scope(&self) -> ScopeId {
        self.frame().scope
    }

    /// Runs `f` in a new scope nested in the current one. The scope is removed afterwards, even on error.
    fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> RuntimeResult<T>) -> RuntimeResult<T> {
        let parent = self.current_scope();
        let scope = self.env.push_scope(Some(parent));
        self.frame_mut().scope = scope;

        let result = f(self);

        self.frame_mut().scope = parent;
        self.env.unwind(scope);
        result
    }

    /// Runs `f` in a new frame whose base scope has no parent. The frame is popped afterwards, even on error.
    fn with_frame<T>(
        &mut self,
        name: &str,
        kind: FrameKind,
        nesting_level: usize,
        f: impl FnOnce(&mut Self) -> RuntimeResult<T>,
    ) -> RuntimeResult<T> {
        let scope = self.env.push_scope(None);
        self.stack
            .push(ActivationRecord::new(name, kind, nesting_level, scope));

        let result = f(self);

        debug!("{}", self.stack.display(&self.env));
        self.stack.pop();
        self.env.unwind(scope);
        result
    }

    /* Statements */
    fn exec_stmt(&mut self, stmt: &'ast Stmt) -> RuntimeResult<Signal> {
        trace!("enter {}", stmt.kind());
        match stmt {
            Stmt::Empty => Ok(Signal::Normal),
            Stmt::Block { body } => self.exec_block(body),
            Stmt::Variable { declarations } => {
                for declaration in declarations {
                    let value = match &declaration.init {
                        Some(init) => self.eval_expr(init)?,
                        None => Value::Null,
                    };
                    let scope = self.current_scope();
                    self.env.declare(scope, &declaration.id.name, value)?;
                }
                Ok(Signal::Normal)
            }
            Stmt::If {
                test,
                consequent,
                alternative,
            } => {
                if self.eval_condition(test)? {
                    self.exec_stmt(consequent)
                } else if let Some(alternative) = alternative {
                    self.exec_stmt(alternative)
                } else {
                    Ok(Signal::Normal)
                }
            }
            Stmt::While { test, body } => self.exec_while(test, body),
            Stmt::DoWhile { body, test } => self.exec_do_while(body, test),
            Stmt::For {
                init,
                test,
                update,
                body,
            } => self.with_scope(|this| {
                this.exec_for(init.as_deref(), test.as_ref(), update.as_ref(), body)
            }),
            Stmt::Return { argument } => {
                let value = match argument {
                    Some(argument) => self.eval_expr(argument)?,
                    None => Value::Null,
                };
                Ok(Signal::Return(value))
            }
            Stmt::Function { name, params, body } => {
                if self.functions.contains_key(name.name.as_str()) {
                    return Err(RuntimeError::AlreadyDeclaredFunction {
                        name: name.name.clone(),
                    });
                }
                debug!("declaring function {}/{}", name.name, params.len());
                self.functions
                    .insert(name.name.as_str(), FunctionRecord { params, body });
                Ok(Signal::Normal)
            }
            Stmt::Class { .. } => Err(RuntimeError::Unsupported {
                feature: "class declarations",
            }),
            Stmt::Expression { expression } => {
                let value = self.eval_expr(expression)?;
                if is_break(expression, &value) {
                    Ok(Signal::Break)
                } else {
                    Ok(Signal::Normal)
                }
            }
        }
    }

    /// Runs `body` in a new scope, stopping at the first statement that does not finish normally.
    fn exec_block(&mut self, body: &'ast [Stmt]) -> RuntimeResult<Signal> {
        self.with_scope(|this| {
            for stmt in body {
                match this.exec_stmt(stmt)? {
                    Signal::Normal => {}
                    signal => return Ok(signal),
                }
            }
            Ok(Signal::Normal)
        })
    }

    fn exec_while(&mut self, test: &'ast Expr, body: &'ast Stmt) -> RuntimeResult<Signal> {
        let mut counter = LoopCounter::new(LoopKind::While, self.limits.max_iterations);
        while self.eval_condition(test)? {
            counter.tick()?;
            match self.exec_stmt(body)? {
                Signal::Normal => {}
                Signal::Break => break,
                signal => return Ok(signal),
            }
        }
        Ok(Signal::Normal)
    }

    fn exec_do_while(&mut self, body: &'ast Stmt, test: &'ast Expr) -> RuntimeResult<Signal> {
        let mut counter = LoopCounter::new(LoopKind::DoWhile, self.limits.max_iterations);
        loop {
            counter.tick()?;
            match self.exec_stmt(body)? {
                Signal::Normal => {}
                Signal::Break => break,
                signal => return Ok(signal),
            }
            if !self.eval_condition(test)? {
                break;
            }
        }
        Ok(Signal::Normal)
    }

    /// Expects to run in the loop's own scope so that `init` declarations do not leak.
    fn exec_for(
        &mut self,
        init: Option<&'ast Stmt>,
        test: Option<&'ast Expr>,
        update: Option<&'ast Expr>,
        body: &'ast Stmt,
    ) -> RuntimeResult<Signal> {
        if let Some(init) = init {
            self.exec_stmt(init)?;
        }

        let mut counter = LoopCounter::new(LoopKind::For, self.limits.max_iterations);
        loop {
            if let Some(test) = test {
                if !self.eval_condition(test)? {
                    break;
                }
            }
            counter.tick()?;
            match self.exec_stmt(body)? {
                Signal::Normal => {}
                Signal::Break => break,
                signal => return Ok(signal),
            }
            if let Some(update) = update {
                self.eval_expr(update)?;
            }
        }
        Ok(Signal::Normal)
    }

    /* Expressions */
    fn eval_expr(&mut self, expr: &'ast Expr) -> RuntimeResult<Value> {
        trace!("enter {}", expr.kind());
        match expr {
            Expr::Identifier { name } => Ok(self.eval_identifier(name)),
            Expr::Literal(literal) => Ok(literal_value(literal)),
            Expr::Binary { op, left, right } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                ops::binary(*op, left, right)
            }
            Expr::Logical { op, left, right } => {
                let left = self.eval_bool(left)?;
                let result = match op {
                    LogicalOperator::And => left && self.eval_bool(right)?,
                    LogicalOperator::Or => left || self.eval_bool(right)?,
                };
                Ok(Value::Bool(result))
            }
            Expr::Bitwise { op, left, right } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                ops::bitwise(*op, left, right)
            }
            Expr::Assignment { op, target, value } => self.eval_assignment(*op, target, value),
            Expr::Unary { op, argument } => {
                let argument = self.eval_expr(argument)?;
                ops::unary(*op, argument)
            }
            Expr::Call {
                callee,
                arguments,
                resolved,
            } => self.eval_call(callee, arguments, resolved.as_ref()),
            Expr::Member { .. } => Err(RuntimeError::Unsupported {
                feature: "member expressions",
            }),
            Expr::This => Err(RuntimeError::Unsupported { feature: "this" }),
            Expr::Super => Err(RuntimeError::Unsupported { feature: "super" }),
        }
    }

    /// An unbound identifier evaluates to its own name as a string.
    fn eval_identifier(&self, name: &str) -> Value {
        match self.env.get(self.current_scope(), name) {
            Some(value) => value.clone(),
            None => {
                debug!("unbound identifier `{}` evaluates to its name", name);
                Value::Str(name.to_string())
            }
        }
    }

    fn eval_bool(&mut self, expr: &'ast Expr) -> RuntimeResult<bool> {
        let value = self.eval_expr(expr)?;
        value.cast_to_bool().ok_or(RuntimeError::TypeMismatch {
            expected: "bool",
            got: value.type_name(),
        })
    }

    /// Evaluates the test of an `if` or loop statement.
    fn eval_condition(&mut self, test: &'ast Expr) -> RuntimeResult<bool> {
        self.eval_bool(test)
    }

    /// Returns the assigned value.
    fn eval_assignment(
        &mut self,
        op: AssignmentOperator,
        target: &'ast Expr,
        value: &'ast Expr,
    ) -> RuntimeResult<Value> {
        let name = match target {
            Expr::Identifier { name } => name,
            _ => {
                return Err(RuntimeError::Unsupported {
                    feature: "assignment to member expressions",
                })
            }
        };

        let mut value = self.eval_expr(value)?;
        let scope = self.current_scope();
        if let Some(op) = op.binary_operator() {
            let current = self.env.lookup(scope, name)?.clone();
            value = ops::binary(op, current, value)?;
        }
        self.env.assign(scope, name, value.clone())?;
        Ok(value)
    }

    fn eval_call(
        &mut self,
        callee: &'ast Expr,
        arguments: &'ast [Expr],
        resolved: Option<&FunctionSignature>,
    ) -> RuntimeResult<Value> {
        let name = match callee {
            Expr::Identifier { name } => name.as_str(),
            _ => {
                return Err(RuntimeError::Unsupported {
                    feature: "calling an expression",
                })
            }
        };
        let function = match self.functions.get(name) {
            Some(function) => *function,
            None => {
                return Err(RuntimeError::UnknownFunction {
                    name: name.to_string(),
                })
            }
        };

        // arity follows the record that runs, which may not be the one the parser saw
        let expected = function.params.len();
        if let Some(signature) = resolved.filter(|signature| signature.arity() != expected) {
            debug!(
                "`{}` was resolved with {} parameters, calling the declaration with {}",
                name,
                signature.arity(),
                expected
            );
        }
        if arguments.len() != expected {
            return Err(RuntimeError::ArityMismatch {
                name: name.to_string(),
                expected,
                got: arguments.len(),
            });
        }

        let nesting_level = self.frame().nesting_level + 1;
        if nesting_level > self.limits.max_recursion_depth {
            return Err(RuntimeError::RecursionLimitExceeded {
                function_name: name.to_string(),
                limit: self.limits.max_recursion_depth,
            });
        }

        // arguments are evaluated in the caller's frame
        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            values.push(self.eval_expr(argument)?);
        }

        let signal = self.with_frame(name, FrameKind::Function, nesting_level, |this| {
            let scope = this.frame().base_scope;
            for (param, value) in function.params.iter().zip(values) {
                this.env.declare(scope, &param.name, value)?;
            }
            debug!("{}", this.stack.display(&this.env));
            this.exec_block(&function.body.body)
        })?;

        Ok(match signal {
            Signal::Return(value) => value,
            Signal::Normal | Signal::Break => Value::Null,
        })
    }
}

/// `break;` is an expression statement naming the unbound identifier `break`.
fn is_break(expression: &Expr, value: &Value) -> bool {
    match expression {
        Expr::Identifier { name } => name == "break" && value.cast_to_str() == Some("break"),
        _ => false,
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Int(val) => Value::Int(*val),
        Literal::Float(val) => Value::Float(*val),
        Literal::String(val) => Value::Str(val.clone()),
        Literal::Bool(val) => Value::Bool(*val),
        Literal::Null => Value::Null,
    }
}
