//! Operator semantics.

use std::cmp::Ordering;

use nyr_parser::ast::{BinaryOperator, BitwiseOperator, UnaryOperator};
use nyr_value::Value;

use crate::error::RuntimeError;

type OpResult = Result<Value, RuntimeError>;

/// Numeric operands after promotion.
enum Operands {
    Ints(i64, i64),
    Floats(f64, f64),
}

/// Promotes to floats unless both operands are ints. `None` if either operand is not a number.
fn numeric(left: &Value, right: &Value) -> Option<Operands> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(Operands::Ints(*a, *b)),
        _ => Some(Operands::Floats(
            left.cast_to_number()?,
            right.cast_to_number()?,
        )),
    }
}

fn unsupported(operator: &'static str, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::UnsupportedOperands {
        operator,
        left: left.type_name(),
        right: right.type_name(),
    }
}

pub fn binary(op: BinaryOperator, left: Value, right: Value) -> OpResult {
    match op {
        BinaryOperator::Add => match (left, right) {
            (Value::Str(mut a), Value::Str(b)) => {
                a.push_str(&b);
                Ok(Value::Str(a))
            }
            (left, right) => arithmetic(op, &left, &right, i64::checked_add, |a, b| a + b),
        },
        BinaryOperator::Sub => arithmetic(op, &left, &right, i64::checked_sub, |a, b| a - b),
        BinaryOperator::Mul => arithmetic(op, &left, &right, i64::checked_mul, |a, b| a * b),
        BinaryOperator::Div => divide(&left, &right),
        BinaryOperator::Mod => modulo(&left, &right),
        BinaryOperator::Eq => Ok(Value::Bool(equals(&left, &right))),
        BinaryOperator::NotEq => Ok(Value::Bool(!equals(&left, &right))),
        BinaryOperator::Lt => compare(op, &left, &right, Ordering::is_lt),
        BinaryOperator::LtEq => compare(op, &left, &right, Ordering::is_le),
        BinaryOperator::Gt => compare(op, &left, &right, Ordering::is_gt),
        BinaryOperator::GtEq => compare(op, &left, &right, Ordering::is_ge),
    }
}

fn arithmetic(
    op: BinaryOperator,
    left: &Value,
    right: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> OpResult {
    match numeric(left, right) {
        Some(Operands::Ints(a, b)) => int_op(a, b)
            .map(Value::Int)
            .ok_or(RuntimeError::IntegerOverflow {
                operator: op.as_str(),
            }),
        Some(Operands::Floats(a, b)) => Ok(Value::Float(float_op(a, b))),
        None => Err(unsupported(op.as_str(), left, right)),
    }
}

/// An exact quotient is an int, anything else a float.
fn divide(left: &Value, right: &Value) -> OpResult {
    match numeric(left, right) {
        Some(Operands::Ints(_, 0)) => Err(RuntimeError::DivideByZero),
        Some(Operands::Ints(a, b)) => match a.checked_rem(b) {
            Some(0) => Ok(Value::Int(a / b)),
            Some(_) => Ok(Value::Float(a as f64 / b as f64)),
            // i64::MIN / -1
            None => Err(RuntimeError::IntegerOverflow { operator: "/" }),
        },
        Some(Operands::Floats(_, b)) if b == 0.0 => Err(RuntimeError::DivideByZero),
        Some(Operands::Floats(a, b)) => Ok(integral(a / b)),
        None => Err(unsupported("/", left, right)),
    }
}

fn integral(val: f64) -> Value {
    // i64::MAX as f64 rounds up to 2^63
    if val.fract() == 0.0 && val >= i64::MIN as f64 && val < i64::MAX as f64 {
        Value::Int(val as i64)
    } else {
        Value::Float(val)
    }
}

/// Floored modulo: the result takes the sign of the divisor.
fn modulo(left: &Value, right: &Value) -> OpResult {
    match numeric(left, right) {
        Some(Operands::Ints(_, 0)) => Err(RuntimeError::DivideByZero),
        Some(Operands::Ints(a, b)) => {
            let rem = a.wrapping_rem(b);
            if rem != 0 && (rem < 0) != (b < 0) {
                Ok(Value::Int(rem + b))
            } else {
                Ok(Value::Int(rem))
            }
        }
        Some(Operands::Floats(_, b)) if b == 0.0 => Err(RuntimeError::DivideByZero),
        Some(Operands::Floats(a, b)) => {
            let rem = a % b;
            if rem != 0.0 && (rem < 0.0) != (b < 0.0) {
                Ok(Value::Float(rem + b))
            } else {
                Ok(Value::Float(rem))
            }
        }
        None => Err(unsupported("%", left, right)),
    }
}

/// Numbers compare by value across int and float. Otherwise values of different types are unequal.
pub fn equals(left: &Value, right: &Value) -> bool {
    match numeric(left, right) {
        Some(Operands::Ints(a, b)) => a == b,
        Some(Operands::Floats(a, b)) => a == b,
        None => left == right,
    }
}

fn compare(
    op: BinaryOperator,
    left: &Value,
    right: &Value,
    predicate: fn(Ordering) -> bool,
) -> OpResult {
    let ordering = match (left, right) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => match numeric(left, right) {
            Some(Operands::Ints(a, b)) => Some(a.cmp(&b)),
            Some(Operands::Floats(a, b)) => a.partial_cmp(&b),
            None => return Err(unsupported(op.as_str(), left, right)),
        },
    };
    // NaN is unordered
    Ok(Value::Bool(ordering.map_or(false, predicate)))
}

pub fn bitwise(op: BitwiseOperator, left: Value, right: Value) -> OpResult {
    match (&left, &right) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(match op {
            BitwiseOperator::And => a & b,
            BitwiseOperator::Xor => a ^ b,
            BitwiseOperator::Or => a | b,
        })),
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(match op {
            BitwiseOperator::And => a & b,
            BitwiseOperator::Xor => a ^ b,
            BitwiseOperator::Or => a | b,
        })),
        _ => Err(unsupported(op.as_str(), &left, &right)),
    }
}

pub fn unary(op: UnaryOperator, argument: Value) -> OpResult {
    if argument.is_null() {
        return Err(RuntimeError::UnaryOnNull { operator: op });
    }
    match (op, argument) {
        (UnaryOperator::Minus, Value::Int(val)) => val
            .checked_neg()
            .map(Value::Int)
            .ok_or(RuntimeError::IntegerOverflow { operator: "-" }),
        (UnaryOperator::Minus, Value::Float(val)) => Ok(Value::Float(-val)),
        (UnaryOperator::Plus, val @ Value::Int(_)) | (UnaryOperator::Plus, val @ Value::Float(_)) => {
            Ok(val)
        }
        (UnaryOperator::Not, Value::Bool(val)) => Ok(Value::Bool(!val)),
        (UnaryOperator::Not, val) => Err(RuntimeError::TypeMismatch {
            expected: "bool",
            got: val.type_name(),
        }),
        (_, val) => Err(RuntimeError::TypeMismatch {
            expected: "number",
            got: val.type_name(),
        }),
    }
}
