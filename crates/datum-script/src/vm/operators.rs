//! Arithmetic, bitwise and comparison operators.

use std::cmp::Ordering;

use super::comparison;
use crate::Error;
use crate::ast::{BinaryOperator, UnaryOperator};
use crate::runtime::value::Value;

/// Applies a binary operator to two evaluated operands.
///
/// `&&` and `||` are normally short-circuited by the interpreter; here they
/// simply combine the truthiness of both sides.
pub fn binary(op: BinaryOperator, left: &Value, right: &Value) -> Result<Value, Error> {
    match op {
        BinaryOperator::Add => add(left, right),
        BinaryOperator::Sub => arithmetic(op, left, right, i64::wrapping_sub, |a, b| a - b),
        BinaryOperator::Mul => arithmetic(op, left, right, i64::wrapping_mul, |a, b| a * b),
        BinaryOperator::Div => divide(left, right),
        BinaryOperator::Mod => remainder(left, right),
        BinaryOperator::Pow => power(left, right),
        BinaryOperator::Eq => Ok(Value::Bool(comparison::equals(left, right))),
        BinaryOperator::NotEq => Ok(Value::Bool(!comparison::equals(left, right))),
        BinaryOperator::Lt => ordering(op, left, right, Ordering::is_lt),
        BinaryOperator::Gt => ordering(op, left, right, Ordering::is_gt),
        BinaryOperator::LtEq => ordering(op, left, right, Ordering::is_le),
        BinaryOperator::GtEq => ordering(op, left, right, Ordering::is_ge),
        BinaryOperator::And => Ok(Value::Bool(left.to_boolean() && right.to_boolean())),
        BinaryOperator::Or => Ok(Value::Bool(left.to_boolean() || right.to_boolean())),
        BinaryOperator::BitOr => bitwise(op, left, right, |a, b| a | b),
        BinaryOperator::BitAnd => bitwise(op, left, right, |a, b| a & b),
        BinaryOperator::BitXor => bitwise(op, left, right, |a, b| a ^ b),
    }
}

/// Applies a unary operator.
pub fn unary(op: UnaryOperator, operand: &Value) -> Result<Value, Error> {
    match (op, operand) {
        (UnaryOperator::Negate, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
        (UnaryOperator::Negate, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOperator::Plus, Value::Int(_) | Value::Float(_)) => Ok(operand.clone()),
        (UnaryOperator::Not, value) => Ok(Value::Bool(!value.to_boolean())),
        (UnaryOperator::BitNot, Value::Int(n)) => Ok(Value::Int(!n)),
        (op, value) => Err(Error::TypeError(format!(
            "bad operand type for unary {:?}: {}",
            op,
            value.type_of()
        ))),
    }
}

fn operand_error(op: BinaryOperator, left: &Value, right: &Value) -> Error {
    Error::TypeError(format!(
        "unsupported operand types for {}: {} and {}",
        op.symbol(),
        left.type_of(),
        right.type_of()
    ))
}

fn add(left: &Value, right: &Value) -> Result<Value, Error> {
    match (left, right) {
        (Value::String(a), b) => Ok(Value::String(format!("{}{}", a, b))),
        (a, Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
        _ => arithmetic(BinaryOperator::Add, left, right, i64::wrapping_add, |a, b| a + b),
    }
}

fn arithmetic(
    op: BinaryOperator,
    left: &Value,
    right: &Value,
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, Error> {
    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        return Ok(Value::Int(int_op(*a, *b)));
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => Ok(Value::Float(float_op(a, b))),
        _ => Err(operand_error(op, left, right)),
    }
}

fn divide(left: &Value, right: &Value) -> Result<Value, Error> {
    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        if *b == 0 {
            return Err(Error::RangeError("division by zero".into()));
        }
        return Ok(match a.checked_rem(*b) {
            Some(0) => Value::Int(a / b),
            _ => Value::Float(*a as f64 / *b as f64),
        });
    }
    arithmetic(BinaryOperator::Div, left, right, i64::wrapping_div, |a, b| a / b)
}

fn remainder(left: &Value, right: &Value) -> Result<Value, Error> {
    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        if *b == 0 {
            return Err(Error::RangeError("modulo by zero".into()));
        }
        return Ok(Value::Int(a.wrapping_rem(*b)));
    }
    arithmetic(BinaryOperator::Mod, left, right, i64::wrapping_rem, |a, b| a % b)
}

fn power(left: &Value, right: &Value) -> Result<Value, Error> {
    if let (Value::Int(base), Value::Int(exp)) = (left, right) {
        if let Some(value) = u32::try_from(*exp).ok().and_then(|e| base.checked_pow(e)) {
            return Ok(Value::Int(value));
        }
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => Ok(Value::Float(a.powf(b))),
        _ => Err(operand_error(BinaryOperator::Pow, left, right)),
    }
}

fn ordering(
    op: BinaryOperator,
    left: &Value,
    right: &Value,
    test: fn(Ordering) -> bool,
) -> Result<Value, Error> {
    if !comparison::is_comparable(left, right) {
        return Err(operand_error(op, left, right));
    }
    Ok(Value::Bool(comparison::compare(left, right).is_some_and(test)))
}

fn bitwise(
    op: BinaryOperator,
    left: &Value,
    right: &Value,
    int_op: fn(i64, i64) -> i64,
) -> Result<Value, Error> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(int_op(*a, *b))),
        _ => Err(operand_error(op, left, right)),
    }
}
