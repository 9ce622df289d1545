//! Binary operator implementations for the evaluator.
//!
//! Operators are defined only between two values of the same variant;
//! there is no implicit int/float coercion. Equality is the exception: any
//! two values may be compared and different variants are simply unequal.

use std::cmp::Ordering;

use ember_ir::BinaryOp;

use crate::errors::{
    binary_type_mismatch, division_by_zero, integer_overflow, invalid_operator, EvalResult,
};
use crate::value::Value;

/// Checked arithmetic operation with overflow handling.
#[inline]
fn checked_arith(result: Option<i64>, op_name: &'static str) -> EvalResult {
    result.map(Value::Int).ok_or_else(|| integer_overflow(op_name))
}

/// Evaluate a binary operation.
pub fn evaluate_binary(left: &Value, op: BinaryOp, right: &Value) -> EvalResult {
    match op {
        BinaryOp::Eq => return Ok(Value::Bool(left.script_eq(right))),
        BinaryOp::NotEq => return Ok(Value::Bool(!left.script_eq(right))),
        _ => {}
    }
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => eval_int_binary(*a, op, *b),
        (Value::Float(a), Value::Float(b)) => eval_float_binary(*a, op, *b),
        (Value::Bool(a), Value::Bool(b)) => eval_bool_binary(*a, op, *b),
        (Value::Str(a), Value::Str(b)) => eval_string_binary(a, op, b),
        (l, r) if std::mem::discriminant(l) == std::mem::discriminant(r) => {
            Err(invalid_operator(op.as_symbol(), l.type_name()))
        }
        (l, r) => Err(binary_type_mismatch(op, l.type_name(), r.type_name())),
    }
}

fn eval_int_binary(a: i64, op: BinaryOp, b: i64) -> EvalResult {
    match op {
        BinaryOp::Add => checked_arith(a.checked_add(b), "addition"),
        BinaryOp::Sub => checked_arith(a.checked_sub(b), "subtraction"),
        BinaryOp::Mul => checked_arith(a.checked_mul(b), "multiplication"),
        BinaryOp::Div if b == 0 => Err(division_by_zero()),
        BinaryOp::Div => checked_arith(a.checked_div(b), "division"),
        BinaryOp::BitAnd => Ok(Value::Int(a & b)),
        BinaryOp::BitOr => Ok(Value::Int(a | b)),
        BinaryOp::BitXor => Ok(Value::Int(a ^ b)),
        _ => compare(a.cmp(&b), op),
    }
}

fn eval_float_binary(a: f64, op: BinaryOp, b: f64) -> EvalResult {
    match op {
        BinaryOp::Add => Ok(Value::Float(a + b)),
        BinaryOp::Sub => Ok(Value::Float(a - b)),
        BinaryOp::Mul => Ok(Value::Float(a * b)),
        BinaryOp::Div => Ok(Value::Float(a / b)),
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
            Err(invalid_operator(op.as_symbol(), "float"))
        }
        // NaN compares false against everything.
        _ => match a.partial_cmp(&b) {
            Some(ordering) => compare(ordering, op),
            None => Ok(Value::Bool(false)),
        },
    }
}

fn eval_bool_binary(a: bool, op: BinaryOp, b: bool) -> EvalResult {
    match op {
        BinaryOp::BitAnd => Ok(Value::Bool(a & b)),
        BinaryOp::BitOr => Ok(Value::Bool(a | b)),
        BinaryOp::BitXor => Ok(Value::Bool(a ^ b)),
        _ => Err(invalid_operator(op.as_symbol(), "boolean")),
    }
}

/// Lexicographic comparison only; there is no string arithmetic.
fn eval_string_binary(a: &str, op: BinaryOp, b: &str) -> EvalResult {
    match op {
        BinaryOp::Less | BinaryOp::LessEq | BinaryOp::Greater | BinaryOp::GreaterEq => {
            compare(a.cmp(b), op)
        }
        _ => Err(invalid_operator(op.as_symbol(), "string")),
    }
}

fn compare(ordering: Ordering, op: BinaryOp) -> EvalResult {
    let result = match op {
        BinaryOp::Less => ordering.is_lt(),
        BinaryOp::LessEq => ordering.is_le(),
        BinaryOp::Greater => ordering.is_gt(),
        BinaryOp::GreaterEq => ordering.is_ge(),
        BinaryOp::Eq => ordering.is_eq(),
        BinaryOp::NotEq => ordering.is_ne(),
        _ => return Err(invalid_operator(op.as_symbol(), "comparison")),
    };
    Ok(Value::Bool(result))
}
