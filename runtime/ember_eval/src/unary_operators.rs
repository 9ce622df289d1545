//! Unary operator implementations for the evaluator.

use ember_ir::UnaryOp;

use crate::errors::{integer_overflow, invalid_operator, EvalResult};
use crate::value::Value;

/// Evaluate a unary operation.
///
/// `not` and `!` are deliberately different: `not` accepts anything and
/// collapses it to a boolean, `!` only negates booleans and numbers.
pub fn evaluate_unary(op: UnaryOp, value: &Value) -> EvalResult {
    match (op, value) {
        (UnaryOp::Minus, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| integer_overflow("negation")),
        (UnaryOp::Minus, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Not, v) => Ok(Value::Bool(v.not())),
        (UnaryOp::Bang, v) => v.strict_not().map(Value::Bool),
        (UnaryOp::Tilde, Value::Int(n)) => Ok(Value::Int(!n)),
        (UnaryOp::Tilde, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (op, v) => Err(invalid_operator(op.as_symbol(), v.type_name())),
    }
}
