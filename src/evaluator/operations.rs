//! Operator semantics over already-evaluated operands.

use std::cmp::Ordering;

use crate::{
    ast::{BinOp, UnaryOp},
    evaluator::EvalError,
    value::Value,
};

fn mismatch(op: &str, left: &Value, right: &Value) -> EvalError {
    EvalError::TypeMismatch(format!(
        "cannot apply '{op}' to {} and {}",
        left.type_name(),
        right.type_name()
    ))
}

/// Applies a strict binary operator.
///
/// `is`/`isnt` compare any two values. Every other operator lets Error win
/// over Undefined, and Undefined win over any concrete operand.
pub fn apply_binop(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Is => return Ok(Value::Boolean(left.is_identical(right))),
        BinOp::Isnt => return Ok(Value::Boolean(!left.is_identical(right))),
        BinOp::And | BinOp::Or => return apply_logical(op, left.clone(), || right.clone()),
        _ => {}
    }

    if left.is_error() || right.is_error() {
        return Ok(Value::Error);
    }
    if left.is_undefined() || right.is_undefined() {
        return Ok(Value::Undefined);
    }

    match op {
        BinOp::Add | BinOp::Subtract | BinOp::Multiply | BinOp::Divide | BinOp::Modulo => {
            arithmetic(op, left, right)
        }
        BinOp::Equal => equals(left, right).map(Value::Boolean),
        BinOp::NotEqual => equals(left, right).map(|eq| Value::Boolean(!eq)),
        BinOp::LessThan => compare(op, left, right)
            .map(|o| Value::Boolean(matches!(o, Some(Ordering::Less)))),
        BinOp::GreaterThan => compare(op, left, right)
            .map(|o| Value::Boolean(matches!(o, Some(Ordering::Greater)))),
        BinOp::LessEqual => compare(op, left, right)
            .map(|o| Value::Boolean(matches!(o, Some(Ordering::Less | Ordering::Equal)))),
        BinOp::GreaterEqual => compare(op, left, right)
            .map(|o| Value::Boolean(matches!(o, Some(Ordering::Greater | Ordering::Equal)))),
        BinOp::BitAnd
        | BinOp::BitOr
        | BinOp::BitXor
        | BinOp::ShiftLeft
        | BinOp::ShiftRight
        | BinOp::UnsignedShiftRight => bitwise(op, left, right),
        BinOp::Is | BinOp::Isnt | BinOp::And | BinOp::Or => Err(mismatch(op.symbol(), left, right)),
    }
}

fn arithmetic(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => {
            let (a, b) = (*a, *b);
            let result = match op {
                BinOp::Add => a.wrapping_add(b),
                BinOp::Subtract => a.wrapping_sub(b),
                BinOp::Multiply => a.wrapping_mul(b),
                BinOp::Divide if b == 0 => return Err(EvalError::DivisionByZero),
                BinOp::Divide => a.wrapping_div(b),
                BinOp::Modulo if b == 0 => return Err(EvalError::DivisionByZero),
                BinOp::Modulo => a.wrapping_rem(b),
                _ => return Err(mismatch(op.symbol(), left, right)),
            };
            Ok(Value::Integer(result))
        }
        _ => {
            let (Some(a), Some(b)) = (left.as_real(), right.as_real()) else {
                return Err(mismatch(op.symbol(), left, right));
            };
            let result = match op {
                BinOp::Add => a + b,
                BinOp::Subtract => a - b,
                BinOp::Multiply => a * b,
                BinOp::Divide | BinOp::Modulo if b == 0.0 => {
                    return Err(EvalError::DivisionByZero);
                }
                BinOp::Divide => a / b,
                BinOp::Modulo => a % b,
                _ => return Err(mismatch(op.symbol(), left, right)),
            };
            Ok(Value::Real(result))
        }
    }
}

/// `==` semantics: numbers compare across Integer and Real, strings compare
/// case-insensitively.
fn equals(left: &Value, right: &Value) -> Result<bool, EvalError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(a == b),
        (Value::Boolean(a), Value::Boolean(b)) => Ok(a == b),
        (Value::String(a), Value::String(b)) => Ok(a.eq_ignore_ascii_case(b)),
        _ => match (left.as_real(), right.as_real()) {
            (Some(a), Some(b)) => Ok(a == b),
            _ => Err(mismatch("==", left, right)),
        },
    }
}

/// Ordering for the relational operators; `None` when a NaN is involved, so
/// that every relational test on it is false.
fn compare(op: BinOp, left: &Value, right: &Value) -> Result<Option<Ordering>, EvalError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Some(a.cmp(b))),
        (Value::String(a), Value::String(b)) => {
            Ok(Some(a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase())))
        }
        _ => match (left.as_real(), right.as_real()) {
            (Some(a), Some(b)) => Ok(a.partial_cmp(&b)),
            _ => Err(mismatch(op.symbol(), left, right)),
        },
    }
}

fn bitwise(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let (Value::Integer(a), Value::Integer(b)) = (left, right) else {
        return Err(mismatch(op.symbol(), left, right));
    };
    let (a, b) = (*a, *b);
    let shift = (b & 63) as u32;
    let result = match op {
        BinOp::BitAnd => a & b,
        BinOp::BitOr => a | b,
        BinOp::BitXor => a ^ b,
        BinOp::ShiftLeft => a.wrapping_shl(shift),
        BinOp::ShiftRight => a >> shift,
        BinOp::UnsignedShiftRight => ((a as u64) >> shift) as i64,
        _ => return Err(mismatch(op.symbol(), left, right)),
    };
    Ok(Value::Integer(result))
}

/// `&&` and `||`. The right operand is only computed when the left one does
/// not decide the result.
///
/// | left | `&&` | `\|\|` |
/// |---|---|---|
/// | error | error | error |
/// | deciding boolean | `false` | `true` |
/// | other boolean | right operand | right operand |
/// | undefined | undefined, or error if the right operand is | same |
/// | anything else | error | error |
pub fn apply_logical(
    op: BinOp,
    left: Value,
    right: impl FnOnce() -> Value,
) -> Result<Value, EvalError> {
    let deciding = op == BinOp::Or;
    match left {
        Value::Error => Ok(Value::Error),
        Value::Boolean(b) if b == deciding => Ok(Value::Boolean(b)),
        Value::Boolean(_) => match right() {
            v @ (Value::Boolean(_) | Value::Undefined | Value::Error) => Ok(v),
            other => Err(mismatch(op.symbol(), &Value::Boolean(!deciding), &other)),
        },
        Value::Undefined => match right() {
            Value::Boolean(_) | Value::Undefined => Ok(Value::Undefined),
            Value::Error => Ok(Value::Error),
            other => Err(mismatch(op.symbol(), &Value::Undefined, &other)),
        },
        other => Err(EvalError::TypeMismatch(format!(
            "'{}' requires boolean operands, got {}",
            op.symbol(),
            other.type_name()
        ))),
    }
}

pub fn apply_unary(op: UnaryOp, operand: &Value) -> Result<Value, EvalError> {
    if operand.is_absorbing() {
        return Ok(operand.clone());
    }
    match (op, operand) {
        (UnaryOp::Minus, Value::Integer(n)) => Ok(Value::Integer(n.wrapping_neg())),
        (UnaryOp::Minus, Value::Real(n)) => Ok(Value::Real(-n)),
        (UnaryOp::Plus, Value::Integer(_) | Value::Real(_)) => Ok(operand.clone()),
        (UnaryOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (UnaryOp::BitNot, Value::Integer(n)) => Ok(Value::Integer(!n)),
        _ => Err(EvalError::TypeMismatch(format!(
            "cannot apply '{}' to {}",
            op.symbol(),
            operand.type_name()
        ))),
    }
}
