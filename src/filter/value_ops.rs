/// Comparison and arithmetic on scalar values.
use std::cmp::Ordering;

use crate::filter::{ArithOp, CmpOp};
use crate::value::Value;

pub(super) fn compare_values(left: &Value, op: CmpOp, right: &Value) -> bool {
    match op {
        CmpOp::Eq => values_equal(left, right),
        CmpOp::Ne => !values_equal(left, right),
        CmpOp::Lt => values_order(left, right) == Some(Ordering::Less),
        CmpOp::Le => matches!(
            values_order(left, right),
            Some(Ordering::Less | Ordering::Equal)
        ),
        CmpOp::Gt => values_order(left, right) == Some(Ordering::Greater),
        CmpOp::Ge => matches!(
            values_order(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
    }
}

/// Strict equality: values of different types are never equal, except
/// `Int` and `Double` which compare numerically.
pub(super) fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Double(a), Value::Double(b)) => a == b,
        (Value::Int(a), Value::Double(b)) => (*a as f64) == *b,
        (Value::Double(a), Value::Int(b)) => *a == (*b as f64),
        (Value::String(a), Value::String(b)) => a == b,
        _ => false,
    }
}

/// Ordering within a type; `None` across types, for `null`, and for NaN.
pub(super) fn values_order(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
        (Value::Int(a), Value::Double(b)) => (*a as f64).partial_cmp(b),
        (Value::Double(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Arithmetic on two values. A `null` operand (an empty cell) makes the
/// result `null`, so `elevation + 1 > 100` is simply false for a row without
/// an elevation.
pub(super) fn arith_values(left: &Value, op: ArithOp, right: &Value) -> Result<Value, String> {
    if matches!(left, Value::Null) || matches!(right, Value::Null) {
        return Ok(Value::Null);
    }
    if let (Value::String(a), Value::String(b), ArithOp::Add) = (left, right, op) {
        return Ok(Value::String(format!("{a}{b}")));
    }
    let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
        return Err(format!(
            "{} ({}) and {} ({}) cannot be {}",
            left.type_name(),
            describe(left),
            right.type_name(),
            describe(right),
            verb(op),
        ));
    };
    if matches!(op, ArithOp::Div | ArithOp::Mod) && b == 0.0 {
        return Err(format!(
            "{} and {} cannot be {} because the divisor is zero",
            describe(left),
            describe(right),
            verb(op),
        ));
    }
    // Integer fast path; overflow and inexact division fall back to f64.
    if let (Value::Int(x), Value::Int(y)) = (left, right) {
        let exact = match op {
            ArithOp::Add => x.checked_add(*y),
            ArithOp::Sub => x.checked_sub(*y),
            ArithOp::Mul => x.checked_mul(*y),
            ArithOp::Div => (x.checked_rem(*y) == Some(0))
                .then(|| x.checked_div(*y))
                .flatten(),
            ArithOp::Mod => x.checked_rem(*y),
        };
        if let Some(n) = exact {
            return Ok(Value::Int(n));
        }
    }
    let result = match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div => a / b,
        ArithOp::Mod => a % b,
    };
    Ok(Value::Double(result))
}

pub(super) fn negate(value: &Value) -> Result<Value, String> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Int(n) => Ok(n
            .checked_neg()
            .map_or_else(|| Value::Double(-(*n as f64)), Value::Int)),
        Value::Double(f) => Ok(Value::Double(-f)),
        other => Err(format!(
            "{} ({}) cannot be negated",
            other.type_name(),
            describe(other)
        )),
    }
}

fn verb(op: ArithOp) -> &'static str {
    match op {
        ArithOp::Add => "added",
        ArithOp::Sub => "subtracted",
        ArithOp::Mul => "multiplied",
        ArithOp::Div => "divided",
        ArithOp::Mod => "divided (remainder)",
    }
}

/// Short rendering of a value for error messages.
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Double(f) => f.to_string(),
        Value::String(s) if s.chars().count() > 20 => {
            let head: String = s.chars().take(20).collect();
            format!("{head:?}...")
        }
        Value::String(s) => format!("{s:?}"),
    }
}
