/// Filter expression evaluator.
///
/// Column references borrow from the row; only computed values allocate.
use std::borrow::Cow;

use super::value_ops::{arith_values, compare_values, negate};
use crate::filter::{BoolOp, Expr};
use crate::value::Value;

/// Evaluate `expr` against one row. Errors are human-readable messages.
pub fn eval<'r>(expr: &'r Expr, row: &'r [Value]) -> Result<Cow<'r, Value>, String> {
    match expr {
        Expr::Literal(v) => Ok(Cow::Borrowed(v)),

        Expr::Column(i) => row
            .get(*i)
            .map(Cow::Borrowed)
            .ok_or_else(|| format!("row has {} columns, column {i} is missing", row.len())),

        Expr::Not(inner) => {
            let v = eval(inner, row)?;
            Ok(Cow::Owned(Value::Bool(!v.is_truthy())))
        }

        Expr::Neg(inner) => {
            let v = eval(inner, row)?;
            negate(&v).map(Cow::Owned)
        }

        Expr::Compare(left, op, right) => {
            let lval = eval(left, row)?;
            let rval = eval(right, row)?;
            Ok(Cow::Owned(Value::Bool(compare_values(&lval, *op, &rval))))
        }

        Expr::Arith(left, op, right) => {
            let lval = eval(left, row)?;
            let rval = eval(right, row)?;
            arith_values(&lval, *op, &rval).map(Cow::Owned)
        }

        Expr::BoolOp(left, op, right) => {
            let lval = eval(left, row)?;
            match op {
                BoolOp::And if !lval.is_truthy() => Ok(lval),
                BoolOp::Or if lval.is_truthy() => Ok(lval),
                _ => eval(right, row),
            }
        }
    }
}
