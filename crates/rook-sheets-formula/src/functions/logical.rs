//! Logical functions
//!
//! Conditions receive unevaluated branches, so IF evaluates only the branch
//! it selects and IFERROR can intercept a failing first argument.

use super::flatten_args;
use crate::ast::Expr;
use crate::error::FormulaResult;
use crate::evaluator::{EvalContext, Value};

/// IF(condition, then, [else=""])
pub fn fn_if(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let condition = ctx.eval_expr(&args[0])?;
    if let Some(e) = condition.as_error() {
        return Ok(Value::Error(e));
    }

    if condition.is_truthy() {
        ctx.eval_expr(&args[1])
    } else {
        match args.get(2) {
            Some(arg) => ctx.eval_expr(arg),
            None => Ok(Value::Text(String::new())),
        }
    }
}

/// AND: 1 when every numeric entry of the flattened arguments is nonzero;
/// non-numeric entries are skipped, errors propagate
pub fn fn_and(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let values = flatten_args(args, ctx)?;

    for value in &values {
        if let Some(e) = value.as_error() {
            return Ok(Value::Error(e));
        }
        if let Some(n) = value.as_number() {
            if n == 0.0 {
                return Ok(Value::from_bool(false));
            }
        }
    }

    Ok(Value::from_bool(true))
}

/// OR: 1 when any numeric entry of the flattened arguments is nonzero
pub fn fn_or(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let values = flatten_args(args, ctx)?;

    for value in &values {
        if let Some(e) = value.as_error() {
            return Ok(Value::Error(e));
        }
        if let Some(n) = value.as_number() {
            if n != 0.0 {
                return Ok(Value::from_bool(true));
            }
        }
    }

    Ok(Value::from_bool(false))
}

/// NOT(value): inverts the shared condition rule
pub fn fn_not(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let value = ctx.eval_expr(&args[0])?;
    if let Some(e) = value.as_error() {
        return Ok(Value::Error(e));
    }

    Ok(Value::from_bool(!value.is_truthy()))
}

/// IFERROR(value, fallback)
///
/// Catches both error-sentinel results and internal evaluation failures from
/// the first argument, substituting the fallback's evaluation in either case.
pub fn fn_iferror(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    match ctx.eval_expr(&args[0]) {
        Ok(value) if !value.is_error() => Ok(value),
        _ => ctx.eval_expr(&args[1]),
    }
}
