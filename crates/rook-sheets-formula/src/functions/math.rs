//! Math functions: aggregates over flattened argument lists, plus scalar
//! numeric helpers

use super::flatten_args;
use crate::ast::Expr;
use crate::error::FormulaResult;
use crate::evaluator::{EvalContext, Value};
use rook_sheets_core::CellError;

/// Evaluate a scalar argument and force it to a number
///
/// Returns `Err` with the sentinel to surface on coercion failure, including
/// an error value already in the operand.
fn number_arg(arg: &Expr, ctx: &mut EvalContext) -> FormulaResult<Result<f64, CellError>> {
    let value = ctx.eval_expr(arg)?;
    Ok(value.to_number())
}

/// SUM: adds the numeric entries of the flattened argument list, ignoring
/// blanks and non-numeric text; any embedded error propagates
pub fn fn_sum(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let values = flatten_args(args, ctx)?;
    let mut sum = 0.0;

    for value in &values {
        if let Some(e) = value.as_error() {
            return Ok(Value::Error(e));
        }
        if let Some(n) = value.as_number() {
            sum += n;
        }
    }

    Ok(Value::Number(sum))
}

/// AVERAGE: mean of the numeric entries; `#DIV/0!` when there are none
pub fn fn_average(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let values = flatten_args(args, ctx)?;
    let mut sum = 0.0;
    let mut count = 0u32;

    for value in &values {
        if let Some(e) = value.as_error() {
            return Ok(Value::Error(e));
        }
        if let Some(n) = value.as_number() {
            sum += n;
            count += 1;
        }
    }

    if count == 0 {
        Ok(Value::Error(CellError::Div0))
    } else {
        Ok(Value::Number(sum / count as f64))
    }
}

/// COUNT: number of numeric entries
pub fn fn_count(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let values = flatten_args(args, ctx)?;
    let mut count = 0u32;

    for value in &values {
        if let Some(e) = value.as_error() {
            return Ok(Value::Error(e));
        }
        if value.as_number().is_some() {
            count += 1;
        }
    }

    Ok(Value::Number(count as f64))
}

/// COUNTA: number of non-blank entries, numeric or text
pub fn fn_counta(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let values = flatten_args(args, ctx)?;
    let mut count = 0u32;

    for value in &values {
        match value {
            Value::Error(e) => return Ok(Value::Error(*e)),
            Value::Number(_) => count += 1,
            Value::Text(s) if !s.is_empty() => count += 1,
            Value::Text(_) => {}
        }
    }

    Ok(Value::Number(count as f64))
}

/// MIN: smallest numeric entry, or 0 when there are none
pub fn fn_min(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let values = flatten_args(args, ctx)?;
    let mut min: Option<f64> = None;

    for value in &values {
        if let Some(e) = value.as_error() {
            return Ok(Value::Error(e));
        }
        if let Some(n) = value.as_number() {
            min = Some(min.map_or(n, |m| m.min(n)));
        }
    }

    Ok(Value::Number(min.unwrap_or(0.0)))
}

/// MAX: largest numeric entry, or 0 when there are none
pub fn fn_max(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let values = flatten_args(args, ctx)?;
    let mut max: Option<f64> = None;

    for value in &values {
        if let Some(e) = value.as_error() {
            return Ok(Value::Error(e));
        }
        if let Some(n) = value.as_number() {
            max = Some(max.map_or(n, |m| m.max(n)));
        }
    }

    Ok(Value::Number(max.unwrap_or(0.0)))
}

/// ABS(value)
pub fn fn_abs(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let n = match number_arg(&args[0], ctx)? {
        Ok(n) => n,
        Err(e) => return Ok(Value::Error(e)),
    };
    Ok(Value::Number(n.abs()))
}

/// ROUND(value, [digits=0]): half away from zero
pub fn fn_round(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let n = match number_arg(&args[0], ctx)? {
        Ok(n) => n,
        Err(e) => return Ok(Value::Error(e)),
    };

    let digits = match args.get(1) {
        Some(arg) => match number_arg(arg, ctx)? {
            Ok(d) => d.trunc() as i32,
            Err(e) => return Ok(Value::Error(e)),
        },
        None => 0,
    };

    let factor = 10f64.powi(digits);
    Ok(Value::Number((n * factor).round() / factor))
}

/// FLOOR(value, [significance=1]): rounds down to a multiple of the
/// significance; a significance of exactly zero is `#DIV/0!`
pub fn fn_floor(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    round_to_significance(args, ctx, f64::floor)
}

/// CEILING(value, [significance=1]): rounds up to a multiple of the
/// significance; a significance of exactly zero is `#DIV/0!`
pub fn fn_ceiling(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    round_to_significance(args, ctx, f64::ceil)
}

fn round_to_significance(
    args: &[Expr],
    ctx: &mut EvalContext,
    round: fn(f64) -> f64,
) -> FormulaResult<Value> {
    let n = match number_arg(&args[0], ctx)? {
        Ok(n) => n,
        Err(e) => return Ok(Value::Error(e)),
    };

    let significance = match args.get(1) {
        Some(arg) => match number_arg(arg, ctx)? {
            Ok(s) => s,
            Err(e) => return Ok(Value::Error(e)),
        },
        None => 1.0,
    };

    if significance == 0.0 {
        return Ok(Value::Error(CellError::Div0));
    }

    Ok(Value::Number(round(n / significance) * significance))
}

/// MOD(a, b): remainder whose sign follows the divisor; `#DIV/0!` for b = 0
pub fn fn_mod(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let a = match number_arg(&args[0], ctx)? {
        Ok(n) => n,
        Err(e) => return Ok(Value::Error(e)),
    };
    let b = match number_arg(&args[1], ctx)? {
        Ok(n) => n,
        Err(e) => return Ok(Value::Error(e)),
    };

    if b == 0.0 {
        return Ok(Value::Error(CellError::Div0));
    }

    Ok(Value::Number(a - b * (a / b).floor()))
}

/// POWER(base, exponent)
pub fn fn_power(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let base = match number_arg(&args[0], ctx)? {
        Ok(n) => n,
        Err(e) => return Ok(Value::Error(e)),
    };
    let exp = match number_arg(&args[1], ctx)? {
        Ok(n) => n,
        Err(e) => return Ok(Value::Error(e)),
    };

    Ok(Value::Number(base.powf(exp)))
}

/// SQRT(value): `#VALUE!` for a negative argument
pub fn fn_sqrt(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let n = match number_arg(&args[0], ctx)? {
        Ok(n) => n,
        Err(e) => return Ok(Value::Error(e)),
    };

    if n < 0.0 {
        return Ok(Value::Error(CellError::Value));
    }

    Ok(Value::Number(n.sqrt()))
}

/// INT(value): rounds down to the nearest integer
pub fn fn_int(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let n = match number_arg(&args[0], ctx)? {
        Ok(n) => n,
        Err(e) => return Ok(Value::Error(e)),
    };
    Ok(Value::Number(n.floor()))
}

/// SIGN(value): -1, 0 or 1
pub fn fn_sign(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let n = match number_arg(&args[0], ctx)? {
        Ok(n) => n,
        Err(e) => return Ok(Value::Error(e)),
    };

    let sign = if n > 0.0 {
        1.0
    } else if n < 0.0 {
        -1.0
    } else {
        0.0
    };
    Ok(Value::Number(sign))
}

/// EXP(value)
pub fn fn_exp(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let n = match number_arg(&args[0], ctx)? {
        Ok(n) => n,
        Err(e) => return Ok(Value::Error(e)),
    };
    Ok(Value::Number(n.exp()))
}

/// PI()
pub fn fn_pi(_args: &[Expr], _ctx: &mut EvalContext) -> FormulaResult<Value> {
    Ok(Value::Number(std::f64::consts::PI))
}

#[cfg(test)]
mod tests {
    use crate::evaluator::{evaluate, CellSource, Value};
    use rook_sheets_core::{CellError, CellRef};

    fn no_cells() -> impl CellSource {
        |_cell: &CellRef| String::new()
    }

    fn eval(formula: &str) -> Value {
        evaluate(formula, &no_cells())
    }

    #[test]
    fn test_sum() {
        assert_eq!(eval("=SUM(1,2,3)"), Value::Number(6.0));
        assert_eq!(eval("=SUM(1,\"2\",\"x\")"), Value::Number(3.0));
        assert_eq!(eval("=SUM(1,1/0)"), Value::Error(CellError::Div0));
    }

    #[test]
    fn test_sum_over_range() {
        let source = |cell: &CellRef| -> String {
            match cell.to_string().as_str() {
                "A1" => "5".into(),
                "A2" => "x".into(),
                "A3" => "".into(),
                _ => String::new(),
            }
        };

        assert_eq!(evaluate("=SUM(A1:A3)", &source), Value::Number(5.0));
    }

    #[test]
    fn test_average() {
        assert_eq!(eval("=AVERAGE(2,4,6)"), Value::Number(4.0));
        assert_eq!(eval("=AVERAGE(\"a\",\"b\")"), Value::Error(CellError::Div0));
    }

    #[test]
    fn test_count_and_counta() {
        assert_eq!(eval("=COUNT(1,2,\"3\",\"a\")"), Value::Number(3.0));
        assert_eq!(eval("=COUNTA(1,\"a\",\"\")"), Value::Number(2.0));

        let source = |cell: &CellRef| -> String {
            match cell.to_string().as_str() {
                "A1" => "5".into(),
                "A2" => "x".into(),
                _ => String::new(),
            }
        };
        assert_eq!(evaluate("=COUNT(A1:A3)", &source), Value::Number(1.0));
        assert_eq!(evaluate("=COUNTA(A1:A3)", &source), Value::Number(2.0));
    }

    #[test]
    fn test_min_max() {
        assert_eq!(eval("=MIN(5,2,8)"), Value::Number(2.0));
        assert_eq!(eval("=MAX(5,2,8)"), Value::Number(8.0));
        assert_eq!(eval("=MIN(\"a\")"), Value::Number(0.0));
        assert_eq!(eval("=MAX(\"a\")"), Value::Number(0.0));
        assert_eq!(eval("=MAX(1,1/0)"), Value::Error(CellError::Div0));
    }

    #[test]
    fn test_abs() {
        assert_eq!(eval("=ABS(-3)"), Value::Number(3.0));
        assert_eq!(eval("=ABS(3)"), Value::Number(3.0));
        assert_eq!(eval("=ABS(1,2)"), Value::Error(CellError::Value));
    }

    #[test]
    fn test_round() {
        assert_eq!(eval("=ROUND(2.346,2)"), Value::Number(2.35));
        assert_eq!(eval("=ROUND(2.5)"), Value::Number(3.0));
        assert_eq!(eval("=ROUND(-2.5)"), Value::Number(-3.0));
        assert_eq!(eval("=ROUND(1234.5,-2)"), Value::Number(1200.0));
    }

    #[test]
    fn test_floor_ceiling() {
        assert_eq!(eval("=FLOOR(7.8)"), Value::Number(7.0));
        assert_eq!(eval("=FLOOR(7.8,0.5)"), Value::Number(7.5));
        assert_eq!(eval("=CEILING(7.1)"), Value::Number(8.0));
        assert_eq!(eval("=CEILING(7.1,0.5)"), Value::Number(7.5));
        assert_eq!(eval("=FLOOR(7,0)"), Value::Error(CellError::Div0));
        assert_eq!(eval("=CEILING(7,0)"), Value::Error(CellError::Div0));
    }

    #[test]
    fn test_mod() {
        assert_eq!(eval("=MOD(5,3)"), Value::Number(2.0));
        // Sign follows the divisor
        assert_eq!(eval("=MOD(-5,3)"), Value::Number(1.0));
        assert_eq!(eval("=MOD(5,-3)"), Value::Number(-1.0));
        assert_eq!(eval("=MOD(5,0)"), Value::Error(CellError::Div0));
    }

    #[test]
    fn test_power_sqrt() {
        assert_eq!(eval("=POWER(2,10)"), Value::Number(1024.0));
        assert_eq!(eval("=POWER(4,0.5)"), Value::Number(2.0));
        assert_eq!(eval("=SQRT(9)"), Value::Number(3.0));
        assert_eq!(eval("=SQRT(-1)"), Value::Error(CellError::Value));
    }

    #[test]
    fn test_int_sign() {
        assert_eq!(eval("=INT(7.9)"), Value::Number(7.0));
        assert_eq!(eval("=INT(-7.1)"), Value::Number(-8.0));
        assert_eq!(eval("=SIGN(-3)"), Value::Number(-1.0));
        assert_eq!(eval("=SIGN(0)"), Value::Number(0.0));
        assert_eq!(eval("=SIGN(9)"), Value::Number(1.0));
    }

    #[test]
    fn test_exp_pi() {
        assert_eq!(eval("=EXP(0)"), Value::Number(1.0));
        assert_eq!(eval("=PI()"), Value::Number(std::f64::consts::PI));
        assert_eq!(eval("=PI(1)"), Value::Error(CellError::Value));
    }
}
