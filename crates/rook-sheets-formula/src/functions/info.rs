//! Value-inspection functions

use crate::ast::Expr;
use crate::error::FormulaResult;
use crate::evaluator::{EvalContext, Value};

/// ISBLANK(value): 1 for empty text (a blank cell resolves to empty text)
pub fn fn_isblank(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let value = ctx.eval_expr(&args[0])?;
    if let Some(e) = value.as_error() {
        return Ok(Value::Error(e));
    }

    Ok(Value::from_bool(matches!(&value, Value::Text(s) if s.is_empty())))
}

/// ISNUMBER(value)
pub fn fn_isnumber(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let value = ctx.eval_expr(&args[0])?;
    if let Some(e) = value.as_error() {
        return Ok(Value::Error(e));
    }

    Ok(Value::from_bool(matches!(value, Value::Number(_))))
}

/// ISTEXT(value)
pub fn fn_istext(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let value = ctx.eval_expr(&args[0])?;
    if let Some(e) = value.as_error() {
        return Ok(Value::Error(e));
    }

    Ok(Value::from_bool(matches!(value, Value::Text(_))))
}

#[cfg(test)]
mod tests {
    use crate::evaluator::{evaluate, CellSource, Value};
    use rook_sheets_core::CellRef;

    fn no_cells() -> impl CellSource {
        |_cell: &CellRef| String::new()
    }

    fn eval(formula: &str) -> Value {
        evaluate(formula, &no_cells())
    }

    #[test]
    fn test_isblank() {
        assert_eq!(eval("=ISBLANK(\"\")"), Value::Number(1.0));
        assert_eq!(eval("=ISBLANK(\"x\")"), Value::Number(0.0));
        assert_eq!(eval("=ISBLANK(0)"), Value::Number(0.0));
        // Unset cells resolve blank
        assert_eq!(eval("=ISBLANK(Z99)"), Value::Number(1.0));
    }

    #[test]
    fn test_isnumber_istext() {
        assert_eq!(eval("=ISNUMBER(5)"), Value::Number(1.0));
        assert_eq!(eval("=ISNUMBER(\"5\")"), Value::Number(0.0));
        assert_eq!(eval("=ISTEXT(\"x\")"), Value::Number(1.0));
        assert_eq!(eval("=ISTEXT(5)"), Value::Number(0.0));
    }
}
