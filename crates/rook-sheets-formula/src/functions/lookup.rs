//! Lookup functions

use crate::ast::Expr;
use crate::error::FormulaResult;
use crate::evaluator::{EvalContext, Value};
use rook_sheets_core::{CellError, CellRef};

/// INDEX(range, row, [column=1])
///
/// The first argument must be a range reference written in the formula, so
/// the rectangle's top-left corner anchors the 1-based offsets. Non-positive
/// offsets are `#VALUE!`; offsets past the rectangle are `#REF!`.
pub fn fn_index(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let range = match &args[0] {
        Expr::RangeRef(range) => *range,
        _ => return Ok(Value::Error(CellError::Value)),
    };

    let row_offset = match offset_arg(&args[1], ctx)? {
        Ok(n) => n,
        Err(e) => return Ok(Value::Error(e)),
    };
    let col_offset = match args.get(2) {
        Some(arg) => match offset_arg(arg, ctx)? {
            Ok(n) => n,
            Err(e) => return Ok(Value::Error(e)),
        },
        None => 1,
    };

    if row_offset < 1 || col_offset < 1 {
        return Ok(Value::Error(CellError::Value));
    }
    if row_offset as u64 > range.row_count() as u64 || col_offset as u64 > range.col_count() as u64
    {
        return Ok(Value::Error(CellError::Ref));
    }

    let cell = CellRef::new(
        range.start.row + row_offset as u32 - 1,
        range.start.col + col_offset as u32 - 1,
    );
    Ok(ctx.resolve_cell(&cell))
}

fn offset_arg(arg: &Expr, ctx: &mut EvalContext) -> FormulaResult<Result<i64, CellError>> {
    let value = ctx.eval_expr(arg)?;
    match value.to_number() {
        Ok(n) => Ok(Ok(n.trunc() as i64)),
        Err(e) => Ok(Err(e)),
    }
}

#[cfg(test)]
mod tests {
    use crate::evaluator::{evaluate, CellSource, Value};
    use rook_sheets_core::{CellError, CellRef};

    fn grid() -> impl CellSource {
        // B2:C4 holds a 3x2 block of numbers
        |cell: &CellRef| -> String {
            match cell.to_string().as_str() {
                "B2" => "1".into(),
                "C2" => "2".into(),
                "B3" => "3".into(),
                "C3" => "4".into(),
                "B4" => "5".into(),
                "C4" => "6".into(),
                _ => String::new(),
            }
        }
    }

    #[test]
    fn test_index() {
        assert_eq!(evaluate("=INDEX(B2:C4,1,1)", &grid()), Value::Number(1.0));
        assert_eq!(evaluate("=INDEX(B2:C4,2,2)", &grid()), Value::Number(4.0));
        assert_eq!(evaluate("=INDEX(B2:C4,3,2)", &grid()), Value::Number(6.0));
        // Column defaults to 1
        assert_eq!(evaluate("=INDEX(B2:C4,2)", &grid()), Value::Number(3.0));
    }

    #[test]
    fn test_index_out_of_rectangle() {
        assert_eq!(
            evaluate("=INDEX(B2:C4,4,1)", &grid()),
            Value::Error(CellError::Ref)
        );
        assert_eq!(
            evaluate("=INDEX(B2:C4,1,3)", &grid()),
            Value::Error(CellError::Ref)
        );
    }

    #[test]
    fn test_index_non_positive_offsets() {
        assert_eq!(
            evaluate("=INDEX(B2:C4,0,1)", &grid()),
            Value::Error(CellError::Value)
        );
        assert_eq!(
            evaluate("=INDEX(B2:C4,1,-1)", &grid()),
            Value::Error(CellError::Value)
        );
    }

    #[test]
    fn test_index_requires_syntactic_range() {
        assert_eq!(
            evaluate("=INDEX(5,1)", &grid()),
            Value::Error(CellError::Value)
        );
        assert_eq!(
            evaluate("=INDEX(B2,1)", &grid()),
            Value::Error(CellError::Value)
        );
    }

    #[test]
    fn test_index_corner_order_independent() {
        assert_eq!(evaluate("=INDEX(C4:B2,1,1)", &grid()), Value::Number(1.0));
    }
}
