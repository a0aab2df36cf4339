//! Date functions
//!
//! Dates are day-count serials: whole and fractional days since
//! 1970-01-01 UTC. TODAY/NOW produce serials; YEAR/MONTH/DAY decode them
//! back to UTC calendar components.

use crate::ast::Expr;
use crate::error::FormulaResult;
use crate::evaluator::{EvalContext, Value};
use chrono::{DateTime, Datelike, Utc};
use rook_sheets_core::CellError;

const SECS_PER_DAY: i64 = 86_400;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Decode a day serial into UTC (year, month, day); the fractional
/// time-of-day part is ignored
pub(crate) fn date_from_serial(serial: f64) -> Option<(i32, u32, u32)> {
    let days = serial.floor() as i64;
    let secs = days.checked_mul(SECS_PER_DAY)?;
    let dt = DateTime::<Utc>::from_timestamp(secs, 0)?;
    Some((dt.year(), dt.month(), dt.day()))
}

/// TODAY(): whole-day serial for the current UTC date
pub fn fn_today(_args: &[Expr], _ctx: &mut EvalContext) -> FormulaResult<Value> {
    let days = Utc::now().timestamp().div_euclid(SECS_PER_DAY);
    Ok(Value::Number(days as f64))
}

/// NOW(): day serial with the time of day as the fractional part
pub fn fn_now(_args: &[Expr], _ctx: &mut EvalContext) -> FormulaResult<Value> {
    let millis = Utc::now().timestamp_millis() as f64;
    Ok(Value::Number(millis / MILLIS_PER_DAY))
}

/// YEAR(serial)
pub fn fn_year(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    serial_component(args, ctx, |(year, _, _)| year as f64)
}

/// MONTH(serial)
pub fn fn_month(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    serial_component(args, ctx, |(_, month, _)| month as f64)
}

/// DAY(serial)
pub fn fn_day(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    serial_component(args, ctx, |(_, _, day)| day as f64)
}

fn serial_component(
    args: &[Expr],
    ctx: &mut EvalContext,
    pick: fn((i32, u32, u32)) -> f64,
) -> FormulaResult<Value> {
    let value = ctx.eval_expr(&args[0])?;
    let serial = match value.to_number() {
        Ok(n) => n,
        Err(e) => return Ok(Value::Error(e)),
    };

    match date_from_serial(serial) {
        Some(parts) => Ok(Value::Number(pick(parts))),
        None => Ok(Value::Error(CellError::Value)),
    }
}

#[cfg(test)]
mod tests {
    use super::date_from_serial;
    use crate::evaluator::{evaluate, CellSource, Value};
    use rook_sheets_core::{CellError, CellRef};

    fn no_cells() -> impl CellSource {
        |_cell: &CellRef| String::new()
    }

    fn eval(formula: &str) -> Value {
        evaluate(formula, &no_cells())
    }

    #[test]
    fn test_date_from_serial() {
        assert_eq!(date_from_serial(0.0), Some((1970, 1, 1)));
        assert_eq!(date_from_serial(31.0), Some((1970, 2, 1)));
        // Fractional time-of-day does not shift the date
        assert_eq!(date_from_serial(31.75), Some((1970, 2, 1)));
        // Before the epoch
        assert_eq!(date_from_serial(-1.0), Some((1969, 12, 31)));
        // 2021-03-04
        assert_eq!(date_from_serial(18690.0), Some((2021, 3, 4)));
    }

    #[test]
    fn test_year_month_day() {
        assert_eq!(eval("=YEAR(18690)"), Value::Number(2021.0));
        assert_eq!(eval("=MONTH(18690)"), Value::Number(3.0));
        assert_eq!(eval("=DAY(18690)"), Value::Number(4.0));
        assert_eq!(eval("=YEAR(0)"), Value::Number(1970.0));
        assert_eq!(eval("=YEAR(\"x\")"), Value::Error(CellError::Value));
    }

    #[test]
    fn test_today_now_consistent() {
        // TODAY is the whole-day part of NOW
        let today = match eval("=TODAY()") {
            Value::Number(n) => n,
            other => panic!("expected number, got {:?}", other),
        };
        let now = match eval("=NOW()") {
            Value::Number(n) => n,
            other => panic!("expected number, got {:?}", other),
        };

        assert_eq!(today.fract(), 0.0);
        assert!(now >= today);
        assert!(now - today < 1.0 + 1e-6);

        assert_eq!(eval("=YEAR(TODAY())").is_error(), false);
        assert_eq!(eval("=TODAY(1)"), Value::Error(CellError::Value));
    }
}
