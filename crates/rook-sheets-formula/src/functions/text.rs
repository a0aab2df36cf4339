//! Text functions

use super::flatten_args;
use crate::ast::Expr;
use crate::error::FormulaResult;
use crate::evaluator::{format_number, EvalContext, Value};
use rook_sheets_core::CellError;

/// Evaluate a scalar argument, propagating an error value as `Err`
fn scalar_arg(arg: &Expr, ctx: &mut EvalContext) -> FormulaResult<Result<Value, CellError>> {
    let value = ctx.eval_expr(arg)?;
    match value.as_error() {
        Some(e) => Ok(Err(e)),
        None => Ok(Ok(value)),
    }
}

fn take_left(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn take_right(s: &str, n: usize) -> String {
    let len = s.chars().count();
    if n >= len {
        return s.to_string();
    }
    s.chars().skip(len - n).collect()
}

/// CONCATENATE: flattens the arguments and joins their text forms
pub fn fn_concatenate(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let values = flatten_args(args, ctx)?;
    let mut result = String::new();

    for value in &values {
        if let Some(e) = value.as_error() {
            return Ok(Value::Error(e));
        }
        result.push_str(&value.to_text());
    }

    Ok(Value::Text(result))
}

/// UPPER(text)
pub fn fn_upper(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let value = match scalar_arg(&args[0], ctx)? {
        Ok(v) => v,
        Err(e) => return Ok(Value::Error(e)),
    };
    Ok(Value::Text(value.to_text().to_uppercase()))
}

/// LOWER(text)
pub fn fn_lower(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let value = match scalar_arg(&args[0], ctx)? {
        Ok(v) => v,
        Err(e) => return Ok(Value::Error(e)),
    };
    Ok(Value::Text(value.to_text().to_lowercase()))
}

/// LEN(text): character count
pub fn fn_len(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let value = match scalar_arg(&args[0], ctx)? {
        Ok(v) => v,
        Err(e) => return Ok(Value::Error(e)),
    };
    Ok(Value::Number(value.to_text().chars().count() as f64))
}

/// LEFT(text, [count=1])
pub fn fn_left(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let value = match scalar_arg(&args[0], ctx)? {
        Ok(v) => v,
        Err(e) => return Ok(Value::Error(e)),
    };

    let count = match optional_count(args.get(1), ctx)? {
        Ok(n) => n,
        Err(e) => return Ok(Value::Error(e)),
    };

    Ok(Value::Text(take_left(&value.to_text(), count)))
}

/// RIGHT(text, [count=1])
pub fn fn_right(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let value = match scalar_arg(&args[0], ctx)? {
        Ok(v) => v,
        Err(e) => return Ok(Value::Error(e)),
    };

    let count = match optional_count(args.get(1), ctx)? {
        Ok(n) => n,
        Err(e) => return Ok(Value::Error(e)),
    };

    Ok(Value::Text(take_right(&value.to_text(), count)))
}

/// Second argument of LEFT/RIGHT: defaults to 1, negative is `#VALUE!`
fn optional_count(
    arg: Option<&Expr>,
    ctx: &mut EvalContext,
) -> FormulaResult<Result<usize, CellError>> {
    let arg = match arg {
        Some(arg) => arg,
        None => return Ok(Ok(1)),
    };

    let value = ctx.eval_expr(arg)?;
    let n = match value.to_number() {
        Ok(n) => n.trunc(),
        Err(e) => return Ok(Err(e)),
    };

    if n < 0.0 {
        return Ok(Err(CellError::Value));
    }
    Ok(Ok(n as usize))
}

/// MID(text, start, count): 1-based start; start < 1 or count < 0 is `#VALUE!`
pub fn fn_mid(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let value = match scalar_arg(&args[0], ctx)? {
        Ok(v) => v,
        Err(e) => return Ok(Value::Error(e)),
    };

    let start = match number_of(&args[1], ctx)? {
        Ok(n) => n.trunc(),
        Err(e) => return Ok(Value::Error(e)),
    };
    let count = match number_of(&args[2], ctx)? {
        Ok(n) => n.trunc(),
        Err(e) => return Ok(Value::Error(e)),
    };

    if start < 1.0 || count < 0.0 {
        return Ok(Value::Error(CellError::Value));
    }

    let text = value.to_text();
    let result: String = text
        .chars()
        .skip(start as usize - 1)
        .take(count as usize)
        .collect();
    Ok(Value::Text(result))
}

fn number_of(arg: &Expr, ctx: &mut EvalContext) -> FormulaResult<Result<f64, CellError>> {
    let value = ctx.eval_expr(arg)?;
    Ok(value.to_number())
}

/// TRIM(text): trims the ends and collapses internal whitespace runs to a
/// single space
pub fn fn_trim(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let value = match scalar_arg(&args[0], ctx)? {
        Ok(v) => v,
        Err(e) => return Ok(Value::Error(e)),
    };

    let trimmed = value
        .to_text()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    Ok(Value::Text(trimmed))
}

/// SUBSTITUTE(text, old, new, [occurrence])
///
/// Replaces every occurrence, or only the given 1-based occurrence; when
/// that occurrence does not exist the text comes back unchanged.
pub fn fn_substitute(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let text = match scalar_arg(&args[0], ctx)? {
        Ok(v) => v.to_text(),
        Err(e) => return Ok(Value::Error(e)),
    };
    let old = match scalar_arg(&args[1], ctx)? {
        Ok(v) => v.to_text(),
        Err(e) => return Ok(Value::Error(e)),
    };
    let new = match scalar_arg(&args[2], ctx)? {
        Ok(v) => v.to_text(),
        Err(e) => return Ok(Value::Error(e)),
    };

    if old.is_empty() {
        return Ok(Value::Text(text));
    }

    match args.get(3) {
        None => Ok(Value::Text(text.replace(&old, &new))),
        Some(arg) => {
            let occurrence = match number_of(arg, ctx)? {
                Ok(n) => n.trunc(),
                Err(e) => return Ok(Value::Error(e)),
            };
            if occurrence < 1.0 {
                return Ok(Value::Error(CellError::Value));
            }

            match text.match_indices(&old).nth(occurrence as usize - 1) {
                Some((idx, _)) => {
                    let mut result = String::with_capacity(text.len());
                    result.push_str(&text[..idx]);
                    result.push_str(&new);
                    result.push_str(&text[idx + old.len()..]);
                    Ok(Value::Text(result))
                }
                None => Ok(Value::Text(text)),
            }
        }
    }
}

/// TEXT(value, format): renders a number through a small recognized format
/// set; unrecognized formats fall back to the plain numeric string, and a
/// non-numeric value comes back unchanged
pub fn fn_text(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let value = match scalar_arg(&args[0], ctx)? {
        Ok(v) => v,
        Err(e) => return Ok(Value::Error(e)),
    };
    let format = match scalar_arg(&args[1], ctx)? {
        Ok(v) => v.to_text(),
        Err(e) => return Ok(Value::Error(e)),
    };

    let n = match value.as_number() {
        Some(n) => n,
        None => return Ok(Value::Text(value.to_text())),
    };

    let rendered = match format.as_str() {
        "0" => format!("{}", n.round() as i64),
        "0.0" => format!("{:.1}", n),
        "0.00" => format!("{:.2}", n),
        "#,##0" => group_thousands(n, 0),
        "#,##0.00" => group_thousands(n, 2),
        "0%" => format!("{}%", (n * 100.0).round() as i64),
        "0.00%" => format!("{:.2}%", n * 100.0),
        _ if format.eq_ignore_ascii_case("mm/dd/yyyy") => {
            match super::date::date_from_serial(n) {
                Some((year, month, day)) => format!("{:02}/{:02}/{:04}", month, day, year),
                None => format_number(n),
            }
        }
        _ => format_number(n),
    };

    Ok(Value::Text(rendered))
}

/// Fixed-decimal rendering with comma-grouped thousands
fn group_thousands(n: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::new();
    let digits = int_part.len();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let mut result = String::new();
    if n < 0.0 {
        result.push('-');
    }
    result.push_str(&grouped);
    if let Some(frac) = frac_part {
        result.push('.');
        result.push_str(frac);
    }
    result
}
