//! Formula evaluator
//!
//! Walks a formula AST, resolving cell and range references through a
//! caller-supplied [`CellSource`] and dispatching function calls to the
//! built-in table. The public entry point is [`evaluate`]; it never panics
//! and never surfaces an internal error, only values and error sentinels.

use crate::ast::{BinaryOperator, Expr, UnaryOperator};
use crate::error::FormulaResult;
use crate::functions;
use crate::lexer::tokenize;
use crate::parser;
use ahash::AHashSet;
use rook_sheets_core::{CellError, CellRef};
use std::cmp::Ordering;
use std::fmt;

/// Value types produced by evaluation
///
/// There is no boolean type: comparisons and logical functions yield `1`/`0`
/// numbers. Error sentinels are a third, absorbing value kind; at the public
/// boundary they render as their reserved strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Error(CellError),
}

impl Value {
    /// Build a 1/0 number from a condition
    pub fn from_bool(b: bool) -> Self {
        Value::Number(if b { 1.0 } else { 0.0 })
    }

    /// Read as a number without forcing: a number, or a non-empty string
    /// that parses cleanly as one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) if !s.trim().is_empty() => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Force conversion to a number for arithmetic
    ///
    /// An empty string is `0`; a non-numeric string is a `#VALUE!` failure;
    /// an error sentinel carries through unchanged.
    pub fn to_number(&self) -> Result<f64, CellError> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Text(s) if s.trim().is_empty() => Ok(0.0),
            Value::Text(s) => s.trim().parse().map_err(|_| CellError::Value),
            Value::Error(e) => Err(*e),
        }
    }

    /// Convert to text
    pub fn to_text(&self) -> String {
        match self {
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
            Value::Error(e) => e.to_string(),
        }
    }

    /// Condition semantics: a nonzero number, or non-empty text other than "0"
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0,
            Value::Text(s) => !s.is_empty() && s != "0",
            Value::Error(_) => false,
        }
    }

    /// Check if this is an error sentinel
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Get the error if this is one
    pub fn as_error(&self) -> Option<CellError> {
        match self {
            Value::Error(e) => Some(*e),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

/// Render a number the way it appears in a cell: integers without a
/// fraction part, everything else in default decimal form
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Accessor for raw cell contents
///
/// Supplied by the surrounding spreadsheet storage. Must return the raw
/// stored text, including a leading `=` for formula cells, and `""` for a
/// blank cell. Lookups should be side-effect free.
pub trait CellSource {
    fn raw_value(&self, cell: &CellRef) -> String;
}

impl<F> CellSource for F
where
    F: Fn(&CellRef) -> String,
{
    fn raw_value(&self, cell: &CellRef) -> String {
        self(cell)
    }
}

/// Evaluate a cell's raw content against the given cell source
///
/// Content not starting with `=` is data: numeric-looking strings become
/// numbers, anything else is returned as text. A `=` body is tokenized,
/// parsed and walked; malformed formulas and internal failures surface as
/// the `#VALUE!` sentinel. Each call owns a fresh cycle-guard set, so
/// concurrent evaluations are independent.
pub fn evaluate(formula_text: &str, source: &dyn CellSource) -> Value {
    let mut ctx = EvalContext {
        source,
        resolving: AHashSet::new(),
    };
    ctx.evaluate_raw(formula_text)
}

/// State threaded through one top-level [`evaluate`] call
pub struct EvalContext<'a> {
    source: &'a dyn CellSource,
    /// Cells whose evaluation is in progress on this call stack
    resolving: AHashSet<CellRef>,
}

impl<'a> EvalContext<'a> {
    fn evaluate_raw(&mut self, raw: &str) -> Value {
        match raw.strip_prefix('=') {
            Some(body) => self.evaluate_body(body),
            None => data_value(raw),
        }
    }

    /// Tokenize, parse and walk one formula body. Parse failures and any
    /// internal evaluation failure map to `#VALUE!` here, so nothing below
    /// ever escapes to the caller.
    fn evaluate_body(&mut self, body: &str) -> Value {
        let expr = match parser::parse(&tokenize(body)) {
            Ok(expr) => expr,
            Err(_) => return Value::Error(CellError::Value),
        };

        match self.eval_expr(&expr) {
            Ok(value) => value,
            Err(_) => Value::Error(CellError::Value),
        }
    }

    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> FormulaResult<Value> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::String(s) => Ok(Value::Text(s.clone())),

            Expr::CellRef(cell) => Ok(self.resolve_cell(cell)),

            // A range used as a scalar demotes to its first cell in
            // row-major order
            Expr::RangeRef(range) => Ok(self.resolve_cell(&range.start)),

            Expr::BinaryOp { op, left, right } => self.eval_binary_op(*op, left, right),

            Expr::UnaryOp { op, operand } => self.eval_unary_op(*op, operand),

            Expr::Function { name, args } => functions::call(name, args, self),
        }
    }

    /// Resolve a cell to a value, evaluating its formula if it holds one
    ///
    /// Re-entering a cell already on the resolution stack is a circular
    /// reference; it short-circuits to `#CIRC!` instead of recursing.
    /// Repeated references to the same cell are each resolved afresh; only
    /// the cycle guard is carried between them.
    pub(crate) fn resolve_cell(&mut self, cell: &CellRef) -> Value {
        if self.resolving.contains(cell) {
            log::warn!("circular reference detected at {}", cell);
            return Value::Error(CellError::Circular);
        }

        let raw = self.source.raw_value(cell);
        if raw.is_empty() {
            return Value::Text(String::new());
        }

        match raw.strip_prefix('=') {
            Some(body) => {
                self.resolving.insert(*cell);
                let value = self.evaluate_body(body);
                self.resolving.remove(cell);
                value
            }
            None => data_value(&raw),
        }
    }

    fn eval_binary_op(
        &mut self,
        op: BinaryOperator,
        left: &Expr,
        right: &Expr,
    ) -> FormulaResult<Value> {
        let left_val = self.eval_expr(left)?;
        let right_val = self.eval_expr(right)?;

        // Propagate errors
        if let Some(e) = left_val.as_error() {
            return Ok(Value::Error(e));
        }
        if let Some(e) = right_val.as_error() {
            return Ok(Value::Error(e));
        }

        match op {
            BinaryOperator::Add
            | BinaryOperator::Subtract
            | BinaryOperator::Multiply
            | BinaryOperator::Divide
            | BinaryOperator::Power => {
                let l = match left_val.to_number() {
                    Ok(n) => n,
                    Err(e) => return Ok(Value::Error(e)),
                };
                let r = match right_val.to_number() {
                    Ok(n) => n,
                    Err(e) => return Ok(Value::Error(e)),
                };

                Ok(match op {
                    BinaryOperator::Add => Value::Number(l + r),
                    BinaryOperator::Subtract => Value::Number(l - r),
                    BinaryOperator::Multiply => Value::Number(l * r),
                    BinaryOperator::Divide => {
                        if r == 0.0 {
                            Value::Error(CellError::Div0)
                        } else {
                            Value::Number(l / r)
                        }
                    }
                    BinaryOperator::Power => Value::Number(l.powf(r)),
                    _ => unreachable!(),
                })
            }

            BinaryOperator::Concat => {
                Ok(Value::Text(left_val.to_text() + &right_val.to_text()))
            }

            BinaryOperator::Equal
            | BinaryOperator::NotEqual
            | BinaryOperator::LessThan
            | BinaryOperator::LessEqual
            | BinaryOperator::GreaterThan
            | BinaryOperator::GreaterEqual => {
                let ord = compare_values(&left_val, &right_val);
                Ok(Value::from_bool(match op {
                    BinaryOperator::Equal => ord == Ordering::Equal,
                    BinaryOperator::NotEqual => ord != Ordering::Equal,
                    BinaryOperator::LessThan => ord == Ordering::Less,
                    BinaryOperator::LessEqual => ord != Ordering::Greater,
                    BinaryOperator::GreaterThan => ord == Ordering::Greater,
                    BinaryOperator::GreaterEqual => ord != Ordering::Less,
                    _ => unreachable!(),
                }))
            }
        }
    }

    fn eval_unary_op(&mut self, op: UnaryOperator, operand: &Expr) -> FormulaResult<Value> {
        let val = self.eval_expr(operand)?;

        if let Some(e) = val.as_error() {
            return Ok(Value::Error(e));
        }

        match op {
            UnaryOperator::Negate => match val.to_number() {
                Ok(n) => Ok(Value::Number(-n)),
                Err(e) => Ok(Value::Error(e)),
            },
        }
    }
}

/// Interpret raw (non-formula) cell content: numbers stay numbers,
/// everything else is literal text
fn data_value(raw: &str) -> Value {
    match raw.trim().parse::<f64>() {
        Ok(n) => Value::Number(n),
        Err(_) => Value::Text(raw.to_string()),
    }
}

/// Compare two values: numerically when both sides are numeric (a number,
/// or a non-empty string parsing cleanly as one), otherwise as
/// case-insensitive text
fn compare_values(left: &Value, right: &Value) -> Ordering {
    if let (Some(l), Some(r)) = (left.as_number(), right.as_number()) {
        return l.partial_cmp(&r).unwrap_or(Ordering::Equal);
    }

    let l = left.to_text().to_lowercase();
    let r = right.to_text().to_lowercase();
    l.cmp(&r)
}
