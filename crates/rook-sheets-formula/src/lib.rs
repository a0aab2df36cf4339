//! # rook-sheets-formula
//!
//! The formula evaluation engine of rook-sheets: turns a cell's textual
//! formula (e.g. `=SUM(A1:A5)*1.05`) into a value, given an accessor for the
//! raw contents of every other cell.
//!
//! This crate provides:
//! - Tokenizing (formula text → tokens)
//! - Parsing (tokens → AST)
//! - Evaluation (AST → value), with cross-cell resolution, range expansion
//!   and circular-reference detection
//! - The built-in function table
//!
//! The engine holds no spreadsheet state of its own: it reads other cells
//! only through the [`CellSource`] callback, re-resolving on every reference,
//! and signals failures as the five error sentinel strings rather than
//! returning errors or panicking.
//!
//! ## Example
//!
//! ```rust
//! use rook_sheets_formula::{evaluate, CellRef, Value};
//!
//! let sheet = |cell: &CellRef| -> String {
//!     match cell.to_string().as_str() {
//!         "A1" => "5".into(),
//!         "A2" => "=A1*2".into(),
//!         _ => String::new(),
//!     }
//! };
//!
//! assert_eq!(evaluate("=SUM(A1:A2)+1", &sheet), Value::Number(16.0));
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryOperator, Expr, UnaryOperator};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, CellSource, EvalContext, Value};
pub use lexer::{tokenize, Token};
pub use parser::{parse, parse_formula};

// The engine's boundary types live in the core crate
pub use rook_sheets_core::{CellError, CellRef, RangeRef};
