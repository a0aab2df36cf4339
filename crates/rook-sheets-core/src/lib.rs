//! # rook-sheets-core
//!
//! Core addressing and error vocabulary for the rook-sheets formula engine.
//!
//! This crate provides the fundamental types shared across the engine:
//! - [`CellRef`] and [`RangeRef`] - cell identifiers (`"B12"`) and rectangular
//!   ranges (`"A1:B3"`), with parsing, canonical formatting and row-major
//!   range expansion
//! - [`CellError`] - the five evaluation error sentinels (`#REF!`, `#VALUE!`,
//!   `#DIV/0!`, `#NAME?`, `#CIRC!`)
//!
//! ## Example
//!
//! ```rust
//! use rook_sheets_core::{CellRef, RangeRef};
//!
//! let cell = CellRef::parse("b12").unwrap();
//! assert_eq!(cell.to_string(), "B12");
//!
//! let range = RangeRef::parse("B3:A1").unwrap();
//! let ids: Vec<String> = range.cells().map(|c| c.to_string()).collect();
//! assert_eq!(ids, ["A1", "B1", "A2", "B2", "A3", "B3"]);
//! ```

pub mod address;
pub mod error;

// Re-exports for convenience
pub use address::{CellRef, RangeRef};
pub use error::{CellError, Error, Result};
