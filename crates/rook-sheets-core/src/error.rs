//! Error types for rook-sheets-core

use std::fmt;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when parsing cell and range identifiers
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid cell range format
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),
}

/// Evaluation error sentinels
///
/// These are the five reserved values a cell can display in place of a normal
/// result. They travel through evaluation as an absorbing third value type and
/// cross the public boundary as their exact display strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    /// #REF! - Reference outside a valid rectangle
    Ref,
    /// #VALUE! - Type coercion failure, wrong argument count/shape, malformed parse
    Value,
    /// #DIV/0! - Division or modulo by exactly zero
    Div0,
    /// #NAME? - Unrecognized function name
    Name,
    /// #CIRC! - Circular reference detected during cell resolution
    Circular,
}

impl CellError {
    /// Get the display string for this error
    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::Ref => "#REF!",
            CellError::Value => "#VALUE!",
            CellError::Div0 => "#DIV/0!",
            CellError::Name => "#NAME?",
            CellError::Circular => "#CIRC!",
        }
    }

    /// Parse an error sentinel string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "#REF!" => Some(CellError::Ref),
            "#VALUE!" => Some(CellError::Value),
            "#DIV/0!" => Some(CellError::Div0),
            "#NAME?" => Some(CellError::Name),
            "#CIRC!" => Some(CellError::Circular),
            _ => None,
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
