//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Internal failures during formula parsing or evaluation
///
/// These never cross the public `evaluate` boundary: a parse failure and any
/// evaluation failure that reaches the top are surfaced as the `#VALUE!`
/// sentinel instead.
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Formula evaluation error
    #[error("Evaluation error: {0}")]
    Evaluation(String),
}
