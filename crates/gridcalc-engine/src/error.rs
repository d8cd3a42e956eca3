//! Error types for the formula engine.

use std::fmt;

use thiserror::Error;

/// Reasons a formula fails to lex or parse.
///
/// A formula that fails to parse is never evaluated; its cell displays
/// [`EvalError::Error`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("Empty formula")]
    Empty,

    #[error("Unexpected token '{found}', expected {expected}")]
    UnexpectedToken { found: String, expected: &'static str },

    #[error("Unexpected end of formula, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("Unexpected trailing input starting at '{0}'")]
    TrailingInput(String),

    #[error("Formula nesting exceeds the limit of {limit}")]
    TooDeep { limit: usize },
}

pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Error values a cell can evaluate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvalError {
    /// Parse failure, unknown function or non-finite number.
    Error,
    /// Division by zero.
    DivZero,
    /// The cell is part of, or downstream of, a circular reference.
    Cycle,
}

impl EvalError {
    pub fn token(self) -> &'static str {
        match self {
            EvalError::Error => "#ERROR",
            EvalError::DivZero => "#DIV/0!",
            EvalError::Cycle => "#CYCLE",
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
