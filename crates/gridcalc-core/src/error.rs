//! Error types for Gridcalc core.

use thiserror::Error;

/// Errors that can occur while loading or editing a workbook.
#[derive(Error, Debug)]
pub enum GridcalcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid cell reference: {0}")]
    InvalidCellRef(String),
}

pub type Result<T> = std::result::Result<T, GridcalcError>;
