//! Formula engine API.
//!
//! Turns a snapshot of raw cell text into display strings:
//!
//! - [`CellRef`], [`CellKey`] - A1 notation ↔ row/col indices, compact map keys
//! - [`tokenize`] - Formula text to tokens
//! - [`parse_formula`], [`validate_formula`] - Tokens to [`Expr`]
//! - [`collect_dependencies`] - Cells a formula reads
//! - [`schedule`] - Topological evaluation order and cycle detection
//! - [`Engine`], [`compute`] - Full recomputation
//! - [`format_value`], [`format_number`] - Values for display

mod ast;
mod cell_ref;
mod deps;
mod eval;
mod format;
mod lexer;
mod parser;
mod schedule;
mod value;

pub use ast::{BinaryOp, Expr, Reference, UnaryOp};
pub use cell_ref::{CellKey, CellRef, expand_range, range_cell_count};
pub use deps::{DEFAULT_MAX_RANGE_CELLS, collect_dependencies, range_keys};
pub use eval::{ComputeReport, DisplayMap, Engine, EngineConfig, compute};
pub use format::{format_number, format_value};
pub use lexer::{Token, tokenize};
pub use parser::{DEFAULT_MAX_DEPTH, parse_formula, validate_formula};
pub use schedule::{DependencyGraph, Schedule, schedule};
pub use value::{CellValue, parse_decimal};

pub use crate::error::{EvalError, FormulaError, FormulaResult};
