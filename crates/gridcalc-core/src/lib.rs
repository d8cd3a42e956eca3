//! gridcalc-core - UI-agnostic cell store + snapshot loading.

pub mod document;
pub mod error;
pub mod storage;

pub use document::Workbook;
pub use error::{GridcalcError, Result};

pub use gridcalc_engine::engine::{CellKey, CellRef};
