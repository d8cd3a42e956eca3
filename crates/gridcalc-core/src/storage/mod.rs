//! Loading workbook snapshots.

mod parser;

pub use parser::{parse_grd, parse_grd_content};
