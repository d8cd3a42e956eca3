//! Parser for .grd snapshot files
//!
//! One cell per line as `CELLREF: RAW`. The raw text is stored as written,
//! formulas included. Wrap a value in double quotes to keep surrounding
//! whitespace; `\"` and `\\` escape inside quotes.

use crate::document::Grid;
use crate::error::{GridcalcError, Result};
use dashmap::DashMap;
use gridcalc_engine::engine::CellRef;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Parse a .grd file and return a Grid
pub fn parse_grd(path: &Path) -> Result<Grid> {
    let content = fs::read_to_string(path)?;
    parse_grd_content(&content)
}

/// Parse .grd content from a string
pub fn parse_grd_content(content: &str) -> Result<Grid> {
    let grid: Grid = Arc::new(DashMap::new());

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Parse "CELLREF: VALUE" format
        let Some((cell_ref_str, value_str)) = line.split_once(':') else {
            return Err(GridcalcError::Parse {
                line: line_num + 1,
                message: "Expected 'CELLREF: VALUE' format".to_string(),
            });
        };

        let cell_ref_str = cell_ref_str.trim();
        let key = CellRef::from_str(cell_ref_str)
            .and_then(|r| r.key())
            .ok_or_else(|| GridcalcError::Parse {
                line: line_num + 1,
                message: format!("Invalid cell reference: {}", cell_ref_str),
            })?;

        let raw = parse_cell_value(value_str);
        if raw.is_empty() {
            continue;
        }
        if grid.insert(key, raw).is_some() {
            tracing::warn!("line {}: {} defined twice, keeping the later value", line_num + 1, cell_ref_str);
        }
    }

    Ok(grid)
}

/// Raw cell text from the value part of a line.
fn parse_cell_value(value: &str) -> String {
    let value = value.trim();

    // Quoted string: starts and ends with '"'
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        return unescape_grd_text(&value[1..value.len() - 1]);
    }

    value.to_string()
}

fn unescape_grd_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                match next {
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    _ => {
                        out.push('\\');
                        out.push(next);
                    }
                }
            } else {
                out.push('\\');
            }
        } else {
            out.push(ch);
        }
    }
    out
}
