//! Cell reference parsing, keys and range expansion.
//!
//! Provides bidirectional conversion between spreadsheet-style cell references
//! (e.g., "A1", "B2", "AA100") and zero-indexed column/row coordinates, plus the
//! compact [`CellKey`] used as the map key everywhere in the engine.
//!
//! # Examples
//!
//! ```
//! use gridcalc_engine::engine::CellRef;
//!
//! let cell = CellRef::from_str("B3").unwrap();
//! assert_eq!(cell.col, 1); // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A reference to a cell by column and row indices (0-indexed).
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(col: usize, row: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse a cell reference from spreadsheet notation (e.g., "A1", "B2", "AA10").
    /// Returns None if the input is invalid.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(name: &str) -> Option<CellRef> {
        Self::parse_a1(name)
    }

    fn parse_a1(name: &str) -> Option<CellRef> {
        let caps = a1_re().captures(name)?;
        let letters = &caps["letters"];
        let numbers = &caps["numbers"];

        let mut col_acc = 0usize;
        for c in letters.to_ascii_uppercase().bytes() {
            let digit = (c - b'A') as usize + 1;
            col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
        }
        let col = col_acc.checked_sub(1)?;

        let row = numbers.parse::<usize>().ok()?.checked_sub(1)?;

        Some(CellRef::new(col, row))
    }

    /// The compact key for this position, if both coordinates fit.
    pub fn key(&self) -> Option<CellKey> {
        let row = u32::try_from(self.row).ok()?;
        let col = u32::try_from(self.col).ok()?;
        Some(CellKey::new(row, col))
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }
}

impl std::str::FromStr for CellRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_a1(s).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row as u128 + 1)
    }
}

impl From<CellKey> for CellRef {
    fn from(key: CellKey) -> Self {
        CellRef::new(key.col() as usize, key.row() as usize)
    }
}

fn a1_re() -> &'static Regex {
    static A1_RE: OnceLock<Regex> = OnceLock::new();
    A1_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$")
            .expect("A1 reference regex must compile")
    })
}

/// Compact map key for a grid position: row in the high 32 bits, column in the low 32.
///
/// The derived ordering is row-major. The engine relies on it only to make
/// iteration order deterministic.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellKey(u64);

impl CellKey {
    pub fn new(row: u32, col: u32) -> CellKey {
        CellKey(((row as u64) << 32) | col as u64)
    }

    pub fn row(self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub fn col(self) -> u32 {
        self.0 as u32
    }

    /// Resolve an A1-style reference straight to a key.
    pub fn parse(name: &str) -> Option<CellKey> {
        CellRef::from_str(name)?.key()
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&CellRef::from(*self), f)
    }
}

/// Number of cells in the inclusive rectangle spanned by two corners,
/// saturating at `u64::MAX` for the full key space.
pub fn range_cell_count(start: CellKey, end: CellKey) -> u64 {
    let rows = start.row().abs_diff(end.row()) as u64 + 1;
    let cols = start.col().abs_diff(end.col()) as u64 + 1;
    rows.saturating_mul(cols)
}

/// Expand the inclusive rectangle between two corners in row-major order.
///
/// Corner order does not matter: `A1:C3` and `C3:A1` expand identically.
///
/// Every key is materialized. Check [`range_cell_count`] against a limit
/// first when the corners come from user input, as
/// [`range_keys`](super::deps::range_keys) does; an unchecked far-apart
/// pair exhausts memory.
pub fn expand_range(start: CellKey, end: CellKey) -> Vec<CellKey> {
    let min_row = start.row().min(end.row());
    let max_row = start.row().max(end.row());
    let min_col = start.col().min(end.col());
    let max_col = start.col().max(end.col());

    let capacity = usize::try_from(range_cell_count(start, end)).unwrap_or(usize::MAX);
    let mut keys = Vec::with_capacity(capacity);
    for row in min_row..=max_row {
        for col in min_col..=max_col {
            keys.push(CellKey::new(row, col));
        }
    }
    keys
}
