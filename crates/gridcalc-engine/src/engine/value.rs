//! Runtime values and numeric coercion.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::EvalError;

/// A value produced by evaluating a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Error(EvalError),
}

impl CellValue {
    /// Numeric value if this is a finite number or a signed-decimal string.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => parse_decimal(s),
            _ => None,
        }
    }

    /// Coerce for arithmetic: anything non-numeric becomes 0.
    pub fn to_number(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }
}

fn decimal_re() -> &'static Regex {
    static DECIMAL_RE: OnceLock<Regex> = OnceLock::new();
    DECIMAL_RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)$").expect("decimal regex must compile")
    })
}

/// Parse text that looks like an optionally signed decimal number.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let text = text.trim();
    if !decimal_re().is_match(text) {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}
