use super::CellValue;
use crate::error::EvalError;

/// Format a computed value for display.
pub fn format_value(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Number(n) => format_number(*n),
        CellValue::Text(s) => s.clone(),
        CellValue::Error(e) => e.token().to_string(),
    }
}

/// Format a number for display.
///
/// Shortest round-trip decimal; very large and very small magnitudes switch
/// to exponent form (`1e+21`, `1.5e-7`).
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return EvalError::Error.token().to_string();
    }
    if n == 0.0 {
        // Covers -0 as well.
        return "0".to_string();
    }
    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{}", n);
    }
    let exp = format!("{:e}", n);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}
