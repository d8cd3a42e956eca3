//! gridcalc_engine - Spreadsheet formula engine.

pub mod engine;
pub mod error;

pub use engine::{CellKey, CellRef, DisplayMap, Engine, EngineConfig, compute};

#[cfg(test)]
mod tests {
    use crate::engine::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_from_str_single_letter_columns() {
        let a1 = CellRef::from_str("A1").unwrap();
        assert_eq!(a1.row, 0);
        assert_eq!(a1.col, 0);

        let b1 = CellRef::from_str("B1").unwrap();
        assert_eq!(b1.row, 0);
        assert_eq!(b1.col, 1);

        let z1 = CellRef::from_str("Z1").unwrap();
        assert_eq!(z1.row, 0);
        assert_eq!(z1.col, 25);
    }

    #[test]
    fn test_from_str_multi_letter_columns() {
        assert_eq!(CellRef::from_str("AA1").unwrap().col, 26);
        assert_eq!(CellRef::from_str("AB1").unwrap().col, 27);
        assert_eq!(CellRef::from_str("AZ1").unwrap().col, 51);
        assert_eq!(CellRef::from_str("BA1").unwrap().col, 52);
    }

    #[test]
    fn test_from_str_row_numbers() {
        assert_eq!(CellRef::from_str("A1").unwrap().row, 0);
        assert_eq!(CellRef::from_str("A10").unwrap().row, 9);
        assert_eq!(CellRef::from_str("A100").unwrap().row, 99);
    }

    #[test]
    fn test_from_str_case_insensitive() {
        let lower = CellRef::from_str("a1").unwrap();
        assert_eq!(lower.row, 0);
        assert_eq!(lower.col, 0);

        let mixed = CellRef::from_str("aA1").unwrap();
        assert_eq!(mixed.col, 26);
    }

    #[test]
    fn test_from_str_invalid_inputs() {
        assert!(CellRef::from_str("").is_none());
        assert!(CellRef::from_str("123").is_none());
        assert!(CellRef::from_str("ABC").is_none());
        assert!(CellRef::from_str("A0").is_none());
        assert!(CellRef::from_str("1A").is_none());
        assert!(CellRef::from_str("A 1").is_none());
    }

    #[test]
    fn test_to_string() {
        assert_eq!(CellRef::new(0, 0).to_string(), "A1");
        assert_eq!(CellRef::new(25, 9).to_string(), "Z10");
        assert_eq!(CellRef::new(26, 0).to_string(), "AA1");
        assert_eq!(CellRef::new(701, 0).to_string(), "ZZ1");
        assert_eq!(CellRef::new(702, 0).to_string(), "AAA1");
    }

    #[test]
    fn test_cell_ref_key_round_trip() {
        let r = CellRef::from_str("C7").unwrap();
        let key = r.key().unwrap();
        assert_eq!(CellRef::from(key), r);
    }

    #[test]
    fn test_compute_literals_untouched() {
        let cells: HashMap<CellKey, &str> = HashMap::from([
            (CellKey::new(0, 0), "007"),
            (CellKey::new(0, 1), " 3.50 "),
            (CellKey::new(0, 2), "hello"),
            (CellKey::new(0, 3), ""),
        ]);
        let display = compute(&cells);
        assert_eq!(display.len(), 4);
        for (key, raw) in &cells {
            assert_eq!(display[key], *raw);
        }
    }

    #[test]
    fn test_compute_numeric_looking_literal_feeds_arithmetic() {
        let cells: HashMap<CellKey, &str> = HashMap::from([
            (CellKey::new(0, 0), " 3.50 "),
            (CellKey::new(0, 1), "=A1*2"),
        ]);
        assert_eq!(compute(&cells)[&CellKey::new(0, 1)], "7");
    }

    #[test]
    fn test_engine_config_limits_apply() {
        let engine = Engine::new(EngineConfig {
            max_depth: 3,
            max_range_cells: 2,
        });
        let cells: HashMap<CellKey, &str> = HashMap::from([
            (CellKey::new(0, 0), "=((((1))))"),
            (CellKey::new(1, 0), "=SUM(C1:C3)"),
            (CellKey::new(2, 0), "=SUM(C1:C2)"),
            (CellKey::new(0, 2), "1"),
            (CellKey::new(1, 2), "2"),
            (CellKey::new(2, 2), "3"),
        ]);
        let display = engine.compute(&cells);
        assert_eq!(display[&CellKey::new(0, 0)], "#ERROR");
        assert_eq!(display[&CellKey::new(1, 0)], "0");
        assert_eq!(display[&CellKey::new(2, 0)], "3");
    }
}
