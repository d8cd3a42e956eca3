//! Dependency extraction from formula ASTs.
//!
//! Walks a parsed formula and collects every cell key it reads:
//! - Simple cell references: `A1`, `B2`
//! - Every cell of a range argument: `SUM(A1:B5)`
//!
//! Unresolvable references contribute nothing.

use std::collections::BTreeSet;

use super::ast::{Expr, Reference};
use super::cell_ref::{CellKey, expand_range, range_cell_count};

/// Default cap on the number of cells a single range may expand to.
pub const DEFAULT_MAX_RANGE_CELLS: usize = 1_000_000;

/// Expand a range node's corners into keys.
///
/// Returns `None` when either corner is unresolvable or the range is larger
/// than `max_cells`; callers treat both the same as a missing reference.
pub fn range_keys(start: &Reference, end: &Reference, max_cells: usize) -> Option<Vec<CellKey>> {
    let (start_key, end_key) = (start.key?, end.key?);
    let count = range_cell_count(start_key, end_key);
    if count > max_cells as u64 {
        tracing::warn!(
            "range {}:{} spans {} cells, over the limit of {}; ignoring it",
            start.text,
            end.text,
            count,
            max_cells
        );
        return None;
    }
    Some(expand_range(start_key, end_key))
}

/// Collect the set of cell keys a formula reads.
pub fn collect_dependencies(expr: &Expr, max_range_cells: usize) -> BTreeSet<CellKey> {
    let mut deps = BTreeSet::new();
    let mut stack = vec![expr];
    while let Some(node) = stack.pop() {
        match node {
            Expr::Number(_) => {}
            Expr::CellRef(reference) => {
                if let Some(key) = reference.key {
                    deps.insert(key);
                }
            }
            Expr::Range { start, end } => {
                if let Some(keys) = range_keys(start, end, max_range_cells) {
                    deps.extend(keys);
                }
            }
            Expr::Unary { operand, .. } => stack.push(operand),
            Expr::Binary { left, right, .. } => {
                stack.push(right);
                stack.push(left);
            }
            Expr::Function { args, .. } => stack.extend(args),
        }
    }
    deps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{DEFAULT_MAX_DEPTH, parse_formula};
    use pretty_assertions::assert_eq;

    fn deps_of(formula: &str) -> Vec<CellKey> {
        let ast = parse_formula(formula, DEFAULT_MAX_DEPTH).unwrap();
        collect_dependencies(&ast, DEFAULT_MAX_RANGE_CELLS)
            .into_iter()
            .collect()
    }

    fn key(name: &str) -> CellKey {
        CellKey::parse(name).unwrap()
    }

    #[test]
    fn test_no_dependencies() {
        assert!(deps_of("10 + 20").is_empty());
        assert!(deps_of("SUM()").is_empty());
    }

    #[test]
    fn test_deduplicates_references() {
        assert_eq!(deps_of("A1 + A1 * B2"), vec![key("A1"), key("B2")]);
    }

    #[test]
    fn test_range_and_nested_call() {
        assert_eq!(
            deps_of("-SUM(B1:A2, MAX(C3))"),
            vec![key("A1"), key("B1"), key("A2"), key("B2"), key("C3")]
        );
    }

    #[test]
    fn test_unresolvable_reference_is_skipped() {
        assert_eq!(deps_of("A0 + B1"), vec![key("B1")]);
    }

    #[test]
    fn test_long_reference_chain() {
        let formula = format!("A1{}", "+B2*A1".repeat(100_000));
        assert_eq!(deps_of(&formula), vec![key("A1"), key("B2")]);
    }

    #[test]
    fn test_whole_sheet_range_is_refused() {
        let corner = Reference {
            text: "far".into(),
            key: Some(CellKey::new(u32::MAX, u32::MAX)),
        };
        assert_eq!(range_keys(&Reference::new("A1"), &corner, usize::MAX - 1), None);
    }

    #[test]
    fn test_skips_over_limit_ranges() {
        let ast = parse_formula("SUM(A1:A11)+B2", DEFAULT_MAX_DEPTH).unwrap();
        let deps: Vec<CellKey> = collect_dependencies(&ast, 10).into_iter().collect();
        assert_eq!(deps, vec![key("B2")]);
    }
}
