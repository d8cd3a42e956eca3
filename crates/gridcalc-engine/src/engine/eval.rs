//! Full-workbook recomputation.
//!
//! Every call parses all formula cells, collects their dependencies, schedules
//! them, evaluates in topological order and formats the results. Nothing is
//! kept between calls.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::deps::{DEFAULT_MAX_RANGE_CELLS, collect_dependencies, range_keys};
use super::format::format_value;
use super::parser::{DEFAULT_MAX_DEPTH, parse_formula};
use super::schedule::schedule;
use super::{CellKey, CellValue};
use crate::error::EvalError;

/// Final mapping from cell key to display text.
pub type DisplayMap = HashMap<CellKey, String>;

/// Engine limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum expression nesting; deeper formulas fail to parse.
    pub max_depth: usize,
    /// Ranges spanning more cells than this are ignored.
    pub max_range_cells: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            max_range_cells: DEFAULT_MAX_RANGE_CELLS,
        }
    }
}

/// Everything a recompute produced, for callers that need more than display text.
#[derive(Debug, Clone, Default)]
pub struct ComputeReport {
    pub display: DisplayMap,
    /// Formula cells in the order they were evaluated.
    pub order: Vec<CellKey>,
    /// Formula cells on, or downstream of, a cycle.
    pub cyclic: Vec<CellKey>,
    /// Formula cells whose text failed to parse.
    pub parse_errors: Vec<CellKey>,
    values: HashMap<CellKey, CellValue>,
}

impl ComputeReport {
    /// Computed value of a formula cell, if it was evaluated or marked as an error.
    pub fn value(&self, key: CellKey) -> Option<&CellValue> {
        self.values.get(&key)
    }
}

/// The formula engine. Holds only configuration, so one instance can be
/// shared across threads computing independent snapshots.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Engine { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Recompute every cell and return the display map.
    pub fn compute<S: AsRef<str>>(&self, cells: &HashMap<CellKey, S>) -> DisplayMap {
        self.compute_report(cells).display
    }

    /// Recompute every cell, keeping the evaluation order and error sets.
    pub fn compute_report<S: AsRef<str>>(&self, cells: &HashMap<CellKey, S>) -> ComputeReport {
        let mut keys: Vec<CellKey> = cells.keys().copied().collect();
        keys.sort_unstable();

        let mut asts: BTreeMap<CellKey, Expr> = BTreeMap::new();
        let mut deps: BTreeMap<CellKey, BTreeSet<CellKey>> = BTreeMap::new();
        let mut computed: HashMap<CellKey, CellValue> = HashMap::new();
        let mut parse_errors = Vec::new();

        for &key in &keys {
            let Some(body) = cells[&key].as_ref().strip_prefix('=') else {
                continue;
            };
            match parse_formula(body, self.config.max_depth) {
                Ok(ast) => {
                    deps.insert(key, collect_dependencies(&ast, self.config.max_range_cells));
                    asts.insert(key, ast);
                }
                Err(e) => {
                    tracing::trace!("{}: {}", key, e);
                    computed.insert(key, CellValue::Error(EvalError::Error));
                    parse_errors.push(key);
                }
            }
        }

        let schedule = schedule(&deps);

        let mut evaluator = Evaluator {
            cells,
            computed,
            max_range_cells: self.config.max_range_cells,
        };
        for key in &schedule.order {
            let value = evaluator.eval_scalar(&asts[key]);
            evaluator.computed.insert(*key, value);
        }
        let mut computed = evaluator.computed;
        for &key in &schedule.cyclic {
            computed.insert(key, CellValue::Error(EvalError::Cycle));
        }

        let display: DisplayMap = cells
            .iter()
            .map(|(&key, raw)| {
                let raw = raw.as_ref();
                let text = if raw.starts_with('=') {
                    computed.get(&key).map(format_value).unwrap_or_default()
                } else {
                    raw.to_string()
                };
                (key, text)
            })
            .collect();

        tracing::debug!(
            "recomputed {} cells: {} formulas, {} parse errors, {} cyclic",
            cells.len(),
            asts.len() + parse_errors.len(),
            parse_errors.len(),
            schedule.cyclic.len()
        );

        ComputeReport {
            display,
            order: schedule.order,
            cyclic: schedule.cyclic,
            parse_errors,
            values: computed,
        }
    }

    /// Evaluate a standalone formula against a workbook without storing it.
    ///
    /// `formula` may include its leading `=`.
    pub fn evaluate<S: AsRef<str>>(&self, formula: &str, cells: &HashMap<CellKey, S>) -> String {
        let body = formula.strip_prefix('=').unwrap_or(formula);
        let ast = match parse_formula(body, self.config.max_depth) {
            Ok(ast) => ast,
            Err(e) => {
                tracing::trace!("standalone formula: {}", e);
                return EvalError::Error.token().to_string();
            }
        };
        let report = self.compute_report(cells);
        let evaluator = Evaluator {
            cells,
            computed: report.values,
            max_range_cells: self.config.max_range_cells,
        };
        format_value(&evaluator.eval_scalar(&ast))
    }
}

/// Recompute a workbook with the default configuration.
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use gridcalc_engine::engine::{CellKey, compute};
///
/// let a1 = CellKey::parse("A1").unwrap();
/// let a2 = CellKey::parse("A2").unwrap();
/// let cells = HashMap::from([(a1, "2"), (a2, "=A1*21")]);
/// assert_eq!(compute(&cells)[&a2], "42");
/// ```
pub fn compute<S: AsRef<str>>(cells: &HashMap<CellKey, S>) -> DisplayMap {
    Engine::default().compute(cells)
}

/// Result of evaluating a node: ranges yield lists, everything else a scalar.
enum Evaluated {
    Scalar(CellValue),
    List(Vec<CellValue>),
}

struct Evaluator<'a, S> {
    cells: &'a HashMap<CellKey, S>,
    computed: HashMap<CellKey, CellValue>,
    max_range_cells: usize,
}

impl<S: AsRef<str>> Evaluator<'_, S> {
    /// Computed formula value, else the literal text, else empty.
    fn lookup(&self, key: CellKey) -> CellValue {
        if let Some(value) = self.computed.get(&key) {
            return value.clone();
        }
        match self.cells.get(&key) {
            Some(raw) if !raw.as_ref().starts_with('=') => CellValue::Text(raw.as_ref().to_string()),
            _ => CellValue::Empty,
        }
    }

    fn eval(&self, expr: &Expr) -> Evaluated {
        match expr {
            Expr::Number(n) => Evaluated::Scalar(CellValue::Number(*n)),
            Expr::CellRef(reference) => Evaluated::Scalar(
                reference
                    .key
                    .map(|key| self.lookup(key))
                    .unwrap_or(CellValue::Empty),
            ),
            Expr::Range { start, end } => Evaluated::List(
                range_keys(start, end, self.max_range_cells)
                    .map(|keys| keys.into_iter().map(|key| self.lookup(key)).collect())
                    .unwrap_or_default(),
            ),
            Expr::Unary { op, operand } => {
                let n = self.eval_scalar(operand).to_number();
                Evaluated::Scalar(CellValue::Number(match op {
                    UnaryOp::Plus => n,
                    UnaryOp::Negate => -n,
                }))
            }
            Expr::Binary { .. } => Evaluated::Scalar(self.eval_chain(expr)),
            Expr::Function { name, args } => Evaluated::Scalar(self.call(name, args)),
        }
    }

    /// Evaluate a left-nested run of binary operators.
    ///
    /// The left spine is walked with a loop, so only right operands recurse
    /// and those are bounded by the parser's depth limit.
    fn eval_chain(&self, expr: &Expr) -> CellValue {
        let mut pending = Vec::new();
        let mut leftmost = expr;
        while let Expr::Binary { op, left, right } = leftmost {
            pending.push((*op, &**right));
            leftmost = &**left;
        }

        let mut acc = self.eval_scalar(leftmost);
        for (op, right) in pending.into_iter().rev() {
            let l = acc.to_number();
            let r = self.eval_scalar(right).to_number();
            acc = match op {
                BinaryOp::Add => CellValue::Number(l + r),
                BinaryOp::Subtract => CellValue::Number(l - r),
                BinaryOp::Multiply => CellValue::Number(l * r),
                BinaryOp::Divide if r == 0.0 => CellValue::Error(EvalError::DivZero),
                BinaryOp::Divide => CellValue::Number(l / r),
            };
        }
        acc
    }

    /// Evaluate to a single value; a range contributes only its first cell.
    fn eval_scalar(&self, expr: &Expr) -> CellValue {
        match self.eval(expr) {
            Evaluated::Scalar(value) => value,
            Evaluated::List(values) => values.into_iter().next().unwrap_or(CellValue::Empty),
        }
    }

    fn call(&self, name: &str, args: &[Expr]) -> CellValue {
        let mut values = Vec::new();
        for arg in args {
            match self.eval(arg) {
                Evaluated::Scalar(value) => values.push(value),
                Evaluated::List(list) => values.extend(list),
            }
        }
        let numbers: Vec<f64> = values.iter().filter_map(CellValue::as_number).collect();
        let count = numbers.len();
        let total: f64 = numbers.iter().sum();

        let result = match name.to_ascii_uppercase().as_str() {
            "SUM" => total,
            "AVERAGE" if count == 0 => 0.0,
            "AVERAGE" => total / count as f64,
            "MIN" => numbers.iter().copied().reduce(f64::min).unwrap_or(0.0),
            "MAX" => numbers.iter().copied().reduce(f64::max).unwrap_or(0.0),
            "COUNT" => count as f64,
            _ => return CellValue::Error(EvalError::Error),
        };
        CellValue::Number(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Reference;
    use pretty_assertions::assert_eq;

    fn sheet(entries: &[(&str, &str)]) -> HashMap<CellKey, String> {
        entries
            .iter()
            .map(|(cell, raw)| (CellKey::parse(cell).unwrap(), raw.to_string()))
            .collect()
    }

    fn show(display: &DisplayMap, cell: &str) -> String {
        display[&CellKey::parse(cell).unwrap()].clone()
    }

    #[test]
    fn test_arithmetic_over_literals() {
        let cells = sheet(&[("A1", "2"), ("A2", "3"), ("A3", "=A1+A2"), ("A4", "=A2*2")]);
        let display = compute(&cells);
        assert_eq!(show(&display, "A3"), "5");
        assert_eq!(show(&display, "A4"), "6");
        assert_eq!(show(&display, "A1"), "2");
    }

    #[test]
    fn test_text_coerces_to_zero() {
        let cells = sheet(&[("A1", "apples"), ("A2", "=A1+4"), ("A3", "=-A1")]);
        let display = compute(&cells);
        assert_eq!(show(&display, "A2"), "4");
        assert_eq!(show(&display, "A3"), "0");
    }

    #[test]
    fn test_empty_and_unresolvable_references() {
        let cells = sheet(&[("A1", "=Z99"), ("A2", "=A0"), ("A3", "=A0+1")]);
        let display = compute(&cells);
        assert_eq!(show(&display, "A1"), "");
        assert_eq!(show(&display, "A2"), "");
        assert_eq!(show(&display, "A3"), "1");
    }

    #[test]
    fn test_division_by_zero_is_local() {
        let cells = sheet(&[
            ("A1", "10"),
            ("A2", "0"),
            ("A3", "=A1/A2"),
            ("A4", "=A1+A2"),
            ("A5", "=A3+1"),
        ]);
        let display = compute(&cells);
        assert_eq!(show(&display, "A3"), "#DIV/0!");
        assert_eq!(show(&display, "A4"), "10");
        // A dependent reads the error as non-numeric.
        assert_eq!(show(&display, "A5"), "1");
    }

    #[test]
    fn test_functions_over_ranges() {
        let cells = sheet(&[
            ("A1", "4"),
            ("A2", "6"),
            ("A3", "10"),
            ("A4", "note"),
            ("B1", "=SUM(A1:A4)"),
            ("B2", "=average(A1:A4)"),
            ("B3", "=COUNT(A1:A4, 1, A4)"),
            ("B4", "=MIN(A3:A1)"),
            ("B5", "=Max(A1:A3, 50)"),
        ]);
        let display = compute(&cells);
        assert_eq!(show(&display, "B1"), "20");
        assert_eq!(show(&display, "B2"), "6.666666666666667");
        assert_eq!(show(&display, "B3"), "4");
        assert_eq!(show(&display, "B4"), "4");
        assert_eq!(show(&display, "B5"), "50");
    }

    #[test]
    fn test_functions_with_no_numbers() {
        let cells = sheet(&[
            ("A1", "=AVERAGE()"),
            ("A2", "=MIN(C1:C3)"),
            ("A3", "=MAX(\"x\")"),
            ("A4", "=COUNT(C1)"),
        ]);
        let display = compute(&cells);
        assert_eq!(show(&display, "A1"), "0");
        assert_eq!(show(&display, "A2"), "0");
        assert_eq!(show(&display, "A4"), "0");
        // Quotes are skipped by the lexer, leaving an identifier argument.
        assert_eq!(show(&display, "A3"), "#ERROR");
    }

    #[test]
    fn test_unknown_function() {
        let cells = sheet(&[("A1", "=FOO(1)"), ("A2", "=A1*2")]);
        let display = compute(&cells);
        assert_eq!(show(&display, "A1"), "#ERROR");
        assert_eq!(show(&display, "A2"), "0");
    }

    #[test]
    fn test_parse_error_does_not_block_others() {
        let cells = sheet(&[("A1", "=1+"), ("A2", "="), ("A3", "=A1+2"), ("B1", "=7")]);
        let report = Engine::default().compute_report(&cells);
        assert_eq!(show(&report.display, "A1"), "#ERROR");
        assert_eq!(show(&report.display, "A2"), "#ERROR");
        assert_eq!(show(&report.display, "A3"), "2");
        assert_eq!(show(&report.display, "B1"), "7");
        assert_eq!(report.parse_errors.len(), 2);
        assert!(report.cyclic.is_empty());
    }

    #[test]
    fn test_cycles_and_downstream() {
        let cells = sheet(&[
            ("A1", "1"),
            ("B1", "=A1+1"),
            ("C1", "=B1+1"),
            ("A2", "=B2"),
            ("B2", "=A2"),
            ("C2", "=A2+C1"),
        ]);
        let report = Engine::default().compute_report(&cells);
        assert_eq!(show(&report.display, "B1"), "2");
        assert_eq!(show(&report.display, "C1"), "3");
        assert_eq!(show(&report.display, "A2"), "#CYCLE");
        assert_eq!(show(&report.display, "B2"), "#CYCLE");
        assert_eq!(show(&report.display, "C2"), "#CYCLE");
        assert_eq!(
            report.value(CellKey::parse("C2").unwrap()),
            Some(&CellValue::Error(EvalError::Cycle))
        );
    }

    #[test]
    fn test_range_under_operator_uses_first_cell() {
        let cells = sheet(&[("A1", "3"), ("A2", "5")]);
        let evaluator = Evaluator {
            cells: &cells,
            computed: HashMap::new(),
            max_range_cells: DEFAULT_MAX_RANGE_CELLS,
        };
        let expr = Expr::Binary {
            op: BinaryOp::Multiply,
            left: Box::new(Expr::Range {
                start: Reference::new("A1"),
                end: Reference::new("A2"),
            }),
            right: Box::new(Expr::Number(2.0)),
        };
        assert_eq!(evaluator.eval_scalar(&expr), CellValue::Number(6.0));
    }

    #[test]
    fn test_overflow_displays_error() {
        let huge = format!("1{}", "0".repeat(308));
        let times_ten = format!("={}*10", huge);
        let plain = format!("={}", huge);
        let cells = sheet(&[
            ("A1", times_ten.as_str()),
            ("A2", "=A1+1"),
            ("A3", plain.as_str()),
        ]);
        let display = compute(&cells);
        assert_eq!(show(&display, "A1"), "#ERROR");
        // Non-finite values coerce to 0 for dependents.
        assert_eq!(show(&display, "A2"), "1");
        assert_eq!(show(&display, "A3"), "1e+308");
    }

    #[test]
    fn test_odd_number_literals_are_non_numeric() {
        let huge = format!("=1{}", "0".repeat(400));
        let cells = sheet(&[
            ("A1", "=SUM(., 2)"),
            ("A2", "=COUNT(., 2)"),
            ("A3", "=."),
            ("A4", "=. + 1"),
            ("A5", huge.as_str()),
            ("A6", "=A5*2"),
        ]);
        let display = compute(&cells);
        assert_eq!(show(&display, "A1"), "2");
        assert_eq!(show(&display, "A2"), "1");
        assert_eq!(show(&display, "A3"), "#ERROR");
        assert_eq!(show(&display, "A4"), "1");
        assert_eq!(show(&display, "A5"), "#ERROR");
        assert_eq!(show(&display, "A6"), "0");
    }

    #[test]
    fn test_long_operator_chains() {
        let sum = format!("=1{}", "+1".repeat(200_000));
        let product = format!("=A1{}", "*A1/A1".repeat(100_000));
        let divided = format!("=1{}/0{}", "-1".repeat(50_000), "+1".repeat(50_000));
        let cells = sheet(&[
            ("A1", "3"),
            ("B1", sum.as_str()),
            ("B2", product.as_str()),
            ("B3", divided.as_str()),
        ]);
        let display = compute(&cells);
        assert_eq!(show(&display, "B1"), "200001");
        assert_eq!(show(&display, "B2"), "3");
        // The 1/0 term reads as 0, so 49,999 subtractions and 50,000 additions remain.
        assert_eq!(show(&display, "B3"), "2");
    }

    #[test]
    fn test_evaluate_standalone_formula() {
        let cells = sheet(&[("A1", "4"), ("A2", "=A1*2")]);
        let engine = Engine::default();
        assert_eq!(engine.evaluate("=A1+A2", &cells), "12");
        assert_eq!(engine.evaluate("SUM(A1:A2)/0", &cells), "#DIV/0!");
        assert_eq!(engine.evaluate("=(", &cells), "#ERROR");
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }
}
