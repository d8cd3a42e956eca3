//! Evaluation ordering and circular dependency detection for formula cells.
//!
//! Builds a graph whose nodes are the formula cells that parsed, with an edge
//! from each precedent formula cell to every formula cell that reads it.
//! Literal cells are leaves and never enter the graph. Kahn's algorithm then
//! yields an evaluation order; whatever never reaches indegree zero is either
//! on a cycle or downstream of one.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::CellKey;

/// Forward dependency graph restricted to formula cells.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Precedent -> formula cells that read it.
    dependents: BTreeMap<CellKey, Vec<CellKey>>,
    /// Count of incoming formula-to-formula edges per node.
    indegree: BTreeMap<CellKey, usize>,
}

impl DependencyGraph {
    /// Build the graph from each formula cell's dependency set.
    pub fn build(formulas: &BTreeMap<CellKey, BTreeSet<CellKey>>) -> Self {
        let mut graph = DependencyGraph::default();
        for &cell in formulas.keys() {
            graph.indegree.insert(cell, 0);
        }
        for (&cell, deps) in formulas {
            for &dep in deps {
                if !formulas.contains_key(&dep) {
                    continue;
                }
                graph.dependents.entry(dep).or_default().push(cell);
                *graph.indegree.entry(cell).or_default() += 1;
            }
        }
        graph
    }

    /// Formula cells that read `cell`.
    pub fn dependents(&self, cell: CellKey) -> &[CellKey] {
        self.dependents.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of formula cells `cell` reads.
    pub fn indegree(&self, cell: CellKey) -> usize {
        self.indegree.get(&cell).copied().unwrap_or(0)
    }

    pub fn node_count(&self) -> usize {
        self.indegree.len()
    }

    /// Kahn topological sort with a FIFO queue.
    pub fn schedule(&self) -> Schedule {
        let mut indegree = self.indegree.clone();
        let mut queue: VecDeque<CellKey> = indegree
            .iter()
            .filter(|&(_, &n)| n == 0)
            .map(|(&cell, _)| cell)
            .collect();

        let mut order = Vec::with_capacity(indegree.len());
        while let Some(cell) = queue.pop_front() {
            order.push(cell);
            for &next in self.dependents(cell) {
                if let Some(n) = indegree.get_mut(&next) {
                    *n -= 1;
                    if *n == 0 {
                        queue.push_back(next);
                    }
                }
            }
        }

        let cyclic: Vec<CellKey> = indegree
            .into_iter()
            .filter(|&(_, n)| n > 0)
            .map(|(cell, _)| cell)
            .collect();

        tracing::trace!(
            "scheduled {} formula cells, {} left on or behind a cycle",
            order.len(),
            cyclic.len()
        );

        Schedule { order, cyclic }
    }
}

/// Result of scheduling: evaluation order plus the cells that could not be ordered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schedule {
    pub order: Vec<CellKey>,
    pub cyclic: Vec<CellKey>,
}

/// Order formula cells for evaluation. See [`DependencyGraph::schedule`].
pub fn schedule(formulas: &BTreeMap<CellKey, BTreeSet<CellKey>>) -> Schedule {
    DependencyGraph::build(formulas).schedule()
}
