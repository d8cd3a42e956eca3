use super::Workbook;
use crate::error::{GridcalcError, Result};
use gridcalc_engine::engine::{CellKey, CellRef, ComputeReport, DisplayMap};
use std::collections::HashMap;

impl Workbook {
    fn key_for(cell_ref: &CellRef) -> Result<CellKey> {
        cell_ref
            .key()
            .ok_or_else(|| GridcalcError::InvalidCellRef(cell_ref.to_string()))
    }

    /// Set cell contents from raw input. Empty input clears the cell.
    pub fn set_cell(&mut self, cell_ref: &CellRef, input: &str) -> Result<()> {
        let key = Self::key_for(cell_ref)?;
        if input.is_empty() {
            self.grid.remove(&key);
        } else {
            self.grid.insert(key, input.to_string());
        }
        self.dirty = true;
        Ok(())
    }

    /// Clear the specified cell
    pub fn clear_cell(&mut self, cell_ref: &CellRef) -> Result<()> {
        self.set_cell(cell_ref, "")
    }

    /// Raw text stored at a cell, if any.
    pub fn raw(&self, cell_ref: &CellRef) -> Option<String> {
        let key = cell_ref.key()?;
        self.grid.get(&key).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Owned copy of the cell store for the engine.
    pub fn snapshot(&self) -> HashMap<CellKey, String> {
        self.grid
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    /// Raw cells sorted by position (row-major).
    pub fn cells_sorted(&self) -> Vec<(CellKey, String)> {
        let mut cells: Vec<_> = self.snapshot().into_iter().collect();
        cells.sort_by_key(|(key, _)| *key);
        cells
    }

    /// Recompute every cell and cache the display map.
    pub fn recompute(&mut self) -> ComputeReport {
        let report = self.engine.compute_report(&self.snapshot());
        if !report.cyclic.is_empty() {
            tracing::debug!("{} cells on or behind a circular reference", report.cyclic.len());
        }
        self.display = report.display.clone();
        self.dirty = false;
        report
    }

    /// Display text for every cell, recomputing first if anything changed.
    pub fn display_map(&mut self) -> &DisplayMap {
        if self.dirty {
            self.recompute();
        }
        &self.display
    }

    /// Display text for a cell; empty for cells with no content.
    pub fn display(&mut self, cell_ref: &CellRef) -> String {
        let Some(key) = cell_ref.key() else {
            return String::new();
        };
        self.display_map().get(&key).cloned().unwrap_or_default()
    }

    /// Evaluate a formula against the current cells without storing it.
    pub fn evaluate(&self, formula: &str) -> String {
        self.engine.evaluate(formula, &self.snapshot())
    }
}
