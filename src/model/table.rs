//! Comparison table grid model
//!
//! Owns the headers and rows and is the only place structural mutations
//! happen. Every row always holds exactly `headers.len()` cells and the
//! table never shrinks below two columns. Out-of-range indices are silently
//! ignored so a stale cursor can never corrupt the grid.

use super::cell::{Cell, CellKind};
use super::format::{format_for_display, format_value, parse_numeric};
use super::payload::{parse_completion, PopulateError};
use serde::Serialize;
use tracing::debug;

/// Labels of the default three-column skeleton
pub const DEFAULT_HEADERS: [&str; 3] = ["Feature", "Vendor 1", "Vendor 2"];

/// The table never has fewer columns than this (feature + one data column)
pub const MIN_COLUMNS: usize = 2;

/// Index of the pinned feature-name column
pub const FEATURE_COLUMN: usize = 0;

/// Headers plus rows of typed cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    /// Default 1-row, 3-column skeleton
    pub fn new() -> Self {
        let headers: Vec<String> = DEFAULT_HEADERS.iter().map(|h| h.to_string()).collect();
        let rows = vec![vec![Cell::default(); headers.len()]];
        Self { headers, rows }
    }

    /// Build a table from already-consistent parts
    ///
    /// Missing headers up to the two-column minimum take their default
    /// labels, and rows are padded or truncated to the header count.
    pub(crate) fn from_parts(mut headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        while headers.len() < MIN_COLUMNS {
            headers.push(DEFAULT_HEADERS[headers.len()].to_string());
        }
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::default());
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.rows.get_mut(row).and_then(|r| r.get_mut(col))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Structural mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a column labelled from the current column count
    pub fn add_column(&mut self) {
        let label = format!("Vendor {}", self.headers.len());
        debug!(label = %label, "adding column");
        self.headers.push(label);
        for row in &mut self.rows {
            row.push(Cell::default());
        }
    }

    /// Append a row of default cells
    pub fn add_row(&mut self) {
        debug!(row = self.rows.len(), "adding row");
        self.rows.push(vec![Cell::default(); self.headers.len()]);
    }

    /// Remove a row. Returns false when `index` is out of range.
    pub fn delete_row(&mut self, index: usize) -> bool {
        if index >= self.rows.len() {
            debug!(index, "ignoring delete of missing row");
            return false;
        }
        self.rows.remove(index);
        debug!(index, "deleted row");
        true
    }

    /// Remove a column from the headers and every row
    ///
    /// Refused when only the minimum number of columns remain or when
    /// `index` is out of range.
    pub fn delete_column(&mut self, index: usize) -> bool {
        if self.headers.len() <= MIN_COLUMNS {
            debug!(index, "refusing to delete column below minimum width");
            return false;
        }
        if index >= self.headers.len() {
            debug!(index, "ignoring delete of missing column");
            return false;
        }
        self.headers.remove(index);
        for row in &mut self.rows {
            row.remove(index);
        }
        debug!(index, "deleted column");
        true
    }

    /// Swap two columns, headers and cells alike
    ///
    /// The feature column is pinned, so either index being 0 (or out of
    /// range) leaves the table untouched. A drag across several columns is a
    /// series of these swaps, one per boundary crossed.
    pub fn reorder_column(&mut self, from: usize, to: usize) -> bool {
        let width = self.headers.len();
        if from == FEATURE_COLUMN || to == FEATURE_COLUMN || from >= width || to >= width {
            debug!(from, to, "refusing column reorder");
            return false;
        }
        if from == to {
            return true;
        }
        self.headers.swap(from, to);
        for row in &mut self.rows {
            row.swap(from, to);
        }
        debug!(from, to, "swapped columns");
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Content edits
    // ─────────────────────────────────────────────────────────────────────────

    pub fn update_header(&mut self, index: usize, text: &str) -> bool {
        match self.headers.get_mut(index) {
            Some(header) => {
                *header = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Replace a cell's raw text, keeping its kind
    pub fn update_cell_value(&mut self, row: usize, col: usize, text: &str) -> bool {
        match self.cell_mut(row, col) {
            Some(cell) => {
                cell.value = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Replace a cell's kind, keeping its raw text
    pub fn update_cell_kind(&mut self, row: usize, col: usize, kind: CellKind) -> bool {
        match self.cell_mut(row, col) {
            Some(cell) => {
                cell.kind = kind;
                true
            }
            None => false,
        }
    }

    /// Replace the whole table with one parsed from a completion response
    ///
    /// On error the table is left exactly as it was.
    pub fn populate_from_description(&mut self, raw_completion: &str) -> Result<(), PopulateError> {
        let table = parse_completion(raw_completion)?;
        debug!(rows = table.row_count(), "replacing table from completion");
        *self = table;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived views
    // ─────────────────────────────────────────────────────────────────────────

    /// Display text for a cell; the feature column is always shown raw
    pub fn display_value(&self, row: usize, col: usize) -> Option<String> {
        let cell = self.cell(row, col)?;
        if col == FEATURE_COLUMN {
            Some(cell.value.clone())
        } else {
            Some(format_for_display(cell))
        }
    }

    /// Formatted sum of the qualifying cells in a column
    ///
    /// A qualifying cell has a numeric kind and a value that parses to a
    /// finite number. The result is formatted with the kind of the first
    /// qualifying cell in row order; `None` when nothing qualifies.
    pub fn compute_column_total(&self, col: usize) -> Option<String> {
        let mut first_kind = None;
        let mut sum = 0.0;

        for cell in self.rows.iter().filter_map(|row| row.get(col)) {
            if !cell.kind.is_numeric() {
                continue;
            }
            if let Some(value) = parse_numeric(&cell.value) {
                first_kind.get_or_insert(cell.kind);
                sum += value;
            }
        }

        first_kind.map(|kind| format_value(sum, kind))
    }
}
