//! Pane cell grid
//!
//! A flat 2D grid of cells in row-major order. The grid keeps no scrollback:
//! lines scrolled off the top are dropped, which matches the active-screen
//! memory policy of the client core.

use crate::cell::Cell;

mod edit;
mod erase;
mod scroll;

/// A 2D grid of terminal cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Number of columns
    pub(crate) cols: usize,
    /// Number of rows
    pub(crate) rows: usize,
    /// The grid data (row-major order)
    pub(crate) cells: Vec<Cell>,
}

impl Grid {
    /// Create a new grid of default blank cells
    pub fn new(cols: usize, rows: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            cells: vec![Cell::default(); cols * rows],
        }
    }

    /// Get the number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get the number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get a reference to a cell at (col, row)
    pub fn get(&self, col: usize, row: usize) -> Option<&Cell> {
        if col < self.cols && row < self.rows {
            Some(&self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    /// Get a mutable reference to a cell at (col, row)
    pub fn get_mut(&mut self, col: usize, row: usize) -> Option<&mut Cell> {
        if col < self.cols && row < self.rows {
            Some(&mut self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    /// Set a cell at (col, row); out-of-range writes are dropped
    pub fn set(&mut self, col: usize, row: usize, cell: Cell) {
        if let Some(c) = self.get_mut(col, row) {
            *c = cell;
        }
    }

    /// Get a row as a slice
    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        if row < self.rows {
            let start = row * self.cols;
            Some(&self.cells[start..start + self.cols])
        } else {
            None
        }
    }

    /// Get a mutable row
    pub fn row_mut(&mut self, row: usize) -> Option<&mut [Cell]> {
        if row < self.rows {
            let start = row * self.cols;
            Some(&mut self.cells[start..start + self.cols])
        } else {
            None
        }
    }

    /// Get the text content of a row
    pub fn row_text(&self, row: usize) -> String {
        self.row(row)
            .map(|cells| cells.iter().map(|cell| cell.c).collect::<String>())
            .unwrap_or_default()
    }

    /// Get the visible text, one line per row, trailing blanks trimmed
    pub fn content_as_string(&self) -> String {
        (0..self.rows)
            .map(|r| self.row_text(r).trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Clone out every row, for snapshot construction
    pub fn rows_cloned(&self) -> Vec<Vec<Cell>> {
        (0..self.rows)
            .map(|r| self.row(r).unwrap_or(&[]).to_vec())
            .collect()
    }

    /// Resize the grid, preserving overlapping content from the top-left
    pub fn resize(&mut self, cols: usize, rows: usize) {
        let cols = cols.max(1);
        let rows = rows.max(1);
        if cols == self.cols && rows == self.rows {
            return;
        }

        let mut cells = vec![Cell::default(); cols * rows];
        let copy_rows = rows.min(self.rows);
        let copy_cols = cols.min(self.cols);
        for r in 0..copy_rows {
            for c in 0..copy_cols {
                cells[r * cols + c] = self.cells[r * self.cols + c].clone();
            }
        }

        self.cols = cols;
        self.rows = rows;
        self.cells = cells;
    }
}

#[cfg(test)]
mod tests;
