//! Erase and clear operations for the pane grid

use crate::cell::Cell;
use crate::grid::Grid;

impl Grid {
    /// Clear the entire grid
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Clear a specific row
    pub fn clear_row(&mut self, row: usize) {
        if let Some(row_cells) = self.row_mut(row) {
            row_cells.fill(Cell::default());
        }
    }

    /// Clear from (col, row) to the end of the line, inclusive
    pub fn clear_line_right(&mut self, col: usize, row: usize) {
        if row < self.rows {
            for c in col..self.cols {
                if let Some(cell) = self.get_mut(c, row) {
                    cell.reset();
                }
            }
        }
    }

    /// Clear from the beginning of the line to (col, row), inclusive
    pub fn clear_line_left(&mut self, col: usize, row: usize) {
        if row < self.rows {
            for c in 0..=col.min(self.cols - 1) {
                if let Some(cell) = self.get_mut(c, row) {
                    cell.reset();
                }
            }
        }
    }

    /// Clear from (col, row) to the end of the screen
    pub fn clear_screen_below(&mut self, col: usize, row: usize) {
        self.clear_line_right(col, row);
        for r in (row + 1)..self.rows {
            self.clear_row(r);
        }
    }

    /// Clear from the beginning of the screen to (col, row)
    pub fn clear_screen_above(&mut self, col: usize, row: usize) {
        for r in 0..row {
            self.clear_row(r);
        }
        self.clear_line_left(col, row);
    }

    /// Erase n characters in place starting at (col, row)
    pub fn erase_characters(&mut self, col: usize, row: usize, n: usize) {
        if row < self.rows {
            let end = (col + n).min(self.cols);
            for c in col..end {
                if let Some(cell) = self.get_mut(c, row) {
                    cell.reset();
                }
            }
        }
    }
}
