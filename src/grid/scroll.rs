//! Scrolling within a row region
//!
//! Scrolled-off content is dropped; the grid retains only the visible screen.

use crate::grid::Grid;

impl Grid {
    /// Scroll rows [top, bottom] up by n lines, clearing the exposed bottom rows
    pub fn scroll_region_up(&mut self, n: usize, top: usize, bottom: usize) {
        if top >= self.rows || bottom >= self.rows || top > bottom {
            return;
        }

        let region_size = bottom - top + 1;
        let n = n.min(region_size);
        if n == region_size {
            for i in top..=bottom {
                self.clear_row(i);
            }
            return;
        }

        for i in top..=(bottom - n) {
            let src_start = (i + n) * self.cols;
            let dst_start = i * self.cols;
            for j in 0..self.cols {
                self.cells[dst_start + j] = self.cells[src_start + j].clone();
            }
        }

        for i in (bottom - n + 1)..=bottom {
            self.clear_row(i);
        }
    }

    /// Scroll rows [top, bottom] down by n lines, clearing the exposed top rows
    pub fn scroll_region_down(&mut self, n: usize, top: usize, bottom: usize) {
        if top >= self.rows || bottom >= self.rows || top > bottom {
            return;
        }

        let region_size = bottom - top + 1;
        let n = n.min(region_size);
        if n == region_size {
            for i in top..=bottom {
                self.clear_row(i);
            }
            return;
        }

        for i in ((top + n)..=bottom).rev() {
            let src_start = (i - n) * self.cols;
            let dst_start = i * self.cols;
            for j in 0..self.cols {
                self.cells[dst_start + j] = self.cells[src_start + j].clone();
            }
        }

        for i in top..(top + n) {
            self.clear_row(i);
        }
    }
}
