//! Cursor movement CSI sequence handling

use crate::screen::csi::{param, param_nonzero};
use crate::screen::Screen;
use vte::Params;

impl Screen {
    pub(in crate::screen) fn handle_csi_cursor(&mut self, action: char, params: &Params) {
        let rows = self.rows();
        let cols = self.cols();

        match action {
            'A' => {
                // Cursor up (CUU)
                let n = param_nonzero(params, 0);
                self.cursor.move_up(n);
                self.pending_wrap = false;
            }
            'B' => {
                // Cursor down (CUD)
                let n = param_nonzero(params, 0);
                self.cursor.move_down(n, rows - 1);
                self.pending_wrap = false;
            }
            'C' => {
                // Cursor forward (CUF)
                let n = param_nonzero(params, 0);
                self.cursor.move_right(n, cols - 1);
                self.pending_wrap = false;
            }
            'D' => {
                // Cursor back (CUB)
                let n = param_nonzero(params, 0);
                self.cursor.move_left(n);
                self.pending_wrap = false;
            }
            'E' => {
                // Cursor next line (CNL)
                let n = param_nonzero(params, 0);
                self.cursor.move_down(n, rows - 1);
                self.cursor.col = 0;
                self.pending_wrap = false;
            }
            'F' => {
                // Cursor preceding line (CPL)
                let n = param_nonzero(params, 0);
                self.cursor.move_up(n);
                self.cursor.col = 0;
                self.pending_wrap = false;
            }
            'G' => {
                // Cursor horizontal absolute (CHA)
                let col = param(params, 0, 1) as usize;
                self.cursor.col = col.saturating_sub(1).min(cols - 1);
                self.pending_wrap = false;
            }
            'H' | 'f' => {
                // Cursor position (CUP/HVP), 1-based row;col
                let row = param(params, 0, 1) as usize;
                let col = param(params, 1, 1) as usize;
                self.cursor.goto(
                    col.saturating_sub(1).min(cols - 1),
                    row.saturating_sub(1).min(rows - 1),
                );
                self.pending_wrap = false;
            }
            'd' => {
                // Line position absolute (VPA)
                let row = param(params, 0, 1) as usize;
                self.cursor.row = row.saturating_sub(1).min(rows - 1);
                self.pending_wrap = false;
            }
            _ => {}
        }
    }
}
