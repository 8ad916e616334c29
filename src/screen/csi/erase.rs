//! Erase CSI sequence handling (ED, EL, ECH)

use crate::screen::csi::{param, param_nonzero};
use crate::screen::Screen;
use vte::Params;

impl Screen {
    pub(in crate::screen) fn handle_csi_erase(&mut self, action: char, params: &Params) {
        let col = self.cursor.col;
        let row = self.cursor.row;
        let last_row = self.rows() - 1;

        match action {
            'J' => {
                // Erase display (ED); no scrollback is kept, so 3 equals 2
                match param(params, 0, 0) {
                    0 => {
                        self.active_grid_mut().clear_screen_below(col, row);
                        self.mark_rows_dirty(row, last_row);
                    }
                    1 => {
                        self.active_grid_mut().clear_screen_above(col, row);
                        self.mark_rows_dirty(0, row);
                    }
                    2 | 3 => {
                        self.active_grid_mut().clear();
                        self.mark_all_dirty();
                    }
                    _ => {}
                }
            }
            'K' => {
                // Erase line (EL)
                match param(params, 0, 0) {
                    0 => self.active_grid_mut().clear_line_right(col, row),
                    1 => self.active_grid_mut().clear_line_left(col, row),
                    2 => self.active_grid_mut().clear_row(row),
                    _ => return,
                }
                self.mark_dirty(row);
            }
            'X' => {
                // Erase characters in place (ECH)
                let n = param_nonzero(params, 0);
                self.active_grid_mut().erase_characters(col, row, n);
                self.mark_dirty(row);
            }
            _ => {}
        }
    }
}
