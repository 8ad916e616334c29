//! Line and character editing CSI sequence handling (IL, DL, ICH, DCH)

use crate::screen::csi::param_nonzero;
use crate::screen::Screen;
use vte::Params;

impl Screen {
    pub(in crate::screen) fn handle_csi_edit(&mut self, action: char, params: &Params) {
        let n = param_nonzero(params, 0);
        let col = self.cursor.col;
        let row = self.cursor.row;
        let (top, bottom) = (self.scroll_top, self.scroll_bottom);

        match action {
            'L' => {
                // Insert lines (IL); only effective inside the scroll region
                if row >= top && row <= bottom {
                    self.active_grid_mut().insert_lines(n, row, bottom);
                    self.mark_rows_dirty(row, bottom);
                    self.cursor.col = 0;
                    self.pending_wrap = false;
                }
            }
            'M' => {
                // Delete lines (DL)
                if row >= top && row <= bottom {
                    self.active_grid_mut().delete_lines(n, row, bottom);
                    self.mark_rows_dirty(row, bottom);
                    self.cursor.col = 0;
                    self.pending_wrap = false;
                }
            }
            '@' => {
                // Insert blank characters (ICH)
                self.active_grid_mut().insert_chars(col, row, n);
                self.mark_dirty(row);
            }
            'P' => {
                // Delete characters (DCH)
                self.active_grid_mut().delete_chars(col, row, n);
                self.mark_dirty(row);
            }
            _ => {}
        }
    }
}
