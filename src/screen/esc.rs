//! ESC (Escape) sequence handling
//!
//! Two-byte escape sequences: cursor save/restore (DECSC/DECRC), index and
//! reverse index (IND/RI), next line (NEL), tab stop set (HTS), and full
//! reset (RIS). Everything else is ignored.

use crate::screen::Screen;

impl Screen {
    pub(in crate::screen) fn esc_dispatch_impl(
        &mut self,
        _intermediates: &[u8],
        _ignore: bool,
        byte: u8,
    ) {
        match byte {
            b'7' => self.save_cursor(),
            b'8' => self.restore_cursor(),
            b'D' => {
                self.pending_wrap = false;
                self.index();
            }
            b'M' => {
                self.pending_wrap = false;
                self.reverse_index();
            }
            b'E' => {
                // NEL: first column of the next line
                self.pending_wrap = false;
                self.cursor.col = 0;
                self.index();
            }
            b'H' => self.set_tab_stop(),
            b'c' => self.reset(),
            _ => {}
        }
    }
}
