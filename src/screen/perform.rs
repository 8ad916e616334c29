//! VTE Perform trait implementation for Screen
//!
//! The interface between the byte-level parser and the screen state.
//! Methods delegate to the handlers in the sibling modules.

use crate::screen::Screen;
use vte::{Params, Perform};

impl Perform for Screen {
    fn print(&mut self, c: char) {
        self.write_printable(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\r' => {
                self.pending_wrap = false;
                self.cursor.col = 0;
            }
            // LF, VT and FF start the next line; tmux panes run with ONLCR
            // semantics, so a bare LF in decoded output means newline
            b'\n' | 0x0b | 0x0c => {
                self.pending_wrap = false;
                self.cursor.col = 0;
                self.index();
            }
            0x08 => {
                self.pending_wrap = false;
                self.cursor.col = self.cursor.col.saturating_sub(1);
            }
            b'\t' => self.horizontal_tab(),
            // BEL and NUL are ignored
            _ => {}
        }
    }

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {}

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}

    fn osc_dispatch(&mut self, params: &[&[u8]], _bell_terminated: bool) {
        self.osc_dispatch_impl(params);
    }

    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], ignore: bool, action: char) {
        self.csi_dispatch_impl(params, intermediates, ignore, action);
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], ignore: bool, byte: u8) {
        self.esc_dispatch_impl(intermediates, ignore, byte);
    }
}
