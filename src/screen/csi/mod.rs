//! CSI (Control Sequence Introducer) sequence handling dispatcher

mod cursor;
mod edit;
mod erase;
mod mode;
mod scroll;
mod style;

use crate::screen::Screen;
use tracing::trace;
use vte::Params;

impl Screen {
    /// VTE CSI dispatch - route a final byte to its handler
    pub(in crate::screen) fn csi_dispatch_impl(
        &mut self,
        params: &Params,
        intermediates: &[u8],
        _ignore: bool,
        action: char,
    ) {
        match action {
            'A' | 'B' | 'C' | 'D' | 'E' | 'F' | 'G' | 'H' | 'f' | 'd' => {
                self.handle_csi_cursor(action, params);
            }
            'J' | 'K' | 'X' => {
                self.handle_csi_erase(action, params);
            }
            'L' | 'M' | '@' | 'P' => {
                self.handle_csi_edit(action, params);
            }
            'S' | 'T' | 'r' => {
                self.handle_csi_scroll(action, params);
            }
            'm' => {
                self.handle_csi_style(params, intermediates);
            }
            'h' | 'l' => {
                self.handle_csi_mode(action, params, intermediates);
            }
            's' => self.save_cursor(),
            'u' => self.restore_cursor(),
            'g' => {
                // TBC - Tabulation Clear
                match param(params, 0, 0) {
                    0 => self.clear_tab_stop(),
                    3 => self.clear_all_tab_stops(),
                    _ => {}
                }
            }
            // Device attributes / status reports: absorbed, no response
            'c' | 'n' => {}
            _ => {
                trace!(action = %action, "unsupported CSI action");
            }
        }
    }
}

/// First value of the idx-th parameter, or the default when absent
pub(in crate::screen) fn param(params: &Params, idx: usize, default: u16) -> u16 {
    params
        .iter()
        .nth(idx)
        .and_then(|p| p.first())
        .copied()
        .unwrap_or(default)
}

/// Like `param` with default 1, treating an explicit 0 as 1
pub(in crate::screen) fn param_nonzero(params: &Params, idx: usize) -> usize {
    match param(params, idx, 1) {
        0 => 1,
        n => n as usize,
    }
}
