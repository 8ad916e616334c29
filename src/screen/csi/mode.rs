//! Mode CSI sequence handling (SM/RM, DECSET/DECRST)

use crate::screen::Screen;
use tracing::trace;
use vte::Params;

impl Screen {
    pub(in crate::screen) fn handle_csi_mode(
        &mut self,
        action: char,
        params: &Params,
        intermediates: &[u8],
    ) {
        let private = intermediates.contains(&b'?');
        if !private {
            // ANSI modes (IRM and friends) are not emulated
            return;
        }
        let set = action == 'h';

        for param_slice in params {
            let param = param_slice.first().copied().unwrap_or(0);
            match param {
                7 => self.auto_wrap = set,
                25 => self.cursor.visible = set,
                1049 => {
                    if set {
                        self.enter_alt_screen();
                    } else {
                        self.leave_alt_screen();
                    }
                }
                2004 => self.bracketed_paste = set,
                _ => {
                    trace!(mode = param, set, "unsupported private mode");
                }
            }
        }
    }
}
