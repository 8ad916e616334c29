//! Scroll CSI sequence handling (SU, SD, DECSTBM)

use crate::screen::csi::{param, param_nonzero};
use crate::screen::Screen;
use vte::Params;

impl Screen {
    pub(in crate::screen) fn handle_csi_scroll(&mut self, action: char, params: &Params) {
        match action {
            'S' => {
                // Scroll up (SU)
                let n = param_nonzero(params, 0);
                self.scroll_up(n);
            }
            'T' => {
                // Scroll down (SD)
                let n = param_nonzero(params, 0);
                self.scroll_down(n);
            }
            'r' => {
                // Set scroll region (DECSTBM); defaults cover the full screen
                let rows = self.rows();
                let top = param(params, 0, 1) as usize;
                let bottom = param(params, 1, rows as u16) as usize;
                self.set_scroll_region(top.saturating_sub(1), bottom.saturating_sub(1));
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::screen::Screen;

    #[test]
    fn test_scroll_up_and_down() {
        let mut screen = Screen::new(3, 3);
        screen.process(b"aaa\r\nbbb\r\nccc");

        screen.process(b"\x1b[1S");
        assert_eq!(screen.row_text(0), "bbb");
        assert_eq!(screen.row_text(2), "   ");

        screen.process(b"\x1b[1T");
        assert_eq!(screen.row_text(0), "   ");
        assert_eq!(screen.row_text(1), "bbb");
    }

    #[test]
    fn test_set_scroll_region_homes_cursor() {
        let mut screen = Screen::new(10, 10);
        screen.process(b"\x1b[5;5H\x1b[3;7r");
        assert_eq!(screen.scroll_region(), (2, 6));
        assert_eq!((screen.cursor().row, screen.cursor().col), (0, 0));
    }

    #[test]
    fn test_default_region_is_full_screen() {
        let mut screen = Screen::new(10, 10);
        screen.process(b"\x1b[3;7r\x1b[r");
        assert_eq!(screen.scroll_region(), (0, 9));
    }

    #[test]
    fn test_invalid_region_ignored() {
        let mut screen = Screen::new(10, 10);
        screen.process(b"\x1b[7;3r");
        assert_eq!(screen.scroll_region(), (0, 9));
        screen.process(b"\x1b[5;99r");
        assert_eq!(screen.scroll_region(), (0, 9));
    }

    #[test]
    fn test_scroll_respects_region() {
        let mut screen = Screen::new(5, 3);
        screen.process(b"aaa\r\nbbb\r\nccc\r\nddd\r\neee");
        screen.process(b"\x1b[2;4r\x1b[2S");
        // Rows outside [1, 3] untouched
        assert_eq!(screen.row_text(0), "aaa");
        assert_eq!(screen.row_text(4), "eee");
        assert_eq!(screen.row_text(1), "ddd");
        assert_eq!(screen.row_text(2), "   ");
        assert_eq!(screen.row_text(3), "   ");
    }
}
