//! OSC (Operating System Command) sequence handling
//!
//! Recognized commands: 0/1/2 set the pane title, 7 reports the working
//! directory as a file:// URL. Everything else is discarded.

use crate::screen::Screen;
use percent_encoding::percent_decode_str;
use url::Url;

impl Screen {
    pub(in crate::screen) fn osc_dispatch_impl(&mut self, params: &[&[u8]]) {
        let Some(code) = params.first() else {
            return;
        };
        let code = String::from_utf8_lossy(code);

        match code.as_ref() {
            "0" | "1" | "2" => {
                if let Some(text) = params.get(1) {
                    self.title = String::from_utf8_lossy(text).to_string();
                }
            }
            "7" => {
                if let Some(raw) = params.get(1) {
                    let raw = String::from_utf8_lossy(raw);
                    self.set_working_directory(&raw);
                }
            }
            _ => {}
        }
    }

    /// OSC 7 payload is a file:// URL; the path is percent-decoded
    fn set_working_directory(&mut self, raw: &str) {
        let Ok(parsed) = Url::parse(raw) else {
            return;
        };
        if parsed.scheme() != "file" {
            return;
        }
        let path = percent_decode_str(parsed.path())
            .decode_utf8_lossy()
            .to_string();
        if !path.is_empty() {
            self.working_directory = Some(path);
        }
    }
}
