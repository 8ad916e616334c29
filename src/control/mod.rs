//! tmux control-mode wire protocol
//!
//! Control mode (`tmux -CC`) frames everything as LF-terminated lines
//! beginning with `%`. The parser here turns the raw byte stream from the
//! transport into typed [`ControlMessage`] values, keeping any trailing
//! incomplete line buffered across calls.
//!
//! # References
//!
//! - [Tmux Control Mode Wiki](https://github.com/tmux/tmux/wiki/Control-Mode)

pub mod layout;

use crate::error::ClientError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::{debug, trace};

/// Default cap on one unterminated line buffered by the framer (4 MiB)
pub const DEFAULT_MAX_LINE: usize = 4 * 1024 * 1024;

/// A decoded control-mode message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    /// `%output %<pane> <data>` - decoded pane output bytes
    Output { pane_id: String, payload: Vec<u8> },

    /// `%layout-change @<window> <layout> ...` - window geometry changed
    LayoutChange { window_id: String, layout: String },

    /// `%window-add @<window> [name]`
    WindowAdd {
        window_id: String,
        name: Option<String>,
    },

    /// `%window-close @<window>`
    WindowClose { window_id: String },

    /// `%window-renamed @<window> <name>`
    WindowRenamed { window_id: String, name: String },

    /// `%session-changed $<session> <name>` - client attached to a session
    SessionChanged { session_id: String, name: String },

    /// `%session-closed $<session>`
    SessionClosed { session_id: String },

    /// `%pane-mode-changed %<pane> [mode]`
    PaneMode {
        pane_id: String,
        mode: Option<String>,
    },

    /// `%pane-focus-in %<pane>`
    PaneFocusIn { pane_id: String },

    /// `%pane-focus-out %<pane>`
    PaneFocusOut { pane_id: String },

    /// `%pane-set-clipboard %<pane> [base64]`
    PaneSetClipboard {
        pane_id: String,
        payload: Option<Vec<u8>>,
    },

    /// `%exit [reason]` - the control client is ending
    Exit { reason: String },

    /// `%features <raw>` - server feature advertisement
    Features { raw: String },

    /// `%subscription-changed <raw>` - format subscription update
    Subscriptions { raw: String },

    /// Anything unrecognized or malformed, kept verbatim
    Unknown { raw: String },
}

/// Streaming parser for control-mode lines
///
/// Holds the bytes of at most one incomplete line between calls. The parser
/// is driven by a single ingest task per connection and is not shareable.
pub struct ControlParser {
    /// Buffer for the trailing incomplete line
    line_buffer: Vec<u8>,
    /// Cap on the incomplete-line buffer
    max_line: usize,
}

impl ControlParser {
    pub fn new() -> Self {
        Self::with_max_line(DEFAULT_MAX_LINE)
    }

    /// Create a parser with a custom frame cap
    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            line_buffer: Vec::new(),
            max_line,
        }
    }

    /// Bytes currently buffered for an incomplete line
    pub fn buffered(&self) -> usize {
        self.line_buffer.len()
    }

    /// Parse incoming bytes and extract complete messages.
    ///
    /// Returns `OverlongFrame` when an unterminated line outgrows the cap;
    /// the connection owning this parser must then be torn down.
    pub fn parse(&mut self, data: &[u8]) -> Result<Vec<ControlMessage>, ClientError> {
        self.line_buffer.extend_from_slice(data);

        let mut messages = Vec::new();
        while let Some(newline_pos) = self.line_buffer.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.line_buffer.drain(..=newline_pos).collect();

            // Strip the LF, and a CR before it (tmux writes CRLF over a pty)
            let mut end = line_bytes.len() - 1;
            if end > 0 && line_bytes[end - 1] == b'\r' {
                end -= 1;
            }
            let line = String::from_utf8_lossy(&line_bytes[..end]).to_string();

            if let Some(message) = Self::parse_line(&line) {
                messages.push(message);
            }
        }

        if self.line_buffer.len() > self.max_line {
            self.line_buffer.clear();
            return Err(ClientError::OverlongFrame);
        }

        Ok(messages)
    }

    /// Parse a single line into a message.
    ///
    /// Lines not starting with `%` are tmux's dialog with itself (command
    /// block bodies) and are discarded.
    fn parse_line(line: &str) -> Option<ControlMessage> {
        if line.is_empty() {
            return None;
        }
        if !line.starts_with('%') {
            trace!(line, "discarding non-control line");
            return None;
        }

        let rest = &line[1..];
        let (name, args) = match rest.find(' ') {
            Some(idx) => (&rest[..idx], &rest[idx + 1..]),
            None => (rest, ""),
        };

        // Unknown names and malformed argument lists both degrade to
        // Unknown; they never abort the stream
        Some(
            Self::parse_named(name, args).unwrap_or_else(|| ControlMessage::Unknown {
                raw: line.to_string(),
            }),
        )
    }

    fn parse_named(name: &str, args: &str) -> Option<ControlMessage> {
        match name {
            "output" => Self::parse_output(args),
            "extended-output" => Self::parse_extended_output(args),
            "layout-change" => Self::parse_layout_change(args),
            "window-add" => {
                let mut parts = args.splitn(2, ' ');
                let window_id = parts.next().filter(|s| !s.is_empty())?;
                Some(ControlMessage::WindowAdd {
                    window_id: window_id.to_string(),
                    name: parts.next().map(str::to_string),
                })
            }
            "window-close" => Some(ControlMessage::WindowClose {
                window_id: non_empty(args)?.to_string(),
            }),
            "window-renamed" => {
                let (id, name) = split_two(args)?;
                Some(ControlMessage::WindowRenamed {
                    window_id: id.to_string(),
                    name: name.to_string(),
                })
            }
            "session-changed" => {
                let (id, name) = split_two(args)?;
                Some(ControlMessage::SessionChanged {
                    session_id: id.to_string(),
                    name: name.to_string(),
                })
            }
            "session-closed" => Some(ControlMessage::SessionClosed {
                session_id: non_empty(args)?.to_string(),
            }),
            "pane-mode-changed" => {
                let mut parts = args.splitn(2, ' ');
                let pane_id = parts.next().filter(|s| !s.is_empty())?;
                Some(ControlMessage::PaneMode {
                    pane_id: pane_id.to_string(),
                    mode: parts.next().map(str::to_string),
                })
            }
            "pane-focus-in" => Some(ControlMessage::PaneFocusIn {
                pane_id: non_empty(args)?.to_string(),
            }),
            "pane-focus-out" => Some(ControlMessage::PaneFocusOut {
                pane_id: non_empty(args)?.to_string(),
            }),
            "pane-set-clipboard" => Self::parse_set_clipboard(args),
            "exit" => Some(ControlMessage::Exit {
                reason: args.to_string(),
            }),
            "features" => Some(ControlMessage::Features {
                raw: args.to_string(),
            }),
            "subscription-changed" | "subscriptions" => Some(ControlMessage::Subscriptions {
                raw: args.to_string(),
            }),
            _ => None,
        }
    }

    fn parse_output(args: &str) -> Option<ControlMessage> {
        let mut parts = args.splitn(2, ' ');
        let pane_id = parts.next().filter(|s| !s.is_empty())?;
        let payload = parts.next().map(decode_output).unwrap_or_default();
        Some(ControlMessage::Output {
            pane_id: pane_id.to_string(),
            payload,
        })
    }

    /// `%extended-output %<pane> <ms> : <data>` (flow control, tmux 3.2+)
    /// is folded into a plain Output after decoding.
    fn parse_extended_output(args: &str) -> Option<ControlMessage> {
        let mut parts = args.splitn(3, ' ');
        let pane_id = parts.next().filter(|s| !s.is_empty())?;
        let _delay_ms = parts.next()?;
        let data = parts.next()?;
        let data = data.strip_prefix(": ").or_else(|| data.strip_prefix(':')).unwrap_or(data);
        Some(ControlMessage::Output {
            pane_id: pane_id.to_string(),
            payload: decode_output(data),
        })
    }

    /// `%layout-change @<window> <layout> [<visible-layout>] [<flags>]`;
    /// only the first layout descriptor is carried forward.
    fn parse_layout_change(args: &str) -> Option<ControlMessage> {
        let mut parts = args.split(' ');
        let window_id = parts.next().filter(|s| !s.is_empty())?;
        let layout = parts.next()?;
        Some(ControlMessage::LayoutChange {
            window_id: window_id.to_string(),
            layout: layout.to_string(),
        })
    }

    fn parse_set_clipboard(args: &str) -> Option<ControlMessage> {
        let mut parts = args.splitn(2, ' ');
        let pane_id = parts.next().filter(|s| !s.is_empty())?;
        let payload = match parts.next() {
            Some(encoded) if !encoded.is_empty() => match BASE64.decode(encoded) {
                Ok(bytes) => Some(bytes),
                Err(err) => {
                    debug!(%err, "undecodable pane-set-clipboard payload");
                    None
                }
            },
            _ => None,
        };
        Some(ControlMessage::PaneSetClipboard {
            pane_id: pane_id.to_string(),
            payload,
        })
    }
}

impl Default for ControlParser {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim_end();
    (!s.is_empty()).then_some(s)
}

fn split_two(args: &str) -> Option<(&str, &str)> {
    let mut parts = args.splitn(2, ' ');
    let first = parts.next().filter(|s| !s.is_empty())?;
    let second = parts.next()?;
    Some((first, second))
}

/// Decode a `%output` payload back to raw bytes.
///
/// tmux escapes control bytes as `\NNN` (1-3 octal digits, consumed
/// greedily) and backslash as `\\`. Any other `\x` pair is taken literally;
/// a bare trailing backslash decodes to a literal backslash.
pub fn decode_output(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        if i + 1 >= bytes.len() {
            out.push(b'\\');
            break;
        }
        let next = bytes[i + 1];
        if next == b'\\' {
            out.push(b'\\');
            i += 2;
        } else if (b'0'..=b'7').contains(&next) {
            let mut value: u32 = 0;
            let mut digits = 0;
            while digits < 3
                && i + 1 + digits < bytes.len()
                && (b'0'..=b'7').contains(&bytes[i + 1 + digits])
            {
                value = value * 8 + u32::from(bytes[i + 1 + digits] - b'0');
                digits += 1;
            }
            out.push(value as u8);
            i += 1 + digits;
        } else {
            out.push(b'\\');
            out.push(next);
            i += 2;
        }
    }

    out
}

/// Encode raw bytes the way tmux escapes `%output` payloads.
///
/// Inverse of [`decode_output`]; used for synthetic input and tests.
pub fn escape_output(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len());
    for &b in data {
        match b {
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\{b:03o}")),
        }
    }
    out
}
