//! Outbound tmux command serialization
//!
//! Commands are written to the control channel as plain text lines. The
//! connection manager appends the terminating newline; this module only
//! renders the command body, including the quoting rules for payloads.

/// Scope for `set-option`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionScope {
    Global,
    Window,
}

/// A typed outbound tmux command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TmuxCommand {
    ListSessions,
    ListWindows,
    ListPanes,
    NewWindow {
        name: Option<String>,
    },
    SelectWindow {
        window_id: String,
    },
    SelectPane {
        pane_id: String,
    },
    SplitWindow {
        pane_id: String,
        horizontal: bool,
    },
    ResizePane {
        pane_id: String,
        width: usize,
        height: usize,
    },
    /// `literal` sends the payload as-is (`-l`); otherwise tmux interprets
    /// key names like `Enter` and `C-c`
    SendKeys {
        pane_id: String,
        keys: String,
        literal: bool,
    },
    KillPane {
        pane_id: String,
    },
    KillWindow {
        window_id: String,
    },
    KillSession {
        session_id: String,
    },
    DetachClient,
    RefreshClient {
        size: Option<(usize, usize)>,
    },
    SetOption {
        scope: OptionScope,
        name: String,
        value: String,
    },
}

impl TmuxCommand {
    /// Render the wire form of the command, without the trailing newline
    pub fn serialize(&self) -> String {
        match self {
            TmuxCommand::ListSessions => "list-sessions".to_string(),
            TmuxCommand::ListWindows => "list-windows".to_string(),
            TmuxCommand::ListPanes => "list-panes".to_string(),
            TmuxCommand::NewWindow { name } => match name {
                Some(name) => format!("new-window -n {}", quote_single(name)),
                None => "new-window".to_string(),
            },
            TmuxCommand::SelectWindow { window_id } => {
                format!("select-window -t {window_id}")
            }
            TmuxCommand::SelectPane { pane_id } => format!("select-pane -t {pane_id}"),
            TmuxCommand::SplitWindow { pane_id, horizontal } => {
                let flag = if *horizontal { "-h" } else { "-v" };
                format!("split-window {flag} -t {pane_id}")
            }
            TmuxCommand::ResizePane {
                pane_id,
                width,
                height,
            } => format!("resize-pane -t {pane_id} -x {width} -y {height}"),
            TmuxCommand::SendKeys {
                pane_id,
                keys,
                literal,
            } => {
                if *literal {
                    format!("send-keys -t {pane_id} -l {}", quote_single(keys))
                } else {
                    format!("send-keys -t {pane_id} {}", quote_single(keys))
                }
            }
            TmuxCommand::KillPane { pane_id } => format!("kill-pane -t {pane_id}"),
            TmuxCommand::KillWindow { window_id } => format!("kill-window -t {window_id}"),
            TmuxCommand::KillSession { session_id } => {
                format!("kill-session -t {session_id}")
            }
            TmuxCommand::DetachClient => "detach-client".to_string(),
            TmuxCommand::RefreshClient { size } => match size {
                Some((width, height)) => format!("refresh-client -C {width}x{height}"),
                None => "refresh-client".to_string(),
            },
            TmuxCommand::SetOption { scope, name, value } => {
                let flag = match scope {
                    OptionScope::Global => "-g",
                    OptionScope::Window => "-w",
                };
                format!(
                    "set-option {flag} {} {}",
                    quote_single(name),
                    quote_single(value)
                )
            }
        }
    }
}

/// Single-quote a payload for the tmux command line, escaping embedded
/// single quotes as `'\''`
fn quote_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}
