//! Client core for driving a remote tmux in control mode
//!
//! This library sits between an SSH transport and a renderer, turning the
//! framed control-mode byte stream of a remote `tmux -CC` into the state of
//! a set of virtual terminal screens. It provides:
//!
//! - **Control-mode parsing**: LF-framed `%`-prefixed lines become typed
//!   [`control::ControlMessage`] values, with octal-escaped `%output`
//!   payloads decoded back to raw bytes and layout descriptors expanded
//!   into pane geometry.
//! - **A VT-style emulator per pane**: [`screen::Screen`] maintains a grid
//!   of styled cells, cursor, scroll region, tab stops and primary/alternate
//!   buffers, resuming escape sequences across arbitrarily chunked input.
//! - **A connection manager**: [`manager::ConnectionManager`] owns host
//!   profiles, one connection record per host, and one ingest task per
//!   connection that routes parsed messages into the session/window/pane
//!   registry.
//! - **Snapshots**: immutable copies of connection and pane state plus a
//!   level-triggered change signal for the presentation layer.
//!
//! The SSH transport, clipboard integration and persistent storage are
//! consumed through traits ([`transport::SshTransport`],
//! [`manager::ClipboardSink`], [`profile::BlobStore`]); this crate
//! implements none of them.

pub mod cell;
pub mod color;
pub mod command;
pub mod control;
pub mod cursor;
pub mod error;
pub mod grid;
pub mod manager;
pub mod profile;
pub mod registry;
pub mod screen;
pub mod snapshot;
pub mod transport;

pub use cell::{Cell, CellFlags};
pub use color::{Color, NamedColor};
pub use command::{OptionScope, TmuxCommand};
pub use control::{ControlMessage, ControlParser};
pub use error::ClientError;
pub use manager::{ClipboardSink, ConnectionManager, Credential};
pub use profile::{AuthPreference, BlobStore, CredentialKey, HostProfile, MemoryBlobStore};
pub use screen::{Screen, ScreenUpdate};
pub use snapshot::{ConnectionPhase, ConnectionSnapshot, CursorPosition, PaneSnapshot};
