//! Read-only views handed to the presentation layer
//!
//! Snapshots are owned values cloned out of the core under its lock; nothing
//! handed to a consumer can mutate underneath it. Consumers hold a
//! `tokio::sync::watch` receiver and re-read snapshots when the generation
//! counter moves.

use crate::cell::Cell;
use serde::{Deserialize, Serialize};

/// Cursor location within a pane snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub row: usize,
    pub col: usize,
}

/// One pane's renderable state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneSnapshot {
    pub id: String,
    pub window_id: String,
    pub rows: usize,
    pub cols: usize,
    pub is_active: bool,
    pub working_directory: Option<String>,
    pub title: String,
    /// The visible cell grid, row-major
    pub grid: Vec<Vec<Cell>>,
    pub cursor: CursorPosition,
}

/// Lifecycle phase of one host's connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionPhase {
    Idle,
    Connecting,
    Authenticating,
    StartingTmux,
    Connected,
    Failed,
    Closed,
}

/// Observable state of one host's connection record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSnapshot {
    pub phase: ConnectionPhase,
    /// Latest error, kept distinct from the phase
    pub last_error: Option<String>,
    /// Name of the attached tmux session, once known
    pub session_name: Option<String>,
    pub window_count: usize,
    pub pane_count: usize,
    /// Millisecond timestamp of the first successful connect
    pub connected_at: Option<u64>,
}
