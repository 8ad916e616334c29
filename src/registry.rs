//! In-memory model of the remote multiplexer state
//!
//! One registry per connection, owned exclusively by that connection's
//! ingest task. Sessions, windows and panes reference each other by string
//! id only; the registry holds all ownership, so closure cascades are plain
//! map removals. Violating inputs are logged and ignored, never thrown.

use crate::control::layout::PaneBox;
use crate::screen::Screen;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Default pane size until a layout supplies real geometry
const DEFAULT_ROWS: usize = 24;
const DEFAULT_COLS: usize = 80;

/// A tmux session (e.g. `$1`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub name: String,
    /// Window ids in creation order
    pub window_ids: Vec<String>,
    pub active_window: Option<String>,
}

/// A tmux window (e.g. `@3`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Window {
    pub id: String,
    pub name: String,
    /// Parent session; None until a session adopts the window
    pub session_id: Option<String>,
    /// Last layout descriptor applied
    pub layout: String,
    /// Pane ids in layout order
    pub pane_ids: Vec<String>,
    pub active_pane: Option<String>,
    /// Overall size in cells, from the layout bounding box
    pub width: usize,
    pub height: usize,
}

/// A tmux pane (e.g. `%7`) and its owned screen
#[derive(Debug)]
pub struct Pane {
    pub id: String,
    /// Owning window; empty while provisional (output seen before layout)
    pub window_id: String,
    pub active: bool,
    pub screen: Screen,
}

impl Pane {
    pub fn rows(&self) -> usize {
        self.screen.rows()
    }

    pub fn cols(&self) -> usize {
        self.screen.cols()
    }

    pub fn title(&self) -> &str {
        self.screen.title()
    }

    pub fn working_directory(&self) -> Option<&str> {
        self.screen.working_directory()
    }
}

/// The typed store of sessions, windows and panes for one connection
#[derive(Debug, Default)]
pub struct Registry {
    current_session: Option<String>,
    sessions: HashMap<String, Session>,
    windows: HashMap<String, Window>,
    panes: HashMap<String, Pane>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the attached session, adopting any unparented windows
    pub fn set_session(&mut self, id: &str, name: &str) {
        let session = self.sessions.entry(id.to_string()).or_default();
        session.id = id.to_string();
        session.name = name.to_string();
        self.current_session = Some(id.to_string());

        let mut adopted = Vec::new();
        for window in self.windows.values_mut() {
            if window.session_id.is_none() {
                window.session_id = Some(id.to_string());
                adopted.push(window.id.clone());
            }
        }
        if let Some(session) = self.sessions.get_mut(id) {
            for window_id in adopted {
                if !session.window_ids.contains(&window_id) {
                    session.window_ids.push(window_id);
                }
            }
        }
    }

    /// Close a session and cascade to its windows and panes
    pub fn close_session(&mut self, id: &str) {
        let Some(session) = self.sessions.remove(id) else {
            warn!(session = id, "close for unknown session ignored");
            return;
        };
        for window_id in session.window_ids {
            self.close_window_inner(&window_id);
        }
        if self.current_session.as_deref() == Some(id) {
            self.current_session = None;
        }
    }

    /// Add a window, linking it into the current session
    pub fn add_window(&mut self, id: &str, name: Option<&str>) {
        let session_id = self.current_session.clone();
        let window = self.windows.entry(id.to_string()).or_default();
        window.id = id.to_string();
        if let Some(name) = name {
            window.name = name.to_string();
        }
        if window.session_id.is_none() {
            window.session_id = session_id.clone();
        }

        if let Some(session_id) = session_id {
            if let Some(session) = self.sessions.get_mut(&session_id) {
                if !session.window_ids.contains(&id.to_string()) {
                    session.window_ids.push(id.to_string());
                }
                if session.active_window.is_none() {
                    session.active_window = Some(id.to_string());
                }
            }
        }
    }

    pub fn rename_window(&mut self, id: &str, name: &str) {
        match self.windows.get_mut(id) {
            Some(window) => window.name = name.to_string(),
            None => warn!(window = id, "rename for unknown window ignored"),
        }
    }

    /// Close a window and cascade to its panes
    pub fn close_window(&mut self, id: &str) {
        if !self.windows.contains_key(id) {
            warn!(window = id, "close for unknown window ignored");
            return;
        }
        self.close_window_inner(id);
    }

    fn close_window_inner(&mut self, id: &str) {
        if let Some(window) = self.windows.remove(id) {
            self.panes.retain(|_, pane| pane.window_id != window.id);
            if let Some(session_id) = window.session_id {
                if let Some(session) = self.sessions.get_mut(&session_id) {
                    session.window_ids.retain(|w| w != id);
                    if session.active_window.as_deref() == Some(id) {
                        session.active_window = None;
                    }
                }
            }
        }
    }

    /// Apply parsed layout boxes to a window: create missing panes, resize
    /// the survivors, drop panes the layout no longer mentions.
    ///
    /// A layout for a window not yet announced creates the window record;
    /// `%layout-change` routinely precedes `%window-add` on attach.
    pub fn apply_layout(&mut self, window_id: &str, layout: &str, boxes: &[PaneBox]) {
        if !self.windows.contains_key(window_id) {
            debug!(window = window_id, "layout for unknown window; creating");
            self.add_window(window_id, None);
        }

        let mut kept_ids = Vec::with_capacity(boxes.len());
        for pane_box in boxes {
            let stored_id = match self.resolve_pane_id(&pane_box.pane_id) {
                Some(existing) => existing,
                None => {
                    self.panes.insert(
                        pane_box.pane_id.clone(),
                        Pane {
                            id: pane_box.pane_id.clone(),
                            window_id: window_id.to_string(),
                            active: false,
                            screen: Screen::new(pane_box.height, pane_box.width),
                        },
                    );
                    pane_box.pane_id.clone()
                }
            };

            if let Some(pane) = self.panes.get_mut(&stored_id) {
                pane.window_id = window_id.to_string();
                if pane.screen.rows() != pane_box.height || pane.screen.cols() != pane_box.width {
                    pane.screen.resize(pane_box.height, pane_box.width);
                }
            }
            kept_ids.push(stored_id);
        }

        // Drop panes of this window that vanished from the layout
        self.panes.retain(|id, pane| {
            pane.window_id != window_id || kept_ids.iter().any(|k| k == id)
        });

        let width = boxes.iter().map(|b| b.x + b.width).max().unwrap_or(0);
        let height = boxes.iter().map(|b| b.y + b.height).max().unwrap_or(0);
        if let Some(window) = self.windows.get_mut(window_id) {
            window.layout = layout.to_string();
            window.pane_ids = kept_ids.clone();
            window.width = width;
            window.height = height;
            if let Some(active) = window.active_pane.clone() {
                if !kept_ids.contains(&active) {
                    window.active_pane = None;
                }
            }
        }
    }

    /// Mark one pane active within its window, clearing the others atomically
    pub fn set_active_pane(&mut self, window_id: &str, pane_id: &str) {
        let Some(stored_id) = self.resolve_pane_id(pane_id) else {
            warn!(window = window_id, pane = pane_id, "focus for unknown pane ignored");
            return;
        };
        if !self.windows.contains_key(window_id) {
            warn!(window = window_id, "focus for unknown window ignored");
            return;
        }

        for pane in self.panes.values_mut() {
            if pane.window_id == window_id {
                pane.active = pane.id == stored_id;
            }
        }
        if let Some(window) = self.windows.get_mut(window_id) {
            window.active_pane = Some(stored_id);
        }
    }

    /// Focus change by pane id alone, as delivered by the wire
    pub fn focus_pane(&mut self, pane_id: &str, focused: bool) {
        let Some(stored_id) = self.resolve_pane_id(pane_id) else {
            warn!(pane = pane_id, "focus for unknown pane ignored");
            return;
        };
        let window_id = self.panes[&stored_id].window_id.clone();

        if focused {
            if window_id.is_empty() {
                // Provisional pane: flag it alone
                if let Some(pane) = self.panes.get_mut(&stored_id) {
                    pane.active = true;
                }
            } else {
                self.set_active_pane(&window_id, &stored_id);
            }
        } else {
            if let Some(pane) = self.panes.get_mut(&stored_id) {
                pane.active = false;
            }
            if let Some(window) = self.windows.get_mut(&window_id) {
                if window.active_pane.as_deref() == Some(stored_id.as_str()) {
                    window.active_pane = None;
                }
            }
        }
    }

    /// Locate a pane for incoming output, creating a provisional one when
    /// the layout has not arrived yet
    pub fn ensure_pane(&mut self, pane_id: &str) -> &mut Pane {
        let stored_id = match self.resolve_pane_id(pane_id) {
            Some(id) => id,
            None => {
                let window_id = self
                    .current_session
                    .as_ref()
                    .and_then(|s| self.sessions.get(s))
                    .and_then(|s| s.active_window.clone())
                    .unwrap_or_default();
                self.panes.insert(
                    pane_id.to_string(),
                    Pane {
                        id: pane_id.to_string(),
                        window_id,
                        active: false,
                        screen: Screen::new(DEFAULT_ROWS, DEFAULT_COLS),
                    },
                );
                pane_id.to_string()
            }
        };
        self.panes.get_mut(&stored_id).expect("pane just resolved")
    }

    /// Resolve a pane id tolerating the `%` sigil mismatch between wire
    /// output ids (`%1`) and layout ids (`1`)
    pub fn resolve_pane_id(&self, pane_id: &str) -> Option<String> {
        if self.panes.contains_key(pane_id) {
            return Some(pane_id.to_string());
        }
        let alternate = match pane_id.strip_prefix('%') {
            Some(bare) => bare.to_string(),
            None => format!("%{pane_id}"),
        };
        self.panes.contains_key(&alternate).then_some(alternate)
    }

    pub fn pane(&self, pane_id: &str) -> Option<&Pane> {
        let stored_id = self.resolve_pane_id(pane_id)?;
        self.panes.get(&stored_id)
    }

    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn window(&self, id: &str) -> Option<&Window> {
        self.windows.get(id)
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.current_session
            .as_ref()
            .and_then(|id| self.sessions.get(id))
    }

    pub fn panes_iter(&self) -> impl Iterator<Item = &Pane> {
        self.panes.values()
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn pane_count(&self) -> usize {
        self.panes.len()
    }
}
