//! Per-pane terminal screen emulator
//!
//! Each remote pane owns one `Screen`. Bytes decoded from `%output` frames
//! are fed to `process()`, which drives a persistent `vte::Parser` so escape
//! sequences split across network packets resume correctly. The screen keeps
//! a primary grid and, while private mode 1049 is set, an alternate grid.
//!
//! The emulator never fails: malformed sequences are absorbed, leaving the
//! screen unchanged beyond any characters already committed.

mod csi;
mod esc;
mod osc;
mod perform;

use crate::cell::{Cell, CellFlags};
use crate::color::Color;
use crate::cursor::Cursor;
use crate::grid::Grid;
use std::collections::HashSet;
use std::fmt;

/// Result of feeding bytes to a screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenUpdate {
    /// Rows whose content changed, sorted and distinct
    pub changed_rows: Vec<usize>,
    /// Whether the cursor ended somewhere else than it started
    pub cursor_moved: bool,
    /// Whether the whole screen must be repainted (buffer swap, full reset)
    pub full_redraw: bool,
}

/// Saved cursor slot (DECSC / CSI s): position plus the active style
#[derive(Debug, Clone, Copy)]
struct SavedCursor {
    cursor: Cursor,
    fg: Color,
    bg: Color,
    flags: CellFlags,
}

/// The emulator state for one pane
pub struct Screen {
    /// The primary grid
    grid: Grid,
    /// Alternate grid, present only while mode 1049 is set
    alt_grid: Option<Grid>,
    /// Cursor position and visibility
    cursor: Cursor,
    /// Saved cursor slot shared by ESC 7/8 and CSI s/u
    saved_cursor: Option<SavedCursor>,
    /// Current foreground color
    fg: Color,
    /// Current background color
    bg: Color,
    /// Current attribute flags
    flags: CellFlags,
    /// Scroll region top row (0-indexed, inclusive)
    scroll_top: usize,
    /// Scroll region bottom row (0-indexed, inclusive)
    scroll_bottom: usize,
    /// Columns with a tab stop set
    tab_stops: Vec<bool>,
    /// DECAWM delayed wrap: set after printing in the last column
    pending_wrap: bool,
    /// Auto wrap mode (DECAWM, mode 7)
    auto_wrap: bool,
    /// Bracketed paste mode (mode 2004)
    bracketed_paste: bool,
    /// Pane title from OSC 0/1/2
    title: String,
    /// Working directory hint from OSC 7
    working_directory: Option<String>,
    /// VTE parser, persistent so sequences resume across process() calls
    parser: vte::Parser,
    /// Rows touched since the last process() call returned
    dirty_rows: HashSet<usize>,
    /// Pending full-redraw flag
    full_redraw: bool,
}

impl Screen {
    /// Create a new screen of the given size
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            grid: Grid::new(cols, rows),
            alt_grid: None,
            cursor: Cursor::new(),
            saved_cursor: None,
            fg: Color::Default,
            bg: Color::Default,
            flags: CellFlags::default(),
            scroll_top: 0,
            scroll_bottom: rows - 1,
            tab_stops: default_tab_stops(cols),
            pending_wrap: false,
            auto_wrap: true,
            bracketed_paste: false,
            title: String::new(),
            working_directory: None,
            parser: vte::Parser::new(),
            dirty_rows: HashSet::new(),
            full_redraw: false,
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    /// Feed a chunk of output bytes and report what changed
    pub fn process(&mut self, data: &[u8]) -> ScreenUpdate {
        let cursor_before = self.cursor;

        // Take the parser to sidestep the double borrow during advance
        let mut parser = std::mem::replace(&mut self.parser, vte::Parser::new());
        parser.advance(self, data);
        self.parser = parser;

        let mut changed_rows: Vec<usize> = self.dirty_rows.drain().collect();
        changed_rows.sort_unstable();

        ScreenUpdate {
            changed_rows,
            cursor_moved: self.cursor != cursor_before,
            full_redraw: std::mem::take(&mut self.full_redraw),
        }
    }

    /// Resize the screen, preserving overlapping content from the top-left
    pub fn resize(&mut self, rows: usize, cols: usize) {
        let rows = rows.max(1);
        let cols = cols.max(1);
        if rows == self.rows() && cols == self.cols() {
            return;
        }

        self.grid.resize(cols, rows);
        if self.alt_grid.is_some() {
            self.alt_grid = Some(Grid::new(cols, rows));
        }

        self.tab_stops.resize(cols, false);
        for i in (0..cols).step_by(8) {
            self.tab_stops[i] = true;
        }

        self.scroll_top = 0;
        self.scroll_bottom = rows - 1;
        self.cursor.col = self.cursor.col.min(cols - 1);
        self.cursor.row = self.cursor.row.min(rows - 1);
        self.pending_wrap = false;
        self.mark_all_dirty();
    }

    /// Pane title from OSC 0/1/2
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Working directory hint from OSC 7, if one was reported
    pub fn working_directory(&self) -> Option<&str> {
        self.working_directory.as_deref()
    }

    /// Current cursor
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Whether the alternate screen is active
    pub fn is_alt_screen_active(&self) -> bool {
        self.alt_grid.is_some()
    }

    /// Whether the delayed-wrap latch is set
    pub fn pending_wrap(&self) -> bool {
        self.pending_wrap
    }

    /// Whether bracketed paste mode is on
    pub fn bracketed_paste(&self) -> bool {
        self.bracketed_paste
    }

    /// Current scroll region as (top, bottom), inclusive
    pub fn scroll_region(&self) -> (usize, usize) {
        (self.scroll_top, self.scroll_bottom)
    }

    /// Cell of the active grid at (col, row)
    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        self.active_grid().get(col, row)
    }

    /// Text of one row of the active grid
    pub fn row_text(&self, row: usize) -> String {
        self.active_grid().row_text(row)
    }

    /// Visible text of the active grid, trailing blanks trimmed per row
    pub fn content(&self) -> String {
        self.active_grid().content_as_string()
    }

    /// Clone out every visible row, for snapshot construction
    pub fn visible_rows(&self) -> Vec<Vec<Cell>> {
        self.active_grid().rows_cloned()
    }

    /// Primary grid contents regardless of the active buffer
    pub fn primary_rows(&self) -> Vec<Vec<Cell>> {
        self.grid.rows_cloned()
    }

    pub(crate) fn active_grid(&self) -> &Grid {
        self.alt_grid.as_ref().unwrap_or(&self.grid)
    }

    pub(crate) fn active_grid_mut(&mut self) -> &mut Grid {
        self.alt_grid.as_mut().unwrap_or(&mut self.grid)
    }

    pub(crate) fn mark_dirty(&mut self, row: usize) {
        if row < self.rows() {
            self.dirty_rows.insert(row);
        }
    }

    pub(crate) fn mark_rows_dirty(&mut self, top: usize, bottom: usize) {
        for row in top..=bottom.min(self.rows().saturating_sub(1)) {
            self.dirty_rows.insert(row);
        }
    }

    pub(crate) fn mark_all_dirty(&mut self) {
        let rows = self.rows();
        self.dirty_rows.extend(0..rows);
    }

    /// Write one printable character at the cursor with the current style
    pub(crate) fn write_printable(&mut self, c: char) {
        if self.pending_wrap {
            self.pending_wrap = false;
            self.cursor.col = 0;
            self.index();
        }

        let col = self.cursor.col;
        let row = self.cursor.row;
        let cols = self.cols();
        let cell = Cell::styled(c, self.fg, self.bg, self.flags);
        self.active_grid_mut().set(col, row, cell);
        self.mark_dirty(row);

        if col + 1 >= cols {
            if self.auto_wrap {
                self.pending_wrap = true;
            }
        } else {
            self.cursor.col += 1;
        }
    }

    /// Index: advance one row, scrolling the region when at its bottom
    pub(crate) fn index(&mut self) {
        if self.cursor.row == self.scroll_bottom {
            self.scroll_up(1);
        } else if self.cursor.row + 1 < self.rows() {
            self.cursor.row += 1;
        }
    }

    /// Reverse index: retreat one row, scrolling the region when at its top
    pub(crate) fn reverse_index(&mut self) {
        if self.cursor.row == self.scroll_top {
            self.scroll_down(1);
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
        }
    }

    /// Scroll the region up by n, clearing exposed rows
    pub(crate) fn scroll_up(&mut self, n: usize) {
        let (top, bottom) = (self.scroll_top, self.scroll_bottom);
        self.active_grid_mut().scroll_region_up(n, top, bottom);
        self.mark_rows_dirty(top, bottom);
    }

    /// Scroll the region down by n, clearing exposed rows
    pub(crate) fn scroll_down(&mut self, n: usize) {
        let (top, bottom) = (self.scroll_top, self.scroll_bottom);
        self.active_grid_mut().scroll_region_down(n, top, bottom);
        self.mark_rows_dirty(top, bottom);
    }

    /// Jump to the next tab stop, or the last column when none remains
    pub(crate) fn horizontal_tab(&mut self) {
        self.pending_wrap = false;
        let cols = self.cols();
        let mut col = self.cursor.col + 1;
        while col < cols && !self.tab_stops[col] {
            col += 1;
        }
        self.cursor.col = col.min(cols - 1);
    }

    pub(crate) fn set_tab_stop(&mut self) {
        if let Some(stop) = self.tab_stops.get_mut(self.cursor.col) {
            *stop = true;
        }
    }

    pub(crate) fn clear_tab_stop(&mut self) {
        if let Some(stop) = self.tab_stops.get_mut(self.cursor.col) {
            *stop = false;
        }
    }

    pub(crate) fn clear_all_tab_stops(&mut self) {
        self.tab_stops.fill(false);
    }

    /// Save the cursor and the active style (DECSC)
    pub(crate) fn save_cursor(&mut self) {
        self.saved_cursor = Some(SavedCursor {
            cursor: self.cursor,
            fg: self.fg,
            bg: self.bg,
            flags: self.flags,
        });
    }

    /// Restore the saved cursor and style; no-op without a prior save (DECRC)
    pub(crate) fn restore_cursor(&mut self) {
        if let Some(saved) = self.saved_cursor {
            self.cursor = saved.cursor;
            self.cursor.col = self.cursor.col.min(self.cols() - 1);
            self.cursor.row = self.cursor.row.min(self.rows() - 1);
            self.fg = saved.fg;
            self.bg = saved.bg;
            self.flags = saved.flags;
            self.pending_wrap = false;
        }
    }

    /// Set the scroll region (DECSTBM); invalid bounds are ignored
    pub(crate) fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        if top < bottom && bottom < self.rows() {
            self.scroll_top = top;
            self.scroll_bottom = bottom;
            self.cursor.goto(0, 0);
            self.pending_wrap = false;
        }
    }

    /// Enter the alternate screen (mode 1049 set): fresh cleared grid,
    /// cursor preserved across the swap
    pub(crate) fn enter_alt_screen(&mut self) {
        if self.alt_grid.is_none() {
            self.alt_grid = Some(Grid::new(self.cols(), self.rows()));
            self.pending_wrap = false;
            self.full_redraw = true;
            self.mark_all_dirty();
        }
    }

    /// Leave the alternate screen (mode 1049 reset): the alternate grid is
    /// dropped and the primary grid is revealed unchanged
    pub(crate) fn leave_alt_screen(&mut self) {
        if self.alt_grid.take().is_some() {
            self.pending_wrap = false;
            self.full_redraw = true;
            self.mark_all_dirty();
        }
    }

    /// Full device reset (RIS)
    pub(crate) fn reset(&mut self) {
        let rows = self.rows();
        let cols = self.cols();
        self.grid.clear();
        self.alt_grid = None;
        self.cursor = Cursor::new();
        self.saved_cursor = None;
        self.fg = Color::Default;
        self.bg = Color::Default;
        self.flags = CellFlags::default();
        self.scroll_top = 0;
        self.scroll_bottom = rows - 1;
        self.tab_stops = default_tab_stops(cols);
        self.pending_wrap = false;
        self.auto_wrap = true;
        self.bracketed_paste = false;
        self.full_redraw = true;
        self.mark_all_dirty();
    }
}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Screen")
            .field("rows", &self.rows())
            .field("cols", &self.cols())
            .field("cursor", &self.cursor)
            .field("alt_screen", &self.alt_grid.is_some())
            .field("scroll_region", &(self.scroll_top, self.scroll_bottom))
            .finish_non_exhaustive()
    }
}

fn default_tab_stops(cols: usize) -> Vec<bool> {
    let mut stops = vec![false; cols];
    for i in (0..cols).step_by(8) {
        stops[i] = true;
    }
    stops
}

#[cfg(test)]
mod tests;
