//! Cursor position and movement helpers

/// Cursor state for one screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Column (0-indexed)
    pub col: usize,
    /// Row (0-indexed)
    pub row: usize,
    /// Visibility (DECTCEM, mode 25)
    pub visible: bool,
}

impl Cursor {
    pub fn new() -> Self {
        Self {
            col: 0,
            row: 0,
            visible: true,
        }
    }

    /// Move to an absolute position; the caller clamps to the screen
    pub fn goto(&mut self, col: usize, row: usize) {
        self.col = col;
        self.row = row;
    }

    pub fn move_up(&mut self, n: usize) {
        self.row = self.row.saturating_sub(n);
    }

    pub fn move_down(&mut self, n: usize, max_row: usize) {
        self.row = (self.row + n).min(max_row);
    }

    pub fn move_left(&mut self, n: usize) {
        self.col = self.col.saturating_sub(n);
    }

    pub fn move_right(&mut self, n: usize, max_col: usize) {
        self.col = (self.col + n).min(max_col);
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}
