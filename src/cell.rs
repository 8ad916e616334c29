//! Terminal cell and attribute flags

use crate::color::Color;
use serde::{Deserialize, Serialize};

/// Packed cell attribute flags
///
/// One bit per SGR attribute; access goes through the typed getters and
/// setters so callers never touch the raw bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellFlags(u16);

macro_rules! flag_accessors {
    ($get:ident, $set:ident, $bit:expr) => {
        pub fn $get(self) -> bool {
            self.0 & $bit != 0
        }

        pub fn $set(&mut self, on: bool) {
            if on {
                self.0 |= $bit;
            } else {
                self.0 &= !$bit;
            }
        }
    };
}

impl CellFlags {
    const BOLD: u16 = 1 << 0;
    const DIM: u16 = 1 << 1;
    const ITALIC: u16 = 1 << 2;
    const UNDERLINE: u16 = 1 << 3;
    const BLINK: u16 = 1 << 4;
    const REVERSE: u16 = 1 << 5;
    const HIDDEN: u16 = 1 << 6;
    const STRIKETHROUGH: u16 = 1 << 7;

    flag_accessors!(bold, set_bold, Self::BOLD);
    flag_accessors!(dim, set_dim, Self::DIM);
    flag_accessors!(italic, set_italic, Self::ITALIC);
    flag_accessors!(underline, set_underline, Self::UNDERLINE);
    flag_accessors!(blink, set_blink, Self::BLINK);
    flag_accessors!(reverse, set_reverse, Self::REVERSE);
    flag_accessors!(hidden, set_hidden, Self::HIDDEN);
    flag_accessors!(strikethrough, set_strikethrough, Self::STRIKETHROUGH);

    /// True when no attribute is set
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// One grid cell: a grapheme plus its style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The character occupying the cell
    pub c: char,
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Attribute flags
    pub flags: CellFlags,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            c: ' ',
            fg: Color::Default,
            bg: Color::Default,
            flags: CellFlags::default(),
        }
    }
}

impl Cell {
    /// Build a cell from a character and the current drawing style
    pub fn styled(c: char, fg: Color, bg: Color, flags: CellFlags) -> Self {
        Self { c, fg, bg, flags }
    }

    /// Reset the cell to the default blank state
    pub fn reset(&mut self) {
        *self = Cell::default();
    }

    /// True when the cell is a default blank
    pub fn is_blank(&self) -> bool {
        self.c == ' ' && self.fg == Color::Default && self.bg == Color::Default && self.flags.is_empty()
    }
}
