//! Terminal color representation
//!
//! Colors are a tagged sum so equality is structural and style comparison
//! during rendering is a plain `==`.

use serde::{Deserialize, Serialize};

/// The eight basic ANSI colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl NamedColor {
    /// Map an index 0-7 to the corresponding basic color
    pub fn from_index(index: u8) -> Self {
        match index & 7 {
            0 => NamedColor::Black,
            1 => NamedColor::Red,
            2 => NamedColor::Green,
            3 => NamedColor::Yellow,
            4 => NamedColor::Blue,
            5 => NamedColor::Magenta,
            6 => NamedColor::Cyan,
            _ => NamedColor::White,
        }
    }

    /// Index of this color within the basic palette (0-7)
    pub fn index(self) -> u8 {
        match self {
            NamedColor::Black => 0,
            NamedColor::Red => 1,
            NamedColor::Green => 2,
            NamedColor::Yellow => 3,
            NamedColor::Blue => 4,
            NamedColor::Magenta => 5,
            NamedColor::Cyan => 6,
            NamedColor::White => 7,
        }
    }
}

/// A cell foreground or background color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Color {
    /// Terminal default (the renderer picks the theme color)
    #[default]
    Default,
    /// Basic named color (SGR 30-37 / 40-47)
    Named(NamedColor),
    /// Bright named color (SGR 90-97 / 100-107)
    Bright(NamedColor),
    /// 256-color palette index (SGR 38;5;N / 48;5;N)
    Indexed(u8),
    /// 24-bit truecolor (SGR 38;2;R;G;B / 48;2;R;G;B)
    Rgb(u8, u8, u8),
}

impl Color {
    /// Map a 256-color palette index onto the narrowest variant:
    /// 0-7 basic, 8-15 bright, everything else indexed.
    pub fn from_ansi_code(index: u8) -> Self {
        match index {
            0..=7 => Color::Named(NamedColor::from_index(index)),
            8..=15 => Color::Bright(NamedColor::from_index(index - 8)),
            _ => Color::Indexed(index),
        }
    }
}
