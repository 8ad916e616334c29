//! SGR (Select Graphic Rendition) handling

use crate::cell::CellFlags;
use crate::color::{Color, NamedColor};
use crate::screen::Screen;
use vte::Params;

impl Screen {
    pub(in crate::screen) fn handle_csi_style(&mut self, params: &Params, intermediates: &[u8]) {
        if !intermediates.is_empty() {
            // xterm key-modifier variants, not emulated
            return;
        }

        if params.is_empty() {
            self.reset_style();
            return;
        }

        let mut iter = params.iter();
        while let Some(param_slice) = iter.next() {
            let param = param_slice.first().copied().unwrap_or(0);
            match param {
                0 => self.reset_style(),
                1 => self.flags.set_bold(true),
                2 => self.flags.set_dim(true),
                3 => self.flags.set_italic(true),
                4 => self.flags.set_underline(true),
                5 | 6 => self.flags.set_blink(true),
                7 => self.flags.set_reverse(true),
                8 => self.flags.set_hidden(true),
                9 => self.flags.set_strikethrough(true),
                21 => self.flags.set_bold(false),
                22 => {
                    self.flags.set_bold(false);
                    self.flags.set_dim(false);
                }
                23 => self.flags.set_italic(false),
                24 => self.flags.set_underline(false),
                25 => self.flags.set_blink(false),
                27 => self.flags.set_reverse(false),
                28 => self.flags.set_hidden(false),
                29 => self.flags.set_strikethrough(false),
                30..=37 => self.fg = Color::Named(NamedColor::from_index((param - 30) as u8)),
                38 => {
                    if let Some(color) = extended_color(param_slice, &mut iter) {
                        self.fg = color;
                    }
                }
                39 => self.fg = Color::Default,
                40..=47 => self.bg = Color::Named(NamedColor::from_index((param - 40) as u8)),
                48 => {
                    if let Some(color) = extended_color(param_slice, &mut iter) {
                        self.bg = color;
                    }
                }
                49 => self.bg = Color::Default,
                90..=97 => self.fg = Color::Bright(NamedColor::from_index((param - 90) as u8)),
                100..=107 => self.bg = Color::Bright(NamedColor::from_index((param - 100) as u8)),
                // Unrecognized parameters are skipped; iteration continues
                _ => {}
            }
        }
    }

    fn reset_style(&mut self) {
        self.flags = CellFlags::default();
        self.fg = Color::Default;
        self.bg = Color::Default;
    }
}

/// Decode the extended forms of SGR 38/48.
///
/// Colon sub-parameters arrive flattened into `param_slice`
/// (`38:5:196`); semicolon parameters arrive as separate entries and are
/// pulled from the surrounding iterator (`38;5;196`).
fn extended_color<'a>(
    param_slice: &[u16],
    iter: &mut impl Iterator<Item = &'a [u16]>,
) -> Option<Color> {
    if let Some(&mode) = param_slice.get(1) {
        match mode {
            2 => {
                let r = param_slice.get(2).copied().unwrap_or(0) as u8;
                let g = param_slice.get(3).copied().unwrap_or(0) as u8;
                let b = param_slice.get(4).copied().unwrap_or(0) as u8;
                Some(Color::Rgb(r, g, b))
            }
            5 => param_slice
                .get(2)
                .map(|&idx| Color::from_ansi_code(idx as u8)),
            _ => None,
        }
    } else {
        let mode = iter.next().and_then(|p| p.first()).copied()?;
        match mode {
            2 => {
                let mut next = || iter.next().and_then(|p| p.first()).copied().unwrap_or(0) as u8;
                let r = next();
                let g = next();
                let b = next();
                Some(Color::Rgb(r, g, b))
            }
            5 => iter
                .next()
                .and_then(|p| p.first())
                .map(|&idx| Color::from_ansi_code(idx as u8)),
            _ => None,
        }
    }
}
