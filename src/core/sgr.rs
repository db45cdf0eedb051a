//! Select Graphic Rendition
//!
//! Pure functions that fold an SGR parameter list into a cell's rendition.
//! The terminal keeps one "default cell" holding the current rendition and
//! replaces it with the result of [`apply_sgr`] whenever an SGR arrives.

use super::cell::{Blink, Cell, Color, Intensity, TextStyle};

/// Apply SGR `params` left to right on top of `base`.
///
/// `0` resets to a fresh default cell rather than merging. Extended colors
/// (`38`/`48`) consume their arguments from the same list. A malformed
/// extended color is skipped and the values after it are read as ordinary
/// codes. Unknown codes are ignored.
pub fn apply_sgr(params: &[u32], base: &Cell) -> Cell {
    let mut cell = base.clone();
    let mut i = 0;

    while i < params.len() {
        let code = params[i];

        match code {
            0 => cell = Cell::default(),

            1 => cell.intensity = Intensity::High,
            2 => cell.intensity = Intensity::Low,
            22 => cell.intensity = Intensity::Normal,

            3 => cell.style = TextStyle::Italic,
            23 => cell.style = TextStyle::Normal,

            5 => cell.blink = Blink::Slow,
            6 => cell.blink = Blink::Fast,
            25 => cell.blink = Blink::None,

            7 => cell.reversed = true,
            27 => cell.reversed = false,

            30..=37 => cell.foreground = Color::palette((code - 30) as u8),
            39 => cell.foreground = Color::Default,
            40..=47 => cell.background = Color::palette((code - 40) as u8),
            49 => cell.background = Color::Default,

            38 | 48 => match extended_color(&params[i + 1..]) {
                Some((color, consumed)) => {
                    if code == 38 {
                        cell.foreground = color;
                    } else {
                        cell.background = color;
                    }
                    i += consumed;
                }
                None => {
                    tracing::warn!("malformed extended color in SGR {:?}", params);
                }
            },

            _ => tracing::debug!("SGR attribute {} ignored", code),
        }

        i += 1;
    }

    cell
}

/// Decode the arguments following a `38` or `48`. Returns the color and the
/// number of parameters consumed.
fn extended_color(rest: &[u32]) -> Option<(Color, usize)> {
    match rest {
        [2, r, g, b, ..] => {
            let r = u8::try_from(*r).ok()?;
            let g = u8::try_from(*g).ok()?;
            let b = u8::try_from(*b).ok()?;
            Some((Color::Rgb(r, g, b), 4))
        }
        [5, n, ..] => {
            let n = u8::try_from(*n).ok()?;
            Some((decode_8bit_color(n), 2))
        }
        _ => None,
    }
}

/// Decode an xterm 256-color index.
///
/// Indices 8-15 fold onto the base palette: the bright variants are not
/// distinguished.
pub fn decode_8bit_color(n: u8) -> Color {
    match n {
        0..=7 => Color::palette(n),
        8..=15 => Color::palette(n - 8),
        16..=231 => {
            let i = n - 16;
            let r = i / 36;
            let g = (i % 36) / 6;
            let b = i % 6;
            Color::Rgb(51 * r, 51 * g, 51 * b)
        }
        232..=255 => {
            let v = (255.0 / 23.0 * f64::from(n - 232)).round() as u8;
            Color::Rgb(v, v, v)
        }
    }
}
