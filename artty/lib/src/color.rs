//! Color quantization onto the xterm 256-color palette.
//!
//! Art pieces store one palette index per cell, so every source pixel has to be
//! reduced to the nearest color of the full xterm palette: the 16 system
//! colors, the 6x6x6 cube and the 24-step gray ramp.

use std::sync::LazyLock;

use crate::art::Cell;

/// Pixels with alpha at or below this value are treated as background.
pub const ALPHA_THRESHOLD: u8 = 0x30;

/// A plain 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    /// Creates a new RGB triple.
    #[inline]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Formats the triple as lowercase `rrggbb`.
    pub fn hex(&self) -> String {
        format!("{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    /// Parses `rrggbb` or `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    fn distance(self, other: Rgb) -> u32 {
        let dr = u32::from(self.red.abs_diff(other.red));
        let dg = u32::from(self.green.abs_diff(other.green));
        let db = u32::from(self.blue.abs_diff(other.blue));
        dr * dr + dg * dg + db * db
    }
}

/// The 16 xterm system colors (default xterm values).
const SYSTEM_COLORS: [Rgb; 16] = [
    Rgb::new(0, 0, 0),
    Rgb::new(128, 0, 0),
    Rgb::new(0, 128, 0),
    Rgb::new(128, 128, 0),
    Rgb::new(0, 0, 128),
    Rgb::new(128, 0, 128),
    Rgb::new(0, 128, 128),
    Rgb::new(192, 192, 192),
    Rgb::new(128, 128, 128),
    Rgb::new(255, 0, 0),
    Rgb::new(0, 255, 0),
    Rgb::new(255, 255, 0),
    Rgb::new(0, 0, 255),
    Rgb::new(255, 0, 255),
    Rgb::new(0, 255, 255),
    Rgb::new(255, 255, 255),
];

fn generate_xterm_palette() -> [Rgb; 256] {
    let mut palette = [Rgb::default(); 256];
    palette[..16].copy_from_slice(&SYSTEM_COLORS);

    // 16-231: 6x6x6 color cube
    let levels = [0u8, 95, 135, 175, 215, 255];
    for r in 0..6 {
        for g in 0..6 {
            for b in 0..6 {
                palette[16 + r * 36 + g * 6 + b] = Rgb::new(levels[r], levels[g], levels[b]);
            }
        }
    }

    // 232-255: grayscale ramp
    for i in 0..24 {
        let gray = (8 + i * 10) as u8;
        palette[232 + i] = Rgb::new(gray, gray, gray);
    }

    palette
}

/// The full xterm 256-color palette.
pub static XTERM_PALETTE: LazyLock<[Rgb; 256]> = LazyLock::new(generate_xterm_palette);

/// Returns the palette index closest to `rgb`.
///
/// Distance is squared Euclidean in RGB space; ties resolve to the lowest index,
/// which keeps the mapping deterministic.
pub fn nearest_xterm256(rgb: Rgb) -> u8 {
    let mut best_index = 0;
    let mut best_distance = u32::MAX;

    for (index, candidate) in XTERM_PALETTE.iter().enumerate() {
        let distance = rgb.distance(*candidate);
        if distance < best_distance {
            best_distance = distance;
            best_index = index;
            if distance == 0 {
                break;
            }
        }
    }

    best_index as u8
}

/// Maps a hex color (`rrggbb` or `#rrggbb`) to its nearest palette index.
///
/// ## Examples
///
/// ```
/// use artty_lib::color::hex_to_xterm256;
///
/// assert_eq!(hex_to_xterm256("#ff0000"), Some(9));
/// assert_eq!(hex_to_xterm256("#af87d7"), Some(140));
/// assert_eq!(hex_to_xterm256("not a color"), None);
/// ```
pub fn hex_to_xterm256(hex: &str) -> Option<u8> {
    Rgb::from_hex(hex).map(nearest_xterm256)
}

/// Quantizes one RGBA pixel into an art cell.
///
/// ## Examples
///
/// ```
/// use artty_lib::{art::Cell, color::quantize};
///
/// assert_eq!(quantize(255, 255, 255, 0x30), Cell::Empty);
/// assert_eq!(quantize(255, 255, 255, 0xff), Cell::Color(15));
/// ```
pub fn quantize(red: u8, green: u8, blue: u8, alpha: u8) -> Cell {
    if alpha <= ALPHA_THRESHOLD {
        return Cell::Empty;
    }

    Cell::Color(nearest_xterm256(Rgb::new(red, green, blue)))
}

/// Formats a palette index as its stored token, e.g. `color016`.
pub fn color_token(index: u8) -> String {
    format!("color{index:03}")
}

/// Parses a stored color token (`color16`, `color016`) back into an index.
pub fn parse_color_token(token: &str) -> Option<u8> {
    let digits = token.strip_prefix("color")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Resolves a legend value (a color token or a hex color) to a palette index.
pub fn resolve_color(value: &str) -> Option<u8> {
    parse_color_token(value).or_else(|| hex_to_xterm256(value))
}
