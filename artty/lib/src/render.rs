//! Half-block terminal rendering of art pieces.
//!
//! Two grid rows share one terminal line: the upper cell is drawn with the
//! foreground color of `▀` and the lower cell with its background color. Empty
//! cells draw nothing, so the terminal background shows through.

use crate::art::ArtPiece;

/// Clears the screen and homes the cursor.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

const RESET: &str = "\x1b[0m";
const UPPER_HALF: char = '▀';
const LOWER_HALF: char = '▄';
const FULL_BLOCK: char = '█';

/// Renders `piece` as lines of text.
///
/// With `color` the output uses 256-color SGR sequences; without it, glyph
/// shape alone shows which cells are drawn.
///
/// ## Examples
///
/// ```
/// use artty_lib::{art::{ArtPiece, Cell}, render::render};
///
/// let piece = ArtPiece::new("dot", vec![vec![Cell::Color(196)], vec![Cell::Empty]]);
/// assert_eq!(render(&piece, false), "▀\n");
/// assert_eq!(render(&piece, true), "\x1b[38;5;196m▀\x1b[0m\n");
/// ```
pub fn render(piece: &ArtPiece, color: bool) -> String {
    let mut out = String::new();

    for pair in piece.grid.chunks(2) {
        let upper = &pair[0];
        let lower = pair.get(1);

        for (column, cell) in upper.iter().enumerate() {
            let top = piece.resolve(cell);
            let bottom = lower.and_then(|row| row.get(column)).and_then(|c| piece.resolve(c));

            if color {
                push_colored(&mut out, top, bottom);
            } else {
                out.push(match (top, bottom) {
                    (Some(_), Some(_)) => FULL_BLOCK,
                    (Some(_), None) => UPPER_HALF,
                    (None, Some(_)) => LOWER_HALF,
                    (None, None) => ' ',
                });
            }
        }

        out.push('\n');
    }

    out
}

fn push_colored(out: &mut String, top: Option<u8>, bottom: Option<u8>) {
    match (top, bottom) {
        (Some(top), Some(bottom)) => {
            out.push_str(&format!("\x1b[38;5;{top}m\x1b[48;5;{bottom}m{UPPER_HALF}{RESET}"));
        }
        (Some(top), None) => out.push_str(&format!("\x1b[38;5;{top}m{UPPER_HALF}{RESET}")),
        (None, Some(bottom)) => {
            out.push_str(&format!("\x1b[38;5;{bottom}m{LOWER_HALF}{RESET}"));
        }
        (None, None) => out.push(' '),
    }
}
