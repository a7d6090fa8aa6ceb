//! The art piece data model.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::{color_token, parse_color_token, resolve_color};
use crate::error::{ArtError, Result};

/// One grid position of an art piece.
///
/// Cells are stored as string tokens: `""` for empty, `colorNNN` for a palette
/// index, and anything else is a symbol looked up in the piece's legend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Cell {
    /// Nothing is drawn here.
    #[default]
    Empty,
    /// An xterm 256-color palette index.
    Color(u8),
    /// An indirect token resolved through [`ArtPiece::legend`].
    Symbol(String),
}

impl Cell {
    /// Returns true for cells that draw nothing.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<String> for Cell {
    fn from(token: String) -> Self {
        if token.is_empty() {
            Self::Empty
        } else if let Some(index) = parse_color_token(&token) {
            Self::Color(index)
        } else {
            Self::Symbol(token)
        }
    }
}

impl From<Cell> for String {
    fn from(cell: Cell) -> Self {
        cell.to_string()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Color(index) => f.write_str(&color_token(*index)),
            Self::Symbol(symbol) => f.write_str(symbol),
        }
    }
}

/// A named, rectangular grid of terminal color cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtPiece {
    pub name: String,

    /// Symbol -> color mappings for [`Cell::Symbol`] cells.
    #[serde(default)]
    pub legend: BTreeMap<String, String>,

    /// Rows of cells, top to bottom.
    #[serde(rename = "pixels")]
    pub grid: Vec<Vec<Cell>>,
}

impl ArtPiece {
    /// Creates a piece with an empty legend.
    pub fn new(name: impl Into<String>, grid: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            legend: BTreeMap::new(),
            grid,
        }
    }

    /// Column count of the longest row.
    pub fn width(&self) -> usize {
        self.grid.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Row count.
    pub fn height(&self) -> usize {
        self.grid.len()
    }

    /// Returns the palette index a cell draws with, if any.
    ///
    /// Symbols resolve through the legend; a legend value may be a color token
    /// or a hex color. Unknown symbols draw nothing.
    pub fn resolve(&self, cell: &Cell) -> Option<u8> {
        match cell {
            Cell::Empty => None,
            Cell::Color(index) => Some(*index),
            Cell::Symbol(symbol) => {
                let resolved = self.legend.get(symbol).and_then(|value| resolve_color(value));
                if resolved.is_none() {
                    tracing::warn!(piece = %self.name, %symbol, "unresolved legend symbol");
                }
                resolved
            }
        }
    }

    /// Checks the name and grid invariants.
    ///
    /// ## Errors
    ///
    /// Returns [`ArtError::InvalidPiece`] if the name is not lookup safe or the
    /// grid is not rectangular.
    pub fn validate(&self) -> Result<()> {
        if !is_safe_name(&self.name) {
            return Err(self.invalid("name must be non-empty and contain no path separators"));
        }

        let width = self.width();
        if let Some(row) = self.grid.iter().position(|row| row.len() != width) {
            return Err(self.invalid(format!(
                "row {row} has {} cells, expected {width}",
                self.grid[row].len()
            )));
        }

        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> ArtError {
        ArtError::InvalidPiece {
            name: self.name.clone(),
            reason: reason.into(),
        }
    }
}

/// Returns true if `name` can double as a file stem and a lookup key.
pub fn is_safe_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.chars().any(|c| matches!(c, '/' | '\\' | '\0'))
}
