//! Visible 3×3 window

use serde::{Deserialize, Serialize};

use crate::config::{REEL_COUNT, VISIBLE_ROWS};
use crate::reels::{initial_reel_set, ReelSet};
use crate::symbols::Symbol;

/// One stop position per reel
pub type StopPositions = [usize; REEL_COUNT];

/// The visible grid, stored column-major (one column per reel, top to bottom)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisibleWindow {
    columns: [[Symbol; VISIBLE_ROWS]; REEL_COUNT],
}

impl VisibleWindow {
    pub const fn from_columns(columns: [[Symbol; VISIBLE_ROWS]; REEL_COUNT]) -> Self {
        Self { columns }
    }

    /// Build from rows (row-major), mostly for tests and fixtures
    pub fn from_rows(rows: [[Symbol; REEL_COUNT]; VISIBLE_ROWS]) -> Self {
        Self {
            columns: std::array::from_fn(|reel| std::array::from_fn(|row| rows[row][reel])),
        }
    }

    pub fn column(&self, reel: usize) -> [Symbol; VISIBLE_ROWS] {
        self.columns[reel]
    }

    pub fn columns(&self) -> &[[Symbol; VISIBLE_ROWS]; REEL_COUNT] {
        &self.columns
    }

    /// Symbols across all reels on one row
    pub fn row(&self, row: usize) -> [Symbol; REEL_COUNT] {
        std::array::from_fn(|reel| self.columns[reel][row])
    }

    pub fn cell(&self, reel: usize, row: usize) -> Symbol {
        self.columns[reel][row]
    }

    /// All nine cells, reel by reel
    pub fn cells(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.columns.iter().flat_map(|col| col.iter().copied())
    }

    /// The symbol filling every cell, if there is one
    pub fn uniform_symbol(&self) -> Option<Symbol> {
        let first = self.columns[0][0];
        self.cells().all(|s| s == first).then_some(first)
    }
}

impl Default for VisibleWindow {
    fn default() -> Self {
        resolve_window(&initial_reel_set(), &[0; REEL_COUNT])
    }
}

/// Compute the visible grid for a reel set at the given stop positions
///
/// Each column is `[reel[pos], reel[pos + 1], reel[pos + 2]]`, wrapping at the
/// end of the reel. Positions beyond the reel length are taken modulo the length.
pub fn resolve_window(reels: &ReelSet, positions: &StopPositions) -> VisibleWindow {
    VisibleWindow {
        columns: std::array::from_fn(|reel| reels[reel].visible(positions[reel])),
    }
}
