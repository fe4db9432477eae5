//! Win evaluation
//!
//! Only the three horizontal rows pay. Each matching row adds 0.2 to a
//! multiplier starting at 1.0; a window with one symbol in all nine cells
//! replaces the multiplier with 3.0 instead.

use serde::{Deserialize, Serialize};

use crate::config::{REEL_COUNT, VISIBLE_ROWS};
use crate::symbols::Symbol;
use crate::window::VisibleWindow;

/// Multiplier before any row wins
pub const BASE_MULTIPLIER: f64 = 1.0;
/// Added to the multiplier per winning row
pub const LINE_BONUS: f64 = 0.2;
/// Multiplier when all nine cells match
pub const FULL_GRID_MULTIPLIER: f64 = 3.0;

/// A winning row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WinLine {
    /// Row index, 0 = top
    pub row: u8,
    /// Matching symbol
    pub symbol: Symbol,
    /// Matching cells (always 3 for a row win)
    pub count: u8,
}

impl WinLine {
    /// Raw pay for this line before the multiplier
    pub fn base_pay(&self) -> f64 {
        self.symbol.payout() as f64 * self.count as f64
    }
}

/// Result of evaluating one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub win_lines: Vec<WinLine>,
    /// Sum of line pays × multiplier, before house edge and wager
    pub total_win: f64,
    /// Multiplier actually applied
    pub multiplier: f64,
    /// All nine cells share one symbol
    pub full_grid: bool,
}

impl Evaluation {
    pub fn is_win(&self) -> bool {
        !self.win_lines.is_empty()
    }

    /// Credit owed for this evaluation at the given wager, after house edge
    pub fn payout(&self, wager: f64, house_edge: f64) -> f64 {
        self.total_win * wager * (1.0 - house_edge)
    }
}

/// Evaluate a visible window
pub fn evaluate(window: &VisibleWindow) -> Evaluation {
    let mut win_lines = Vec::with_capacity(VISIBLE_ROWS);
    let mut multiplier = BASE_MULTIPLIER;

    for row in 0..VISIBLE_ROWS {
        let symbols = window.row(row);
        let first = symbols[0];
        if symbols.iter().all(|&s| s == first) {
            win_lines.push(WinLine {
                row: row as u8,
                symbol: first,
                count: REEL_COUNT as u8,
            });
            multiplier += LINE_BONUS;
        }
    }

    let full_grid = window.uniform_symbol().is_some();
    if full_grid {
        multiplier = FULL_GRID_MULTIPLIER;
    }

    let base: f64 = win_lines.iter().map(WinLine::base_pay).sum();

    Evaluation {
        win_lines,
        total_win: base * multiplier,
        multiplier,
        full_grid,
    }
}
