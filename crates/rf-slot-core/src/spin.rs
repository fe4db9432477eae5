//! Spin records: the ticket issued when a spin starts, per-reel stops, and
//! the final outcome

use serde::{Deserialize, Serialize};

use crate::config::REEL_COUNT;
use crate::paytable::{Evaluation, WinLine};
use crate::reels::{forced_jackpot_reel_set, forced_win_reel_set, ReelSet};
use crate::window::{StopPositions, VisibleWindow};

/// Developer override applied to the next accepted spin, then discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForcedOutcome {
    /// Exactly one row win on the middle row
    Win,
    /// Full-grid top symbols and a guaranteed jackpot award
    Jackpot,
}

impl ForcedOutcome {
    /// Reel set replacing the generated one
    pub fn reel_set(&self) -> ReelSet {
        match self {
            Self::Win => forced_win_reel_set(),
            Self::Jackpot => forced_jackpot_reel_set(),
        }
    }

    /// Stop positions pinned for this outcome (random when `None`)
    pub fn pinned_stops(&self) -> Option<StopPositions> {
        match self {
            Self::Win => Some([0; REEL_COUNT]),
            Self::Jackpot => None,
        }
    }

    /// Whether the jackpot decision is forced true
    pub fn forces_jackpot(&self) -> bool {
        matches!(self, Self::Jackpot)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Jackpot => "jackpot",
        }
    }
}

/// Issued when a spin is accepted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinTicket {
    pub spin_id: u64,
    /// Wager debited for this spin
    pub wager: f64,
    /// Reels generated (or forced) for this spin
    pub reels: ReelSet,
    /// Stop delay per reel, ms after spin start, strictly increasing
    pub reel_delays_ms: [f64; REEL_COUNT],
    pub forced: Option<ForcedOutcome>,
    pub balance_after_debit: f64,
    pub jackpot_pool: f64,
}

/// A single reel coming to rest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelStop {
    pub spin_id: u64,
    pub reel: usize,
    pub position: usize,
    /// Window with every reel at its current position; interim until the last reel stops
    pub window: VisibleWindow,
    pub all_stopped: bool,
}

/// Final result of a resolved spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub spin_id: u64,
    pub wager: f64,
    pub stop_positions: StopPositions,
    pub window: VisibleWindow,
    pub evaluation: Evaluation,
    /// Row winnings credited (after wager and house edge)
    pub line_payout: f64,
    /// Jackpot pool paid out, if won
    pub jackpot_award: Option<f64>,
    /// Everything credited this spin
    pub total_payout: f64,
    pub balance: f64,
    pub jackpot_pool: f64,
    /// Raw total crossed the big-win threshold without a jackpot
    pub big_win: bool,
    pub forced: Option<ForcedOutcome>,
}

impl SpinOutcome {
    pub fn is_win(&self) -> bool {
        self.total_payout > 0.0
    }

    pub fn is_jackpot(&self) -> bool {
        self.jackpot_award.is_some()
    }

    pub fn win_lines(&self) -> &[WinLine] {
        &self.evaluation.win_lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paytable::evaluate;
    use crate::reels::FORCED_WIN_SYMBOL;
    use crate::symbols::Symbol;
    use crate::window::resolve_window;

    #[test]
    fn test_forced_win_yields_one_middle_row() {
        let forced = ForcedOutcome::Win;
        let stops = forced.pinned_stops().unwrap();
        let window = resolve_window(&forced.reel_set(), &stops);
        let eval = evaluate(&window);

        assert_eq!(window.row(1), [FORCED_WIN_SYMBOL; REEL_COUNT]);
        assert_eq!(eval.win_lines.len(), 1);
        assert_eq!(eval.win_lines[0].row, 1);
        assert!(!forced.forces_jackpot());
    }

    #[test]
    fn test_forced_jackpot_is_full_grid_anywhere() {
        let forced = ForcedOutcome::Jackpot;
        assert!(forced.pinned_stops().is_none());
        assert!(forced.forces_jackpot());

        for stops in [[0, 0, 0], [4, 7, 2], [8, 8, 8]] {
            let window = resolve_window(&forced.reel_set(), &stops);
            let eval = evaluate(&window);
            assert_eq!(window.uniform_symbol(), Some(Symbol::Seven));
            assert_eq!(eval.multiplier, 3.0);
        }
    }
}
