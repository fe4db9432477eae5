//! Game session state

use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, REEL_COUNT};
use crate::jackpot::JackpotLedger;
use crate::paytable::WinLine;
use crate::reels::{initial_reel_set, ReelSet};
use crate::spin::ForcedOutcome;
use crate::window::{resolve_window, StopPositions, VisibleWindow};

/// Where the session is in the spin lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinPhase {
    /// Ready for a spin request
    #[default]
    Idle,
    /// At least one reel still turning
    Spinning,
    /// Every reel stopped, waiting for evaluation
    Resolving,
}

/// The spin currently being played out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinInFlight {
    pub spin_id: u64,
    pub wager: f64,
    pub forced: Option<ForcedOutcome>,
    /// Next reel allowed to stop
    pub next_reel: usize,
}

/// Running totals for the session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub total_wagered: f64,
    pub total_paid: f64,
    pub winning_spins: u64,
    pub jackpots_won: u64,
    pub jackpot_paid: f64,
    pub biggest_payout: f64,
}

impl SessionStats {
    /// Return to player: paid / wagered
    pub fn rtp(&self) -> f64 {
        if self.total_wagered > 0.0 {
            self.total_paid / self.total_wagered
        } else {
            0.0
        }
    }

    /// Share of spins that paid anything
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            self.winning_spins as f64 / self.total_spins as f64
        } else {
            0.0
        }
    }
}

/// Everything the presentation layer needs to draw the machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub reels: ReelSet,
    pub stop_positions: StopPositions,
    pub window: VisibleWindow,
    pub balance: f64,
    pub wager: f64,
    pub jackpot: JackpotLedger,
    pub last_win: f64,
    /// Per-reel spinning flag
    pub reels_spinning: [bool; REEL_COUNT],
    pub phase: SpinPhase,
    pub in_flight: Option<SpinInFlight>,
    pub auto_play: bool,
    pub sound_enabled: bool,
    pub spin_count: u64,
    pub win_lines: Vec<WinLine>,
    pub pending_override: Option<ForcedOutcome>,
    pub stats: SessionStats,
}

impl SessionState {
    /// Fresh session for a config
    pub fn initial(config: &GameConfig) -> Self {
        let reels = initial_reel_set();
        let stop_positions = [0; REEL_COUNT];
        Self {
            window: resolve_window(&reels, &stop_positions),
            reels,
            stop_positions,
            balance: config.initial_balance,
            wager: config.bet.min,
            jackpot: JackpotLedger::new(config.initial_jackpot),
            last_win: 0.0,
            reels_spinning: [false; REEL_COUNT],
            phase: SpinPhase::Idle,
            in_flight: None,
            auto_play: false,
            sound_enabled: true,
            spin_count: 0,
            win_lines: Vec::new(),
            pending_override: None,
            stats: SessionStats::default(),
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn jackpot_pool(&self) -> f64 {
        self.jackpot.pool()
    }

    /// Balance covers the current wager
    pub fn can_afford_spin(&self) -> bool {
        self.balance >= self.wager
    }

    /// Id of the spin in flight
    pub fn current_spin_id(&self) -> Option<u64> {
        self.in_flight.as_ref().map(|s| s.spin_id)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::initial(&GameConfig::default())
    }
}
