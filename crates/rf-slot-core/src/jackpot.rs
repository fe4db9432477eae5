//! Progressive jackpot ledger
//!
//! A fixed share of every wager is added to a single pool. Once the pool
//! reaches the threshold, every resolved spin has a chance to award it; the
//! chance grows linearly with the surplus above the threshold. An award pays
//! out the whole pool and reseeds it at the baseline.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};

/// Share of each wager added to the pool
pub const CONTRIBUTION_RATE: f64 = 0.05;
/// Pool size at which the jackpot becomes winnable
pub const JACKPOT_THRESHOLD: f64 = 100.0;
/// Win chance at exactly the threshold
pub const BASE_CHANCE: f64 = 0.01;
/// Surplus (pool − threshold) that adds 100% win chance
pub const SCALE_FACTOR: f64 = 1000.0;
/// Pool value after an award
pub const JACKPOT_BASELINE: f64 = 50.0;

/// Jackpot rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JackpotConfig {
    pub contribution_rate: f64,
    pub threshold: f64,
    pub base_chance: f64,
    pub scale_factor: f64,
    pub baseline: f64,
}

impl Default for JackpotConfig {
    fn default() -> Self {
        Self {
            contribution_rate: CONTRIBUTION_RATE,
            threshold: JACKPOT_THRESHOLD,
            base_chance: BASE_CHANCE,
            scale_factor: SCALE_FACTOR,
            baseline: JACKPOT_BASELINE,
        }
    }
}

impl JackpotConfig {
    pub fn validate(&self) -> SlotResult<()> {
        if !(0.0..=1.0).contains(&self.contribution_rate) {
            return Err(SlotError::InvalidConfig(format!(
                "jackpot contribution rate must be in [0, 1], got {}",
                self.contribution_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.base_chance) {
            return Err(SlotError::InvalidConfig(format!(
                "jackpot base chance must be in [0, 1], got {}",
                self.base_chance
            )));
        }
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(SlotError::InvalidConfig(format!(
                "jackpot scale factor must be positive, got {}",
                self.scale_factor
            )));
        }
        if !(self.threshold.is_finite() && self.threshold >= 0.0) {
            return Err(SlotError::InvalidConfig(format!(
                "jackpot threshold must be non-negative, got {}",
                self.threshold
            )));
        }
        if !(self.baseline.is_finite() && self.baseline >= 0.0) {
            return Err(SlotError::InvalidConfig(format!(
                "jackpot baseline must be non-negative, got {}",
                self.baseline
            )));
        }
        Ok(())
    }
}

/// The shared jackpot pool
///
/// Value type: every operation returns the next ledger instead of mutating,
/// so a session can compute its next state before committing it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JackpotLedger {
    pool: f64,
}

impl JackpotLedger {
    pub fn new(pool: f64) -> Self {
        Self { pool: pool.max(0.0) }
    }

    pub fn pool(&self) -> f64 {
        self.pool
    }

    /// Pool after adding this wager's contribution
    pub fn accrue(self, wager: f64, config: &JackpotConfig) -> Self {
        Self {
            pool: self.pool + wager * config.contribution_rate,
        }
    }

    /// Whether the pool has reached the threshold
    pub fn is_eligible(&self, config: &JackpotConfig) -> bool {
        self.pool >= config.threshold
    }

    /// Chance of an award on the next resolution, clamped to [0, 1]
    pub fn win_probability(&self, config: &JackpotConfig) -> f64 {
        if !self.is_eligible(config) {
            return 0.0;
        }
        let surplus = self.pool - config.threshold;
        (config.base_chance + surplus / config.scale_factor).clamp(0.0, 1.0)
    }

    /// Decide the jackpot from a uniform roll in `[0, 1)`
    pub fn decide(&self, roll: f64, config: &JackpotConfig) -> bool {
        self.is_eligible(config) && roll < self.win_probability(config)
    }

    /// Decide the jackpot with a fresh draw
    pub fn decide_with<R: Rng + ?Sized>(&self, rng: &mut R, config: &JackpotConfig) -> bool {
        let roll: f64 = rng.random();
        self.decide(roll, config)
    }

    /// Pay out the whole pool; returns `(payout, reseeded ledger)`
    pub fn award(self, config: &JackpotConfig) -> (f64, Self) {
        (self.pool, Self::new(config.baseline))
    }
}

impl Default for JackpotLedger {
    fn default() -> Self {
        Self::new(crate::config::INITIAL_JACKPOT)
    }
}
