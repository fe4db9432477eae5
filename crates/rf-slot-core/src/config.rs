//! Game configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::jackpot::JackpotConfig;
use crate::timing::{TimingConfig, MAX_DELAY_MS};

/// Reels on the machine
pub const REEL_COUNT: usize = 3;
/// Symbols per generated reel
pub const REEL_LENGTH: usize = 9;
/// Visible rows per reel
pub const VISIBLE_ROWS: usize = 3;

pub const MIN_BET: f64 = 1.0;
pub const MAX_BET: f64 = 10.0;
pub const BET_STEP: f64 = 0.5;
pub const INITIAL_BALANCE: f64 = 100.0;
pub const INITIAL_JACKPOT: f64 = 50.0;
/// Fraction of nominal winnings withheld before crediting
pub const HOUSE_EDGE: f64 = 0.05;
/// Raw evaluated total above which a "big win" notice is raised
pub const BIG_WIN_THRESHOLD: f64 = 10.0;

/// Wager bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetLimits {
    pub min: f64,
    pub max: f64,
    /// Increment for step up / step down
    pub step: f64,
}

impl BetLimits {
    /// Clamp a requested wager into `[min, max]`
    pub fn clamp(&self, amount: f64) -> f64 {
        if amount.is_nan() {
            return self.min;
        }
        amount.clamp(self.min, self.max)
    }

    pub fn step_up(&self, current: f64) -> f64 {
        self.clamp(current + self.step)
    }

    pub fn step_down(&self, current: f64) -> f64 {
        self.clamp(current - self.step)
    }

    pub fn contains(&self, amount: f64) -> bool {
        amount >= self.min && amount <= self.max
    }
}

impl Default for BetLimits {
    fn default() -> Self {
        Self {
            min: MIN_BET,
            max: MAX_BET,
            step: BET_STEP,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub bet: BetLimits,
    pub initial_balance: f64,
    pub initial_jackpot: f64,
    pub house_edge: f64,
    pub big_win_threshold: f64,
    pub jackpot: JackpotConfig,
    pub timing: TimingConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            bet: BetLimits::default(),
            initial_balance: INITIAL_BALANCE,
            initial_jackpot: INITIAL_JACKPOT,
            house_edge: HOUSE_EDGE,
            big_win_threshold: BIG_WIN_THRESHOLD,
            jackpot: JackpotConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

impl GameConfig {
    /// Default game with instant timing
    pub fn studio() -> Self {
        Self {
            timing: TimingConfig::studio(),
            ..Self::default()
        }
    }

    /// Builder-style timing override
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Check the config for values the engine cannot run with
    pub fn validate(&self) -> SlotResult<()> {
        let invalid = |msg: String| Err(SlotError::InvalidConfig(msg));

        if !(self.bet.min.is_finite() && self.bet.min > 0.0) {
            return invalid(format!("min bet must be positive, got {}", self.bet.min));
        }
        if !self.bet.max.is_finite() || self.bet.max < self.bet.min {
            return invalid(format!(
                "max bet {} is below min bet {}",
                self.bet.max, self.bet.min
            ));
        }
        if !(self.bet.step.is_finite() && self.bet.step > 0.0) {
            return invalid(format!("bet step must be positive, got {}", self.bet.step));
        }
        if !(self.initial_balance.is_finite() && self.initial_balance >= 0.0) {
            return invalid(format!(
                "initial balance must be non-negative, got {}",
                self.initial_balance
            ));
        }
        if !(self.initial_jackpot.is_finite() && self.initial_jackpot >= 0.0) {
            return invalid(format!(
                "initial jackpot must be non-negative, got {}",
                self.initial_jackpot
            ));
        }
        if !(0.0..=1.0).contains(&self.house_edge) {
            return invalid(format!("house edge must be in [0, 1], got {}", self.house_edge));
        }
        self.jackpot.validate()?;

        let t = &self.timing;
        let delays = t
            .reel_stop_windows
            .iter()
            .flat_map(|w| [w.min_ms, w.max_ms])
            .chain([
                t.min_stop_gap_ms,
                t.resolve_delay_ms,
                t.auto_play_delay_ms,
                t.auto_play_start_delay_ms,
            ]);
        for delay in delays {
            if !(delay.is_finite() && delay >= 0.0) {
                return invalid(format!("timing values must be non-negative, got {}", delay));
            }
            if delay > MAX_DELAY_MS {
                return invalid(format!(
                    "timing values must not exceed {} ms, got {}",
                    MAX_DELAY_MS, delay
                ));
            }
        }
        if t.reel_stop_windows.iter().any(|w| w.max_ms < w.min_ms) {
            return invalid("reel stop window max is below its min".into());
        }

        Ok(())
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> SlotResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Export as pretty JSON
    pub fn to_json(&self) -> SlotResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> SlotResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::TimingProfile;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GameConfig::default().validate().is_ok());
        assert!(GameConfig::studio().validate().is_ok());
    }

    #[test]
    fn test_bet_clamp() {
        let limits = BetLimits::default();
        assert_eq!(limits.clamp(0.2), MIN_BET);
        assert_eq!(limits.clamp(55.0), MAX_BET);
        assert_eq!(limits.clamp(4.5), 4.5);
        assert_eq!(limits.clamp(f64::NAN), MIN_BET);
        assert_eq!(limits.clamp(f64::INFINITY), MAX_BET);
        assert_eq!(limits.clamp(f64::NEG_INFINITY), MIN_BET);
    }

    #[test]
    fn test_bet_steps() {
        let limits = BetLimits::default();
        assert_eq!(limits.step_up(1.0), 1.5);
        assert_eq!(limits.step_up(10.0), 10.0);
        assert_eq!(limits.step_down(1.0), 1.0);
        assert_eq!(limits.step_down(3.0), 2.5);
    }

    #[test]
    fn test_validate_rejects_inverted_limits() {
        let mut config = GameConfig::default();
        config.bet.min = 20.0;
        assert!(matches!(config.validate(), Err(SlotError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_bad_house_edge() {
        let mut config = GameConfig::default();
        config.house_edge = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_timing() {
        let mut config = GameConfig::default();
        config.timing.resolve_delay_ms = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_huge_timing() {
        let mut config = GameConfig::default();
        config.timing.auto_play_start_delay_ms = 1e300;
        assert!(matches!(config.validate(), Err(SlotError::InvalidConfig(_))));

        let json = r#"{ "timing": { "profile": "custom",
            "reel_stop_windows": [
                { "min_ms": 500.0, "max_ms": 800.0 },
                { "min_ms": 800.0, "max_ms": 1200.0 },
                { "min_ms": 1100.0, "max_ms": 1600.0 }
            ],
            "min_stop_gap_ms": 100.0,
            "resolve_delay_ms": 1e300,
            "auto_play_delay_ms": 1000.0,
            "auto_play_start_delay_ms": 500.0 } }"#;
        assert!(matches!(
            GameConfig::from_json(json),
            Err(SlotError::InvalidConfig(_))
        ));

        config.timing = TimingConfig::normal().scaled(10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip_preserves_config() {
        let config = GameConfig::default().with_timing(TimingConfig::turbo());
        let json = config.to_json().unwrap();
        let parsed = GameConfig::from_json(&json).unwrap();
        assert_eq!(parsed.timing.profile, TimingProfile::Turbo);
        assert_eq!(parsed.bet, config.bet);
        assert_eq!(parsed.initial_balance, config.initial_balance);
        approx::assert_relative_eq!(parsed.house_edge, config.house_edge);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json(r#"{ "initial_balance": 250.0 }"#).unwrap();
        assert_eq!(config.initial_balance, 250.0);
        assert_eq!(config.bet, BetLimits::default());
        assert_eq!(config.jackpot, JackpotConfig::default());
    }

    #[test]
    fn test_malformed_json() {
        let err = GameConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SlotError::Serialization(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "house_edge": 0.1 }}"#).unwrap();

        let config = GameConfig::load(file.path()).unwrap();
        assert_eq!(config.house_edge, 0.1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = GameConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SlotError::Io(_)));
    }
}
