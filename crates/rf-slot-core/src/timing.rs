//! Timing profiles for reel stops and auto-play cadence

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::REEL_COUNT;

/// Longest delay a config may ask for (ms)
pub const MAX_DELAY_MS: f64 = 60_000.0;

/// Timing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Normal gameplay timing
    #[default]
    Normal,
    /// Fast mode
    Turbo,
    /// Instant (tests, simulation)
    Studio,
    /// Scaled or hand-edited timing
    Custom,
}

impl TimingProfile {
    /// Parse a profile name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "turbo" => Some(Self::Turbo),
            "studio" => Some(Self::Studio),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

/// Window a reel's stop delay is drawn from (ms after spin start)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopWindow {
    pub min_ms: f64,
    pub max_ms: f64,
}

impl StopWindow {
    pub const fn new(min_ms: f64, max_ms: f64) -> Self {
        Self { min_ms, max_ms }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max_ms > self.min_ms {
            self.min_ms + rng.random::<f64>() * (self.max_ms - self.min_ms)
        } else {
            self.min_ms
        }
    }
}

/// Detailed timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Profile type
    pub profile: TimingProfile,

    /// Stop delay window per reel, left to right
    pub reel_stop_windows: [StopWindow; REEL_COUNT],

    /// Minimum gap between consecutive reel stops (ms)
    pub min_stop_gap_ms: f64,

    /// Pause between the last reel stopping and win evaluation (ms)
    pub resolve_delay_ms: f64,

    /// Delay before the next auto-play spin after a resolution (ms)
    pub auto_play_delay_ms: f64,

    /// Delay before the first auto-play spin when auto-play is switched on (ms)
    pub auto_play_start_delay_ms: f64,
}

impl TimingConfig {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            reel_stop_windows: [
                StopWindow::new(500.0, 800.0),
                StopWindow::new(800.0, 1200.0),
                StopWindow::new(1100.0, 1600.0),
            ],
            min_stop_gap_ms: 100.0,
            resolve_delay_ms: 500.0,
            auto_play_delay_ms: 1000.0,
            auto_play_start_delay_ms: 500.0,
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            ..Self::normal().scaled(0.4)
        }
    }

    /// Studio mode: no delays at all
    pub fn studio() -> Self {
        Self {
            profile: TimingProfile::Studio,
            ..Self::normal().scaled(0.0)
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Studio => Self::studio(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale timing by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        let windows = self
            .reel_stop_windows
            .map(|w| StopWindow::new(w.min_ms * factor, w.max_ms * factor));
        Self {
            profile: TimingProfile::Custom,
            reel_stop_windows: windows,
            min_stop_gap_ms: self.min_stop_gap_ms * factor,
            resolve_delay_ms: self.resolve_delay_ms * factor,
            auto_play_delay_ms: self.auto_play_delay_ms * factor,
            auto_play_start_delay_ms: self.auto_play_start_delay_ms * factor,
        }
    }

    /// Draw this spin's reel stop delays (ms after spin start)
    ///
    /// Delays are strictly ordered left to right: each reel stops at least
    /// `min_stop_gap_ms` after the previous one, even when windows overlap.
    pub fn generate_reel_delays<R: Rng + ?Sized>(&self, rng: &mut R) -> [f64; REEL_COUNT] {
        let mut delays = [0.0; REEL_COUNT];
        let mut floor = 0.0_f64;
        for (reel, window) in self.reel_stop_windows.iter().enumerate() {
            let delay = window.sample(rng).max(0.0);
            delays[reel] = if reel == 0 {
                delay
            } else {
                delay.max(floor + self.min_stop_gap_ms)
            };
            floor = delays[reel];
        }
        delays
    }

    /// Longest possible spin, first delay to evaluation
    pub fn max_spin_duration_ms(&self) -> f64 {
        let mut floor = 0.0_f64;
        for (reel, window) in self.reel_stop_windows.iter().enumerate() {
            floor = if reel == 0 {
                window.max_ms
            } else {
                window.max_ms.max(floor + self.min_stop_gap_ms)
            };
        }
        floor + self.resolve_delay_ms
    }

    pub fn resolve_delay(&self) -> Duration {
        ms_to_duration(self.resolve_delay_ms)
    }

    pub fn auto_play_delay(&self) -> Duration {
        ms_to_duration(self.auto_play_delay_ms)
    }

    pub fn auto_play_start_delay(&self) -> Duration {
        ms_to_duration(self.auto_play_start_delay_ms)
    }

    /// True when every delay is zero
    pub fn is_instant(&self) -> bool {
        self.max_spin_duration_ms() <= 0.0 && self.auto_play_delay_ms <= 0.0
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::normal()
    }
}

/// Milliseconds to `Duration`; negative and NaN become zero, overflow saturates
pub fn ms_to_duration(ms: f64) -> Duration {
    if ms.is_nan() || ms <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_timing_profiles() {
        let normal = TimingConfig::normal();
        let turbo = TimingConfig::turbo();
        let studio = TimingConfig::studio();

        assert!(turbo.max_spin_duration_ms() < normal.max_spin_duration_ms());
        assert!(studio.is_instant());
        assert!(!normal.is_instant());
        assert_eq!(turbo.profile, TimingProfile::Turbo);
    }

    #[test]
    fn test_reel_delays_strictly_ordered() {
        let config = TimingConfig::normal();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..1000 {
            let delays = config.generate_reel_delays(&mut rng);
            assert!(delays[0] >= 500.0 && delays[0] <= 800.0);
            for pair in delays.windows(2) {
                assert!(pair[1] >= pair[0] + config.min_stop_gap_ms);
            }
        }
    }

    #[test]
    fn test_overlapping_windows_are_reordered() {
        let mut config = TimingConfig::normal();
        config.reel_stop_windows = [StopWindow::new(900.0, 900.0); REEL_COUNT];
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let delays = config.generate_reel_delays(&mut rng);
        assert_eq!(delays, [900.0, 1000.0, 1100.0]);
    }

    #[test]
    fn test_ms_to_duration() {
        assert_eq!(ms_to_duration(-5.0), Duration::ZERO);
        assert_eq!(ms_to_duration(f64::NAN), Duration::ZERO);
        assert_eq!(ms_to_duration(1500.0), Duration::from_millis(1500));
    }

    #[test]
    fn test_ms_to_duration_saturates() {
        assert_eq!(ms_to_duration(1e300), Duration::MAX);
        assert_eq!(ms_to_duration(f64::INFINITY), Duration::MAX);
        assert_eq!(ms_to_duration(f64::NEG_INFINITY), Duration::ZERO);
    }

    #[test]
    fn test_profile_names() {
        assert_eq!(TimingProfile::from_name("TURBO"), Some(TimingProfile::Turbo));
        assert_eq!(TimingProfile::from_name("slow"), None);
    }
}
