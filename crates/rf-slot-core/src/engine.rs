//! Slot engine — synchronous spin state machine
//!
//! Every operation reads the current [`SessionState`], builds the complete
//! next state, and only then replaces the old one. A rejected operation never
//! leaves a half-applied state behind.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::config::{GameConfig, REEL_COUNT, REEL_LENGTH};
use crate::error::{SlotError, SlotResult};
use crate::jackpot::JackpotLedger;
use crate::paytable::evaluate;
use crate::reels::generate_reel_set;
use crate::session::{SessionState, SpinInFlight, SpinPhase};
use crate::spin::{ForcedOutcome, ReelStop, SpinOutcome, SpinTicket};
use crate::window::resolve_window;

/// Slot engine
///
/// Owns the configuration, the RNG and the session state. Timing is left to
/// the caller: `begin_spin`, `stop_reel` and `resolve` are the three steps the
/// asynchronous sequencer schedules, and `spin_instant` runs them back to back.
pub struct SlotEngine {
    config: GameConfig,
    rng: ChaCha8Rng,
    state: SessionState,
    /// Never reset, so ids stay unique across game resets
    next_spin_id: u64,
}

impl SlotEngine {
    /// Create an engine seeded from OS entropy
    pub fn new(config: GameConfig) -> SlotResult<Self> {
        Self::build(config, ChaCha8Rng::from_os_rng())
    }

    /// Create a reproducible engine
    pub fn with_seed(config: GameConfig, seed: u64) -> SlotResult<Self> {
        Self::build(config, ChaCha8Rng::seed_from_u64(seed))
    }

    fn build(config: GameConfig, rng: ChaCha8Rng) -> SlotResult<Self> {
        config.validate()?;
        Ok(Self {
            state: SessionState::initial(&config),
            config,
            rng,
            next_spin_id: 1,
        })
    }

    /// Re-seed the RNG
    pub fn seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Owned copy of the state
    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Idle → Spinning
    ///
    /// Debits the wager, feeds the jackpot, consumes any pending override and
    /// deals a new reel set. Rejected without any state change when a spin is
    /// already running or the balance does not cover the wager.
    pub fn begin_spin(&mut self) -> SlotResult<SpinTicket> {
        let prev = &self.state;
        if prev.is_spinning() {
            return Err(SlotError::SpinInProgress);
        }
        if !prev.can_afford_spin() {
            return Err(SlotError::InsufficientBalance {
                balance: prev.balance,
                wager: prev.wager,
            });
        }

        let spin_id = self.next_spin_id;
        let wager = prev.wager;
        let forced = prev.pending_override;
        let reels = match forced {
            Some(outcome) => outcome.reel_set(),
            None => generate_reel_set(&mut self.rng),
        };
        let reel_delays_ms = self.config.timing.generate_reel_delays(&mut self.rng);
        let stop_positions = [0; REEL_COUNT];

        let mut next = prev.clone();
        next.balance -= wager;
        next.jackpot = prev.jackpot.accrue(wager, &self.config.jackpot);
        next.pending_override = None;
        next.reels = reels;
        next.stop_positions = stop_positions;
        next.window = resolve_window(&reels, &stop_positions);
        next.win_lines.clear();
        next.last_win = 0.0;
        next.reels_spinning = [true; REEL_COUNT];
        next.phase = SpinPhase::Spinning;
        next.spin_count += 1;
        next.stats.total_spins += 1;
        next.stats.total_wagered += wager;
        next.in_flight = Some(SpinInFlight {
            spin_id,
            wager,
            forced,
            next_reel: 0,
        });

        let ticket = SpinTicket {
            spin_id,
            wager,
            reels,
            reel_delays_ms,
            forced,
            balance_after_debit: next.balance,
            jackpot_pool: next.jackpot.pool(),
        };

        self.next_spin_id += 1;
        self.state = next;

        log::debug!(
            "[SlotEngine] spin {} started: wager {:.2}, balance {:.2}, jackpot {:.2}{}",
            spin_id,
            wager,
            ticket.balance_after_debit,
            ticket.jackpot_pool,
            forced.map(|f| format!(", forced {}", f.name())).unwrap_or_default()
        );

        Ok(ticket)
    }

    /// Per-reel Spinning → Stopped
    ///
    /// Reels must stop left to right. The window is recomputed from every
    /// reel's current position; reels still turning keep their old position.
    pub fn stop_reel(&mut self, spin_id: u64, reel: usize) -> SlotResult<ReelStop> {
        let flight = self.check_in_flight(spin_id)?;
        if reel != flight.next_reel {
            return Err(SlotError::ReelOutOfOrder {
                expected: flight.next_reel,
                got: reel,
            });
        }
        let pinned = flight.forced.and_then(|f| f.pinned_stops());

        let position = match pinned {
            Some(stops) => stops[reel],
            None => self.rng.random_range(0..REEL_LENGTH),
        };

        let mut next = self.state.clone();
        next.stop_positions[reel] = position;
        next.reels_spinning[reel] = false;
        next.window = resolve_window(&next.reels, &next.stop_positions);
        let all_stopped = reel + 1 == REEL_COUNT;
        if all_stopped {
            next.phase = SpinPhase::Resolving;
        }
        if let Some(flight) = next.in_flight.as_mut() {
            flight.next_reel = reel + 1;
        }

        let stop = ReelStop {
            spin_id,
            reel,
            position,
            window: next.window,
            all_stopped,
        };
        self.state = next;

        log::debug!("[SlotEngine] spin {} reel {} stopped at {}", spin_id, reel, position);
        Ok(stop)
    }

    /// Resolving → Idle
    ///
    /// Evaluates the final window, decides the jackpot, credits the combined
    /// win and clears the in-flight spin.
    pub fn resolve(&mut self, spin_id: u64) -> SlotResult<SpinOutcome> {
        let flight = self.check_in_flight(spin_id)?;
        if flight.next_reel < REEL_COUNT {
            return Err(SlotError::ReelsStillSpinning);
        }
        let wager = flight.wager;
        let forced = flight.forced;

        let prev = &self.state;
        let evaluation = evaluate(&prev.window);
        let line_payout = evaluation.payout(wager, self.config.house_edge);

        let jackpot_cfg = &self.config.jackpot;
        let jackpot_won = forced.is_some_and(|f| f.forces_jackpot())
            || prev.jackpot.decide_with(&mut self.rng, jackpot_cfg);
        let (jackpot_award, jackpot): (Option<f64>, JackpotLedger) = if jackpot_won {
            let (amount, reseeded) = prev.jackpot.award(jackpot_cfg);
            (Some(amount), reseeded)
        } else {
            (None, prev.jackpot)
        };

        let total_payout = line_payout + jackpot_award.unwrap_or(0.0);
        let big_win = !jackpot_won && evaluation.total_win > self.config.big_win_threshold;

        let mut next = prev.clone();
        next.balance += total_payout;
        next.last_win = total_payout;
        next.jackpot = jackpot;
        next.win_lines = evaluation.win_lines.clone();
        next.in_flight = None;
        next.phase = SpinPhase::Idle;
        next.reels_spinning = [false; REEL_COUNT];
        if total_payout > 0.0 {
            next.stats.winning_spins += 1;
            next.stats.total_paid += total_payout;
            next.stats.biggest_payout = next.stats.biggest_payout.max(total_payout);
        }
        if let Some(amount) = jackpot_award {
            next.stats.jackpots_won += 1;
            next.stats.jackpot_paid += amount;
        }

        let outcome = SpinOutcome {
            spin_id,
            wager,
            stop_positions: next.stop_positions,
            window: next.window,
            evaluation,
            line_payout,
            jackpot_award,
            total_payout,
            balance: next.balance,
            jackpot_pool: next.jackpot.pool(),
            big_win,
            forced,
        };
        self.state = next;

        if let Some(amount) = jackpot_award {
            log::info!("[SlotEngine] spin {} JACKPOT {:.2}", spin_id, amount);
        }
        log::info!(
            "[SlotEngine] spin {} resolved: {} line(s), ×{:.1}, paid {:.2}, balance {:.2}",
            spin_id,
            outcome.evaluation.win_lines.len(),
            outcome.evaluation.multiplier,
            total_payout,
            outcome.balance
        );

        Ok(outcome)
    }

    /// Run a whole spin with no delays
    pub fn spin_instant(&mut self) -> SlotResult<SpinOutcome> {
        let ticket = self.begin_spin()?;
        for reel in 0..REEL_COUNT {
            self.stop_reel(ticket.spin_id, reel)?;
        }
        self.resolve(ticket.spin_id)
    }

    fn check_in_flight(&self, spin_id: u64) -> SlotResult<SpinInFlight> {
        match &self.state.in_flight {
            Some(flight) if flight.spin_id == spin_id => Ok(flight.clone()),
            other => Err(SlotError::StaleSpin {
                expected: other.as_ref().map(|f| f.spin_id),
                got: spin_id,
            }),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SETTERS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Set the wager, clamped into the bet limits; returns the applied wager
    pub fn set_wager(&mut self, amount: f64) -> f64 {
        let wager = self.config.bet.clamp(amount);
        self.state.wager = wager;
        wager
    }

    pub fn increase_bet(&mut self) -> f64 {
        let wager = self.config.bet.step_up(self.state.wager);
        self.set_wager(wager)
    }

    pub fn decrease_bet(&mut self) -> f64 {
        let wager = self.config.bet.step_down(self.state.wager);
        self.set_wager(wager)
    }

    pub fn set_max_bet(&mut self) -> f64 {
        self.set_wager(self.config.bet.max)
    }

    pub fn set_min_bet(&mut self) -> f64 {
        self.set_wager(self.config.bet.min)
    }

    /// Developer override: may drive the balance negative
    pub fn set_balance(&mut self, amount: f64) {
        self.state.balance = amount;
    }

    /// Developer override
    pub fn set_jackpot(&mut self, amount: f64) {
        self.state.jackpot = JackpotLedger::new(amount);
    }

    /// Flip the sound flag; returns the new value
    pub fn toggle_sound(&mut self) -> bool {
        self.state.sound_enabled = !self.state.sound_enabled;
        self.state.sound_enabled
    }

    pub fn set_auto_play(&mut self, enabled: bool) {
        self.state.auto_play = enabled;
    }

    /// Arm a one-shot override for the next accepted spin
    pub fn arm_override(&mut self, outcome: ForcedOutcome) {
        self.state.pending_override = Some(outcome);
    }

    /// Back to the initial session; spin ids keep counting
    pub fn reset(&mut self) {
        self.state = SessionState::initial(&self.config);
        log::info!("[SlotEngine] session reset");
    }
}
