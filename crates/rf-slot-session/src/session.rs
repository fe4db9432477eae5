//! SlotSession — the game's external interface

use std::sync::Arc;

use rf_slot_core::{
    paytable_entries, ForcedOutcome, GameConfig, PaytableEntry, SessionState, SessionStats,
    SlotEngine, SlotError, SlotResult, SpinOutcome, SpinTicket,
};
use tokio::sync::broadcast;

use crate::autoplay::AutoPlayController;
use crate::events::SessionEvent;
use crate::presenter::{LogNotifier, Notice, Notifier, SilentSoundBoard, SoundBoard};
use crate::sequencer::SpinSequencer;

/// A playable slot session
///
/// Dropping the session aborts its pending timers.
pub struct SlotSession {
    sequencer: SpinSequencer,
    autoplay: AutoPlayController,
}

impl SlotSession {
    /// Session with default presenters, seeded from OS entropy
    pub fn new(config: GameConfig) -> SlotResult<Self> {
        SessionBuilder::new(config).build()
    }

    pub fn builder(config: GameConfig) -> SessionBuilder {
        SessionBuilder::new(config)
    }

    fn from_parts(
        engine: SlotEngine,
        sound: Arc<dyn SoundBoard>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let sequencer = SpinSequencer::new(engine, sound, notifier);
        let autoplay = AutoPlayController::new(sequencer.clone());
        sequencer.set_on_resolved(autoplay.resolved_hook());
        Self {
            sequencer,
            autoplay,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Copy of the full game state
    pub fn snapshot(&self) -> SessionState {
        self.sequencer.with_engine(|engine| engine.snapshot())
    }

    pub fn stats(&self) -> SessionStats {
        self.sequencer.with_engine(|engine| engine.state().stats.clone())
    }

    pub fn config(&self) -> GameConfig {
        self.sequencer.with_engine(|engine| engine.config().clone())
    }

    pub fn paytable(&self) -> Vec<PaytableEntry> {
        paytable_entries()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sequencer.subscribe()
    }

    pub fn is_spinning(&self) -> bool {
        self.sequencer.is_spinning()
    }

    pub fn is_auto_play(&self) -> bool {
        self.autoplay.is_active()
    }

    /// An auto-play spin is scheduled but has not started yet
    pub fn has_pending_auto_spin(&self) -> bool {
        self.autoplay.has_pending()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PLAY
    // ═══════════════════════════════════════════════════════════════════════════

    /// Request a spin; returns once the reels are spinning
    pub fn spin(&self) -> SlotResult<SpinTicket> {
        self.sequencer.spin()
    }

    /// Spin and wait for the resolution
    pub async fn spin_and_wait(&self) -> SlotResult<SpinOutcome> {
        let mut events = self.subscribe();
        let ticket = self.spin()?;
        wait_for_outcome(&mut events, ticket.spin_id).await
    }

    /// Flip auto-play; returns the new flag
    pub fn toggle_auto_play(&self) -> bool {
        self.autoplay.toggle()
    }

    pub fn stop_auto_play(&self) {
        self.autoplay.stop();
    }

    /// Back to the initial state, cancelling every pending timer
    pub fn reset_game(&self) {
        self.autoplay.stop();
        self.sequencer.cancel();
        self.sequencer.with_engine(|engine| engine.reset());
        self.sequencer.emit(SessionEvent::SessionReset);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SETTINGS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Set the wager, clamped into the bet limits
    pub fn set_wager(&self, amount: f64) -> f64 {
        self.apply_wager(|engine| engine.set_wager(amount))
    }

    pub fn increase_bet(&self) -> f64 {
        self.apply_wager(SlotEngine::increase_bet)
    }

    pub fn decrease_bet(&self) -> f64 {
        self.apply_wager(SlotEngine::decrease_bet)
    }

    pub fn set_max_bet(&self) -> f64 {
        self.apply_wager(SlotEngine::set_max_bet)
    }

    pub fn set_min_bet(&self) -> f64 {
        self.apply_wager(SlotEngine::set_min_bet)
    }

    fn apply_wager(&self, f: impl FnOnce(&mut SlotEngine) -> f64) -> f64 {
        let wager = self.sequencer.with_engine(f);
        self.sequencer.emit(SessionEvent::WagerChanged(wager));
        wager
    }

    pub fn toggle_sound(&self) -> bool {
        let enabled = self.sequencer.with_engine(|engine| engine.toggle_sound());
        self.sequencer.emit(SessionEvent::SoundChanged(enabled));
        enabled
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // DEVELOPER OVERRIDES
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn set_balance(&self, amount: f64) {
        self.sequencer.with_engine(|engine| engine.set_balance(amount));
        self.sequencer.emit(SessionEvent::BalanceChanged(amount));
    }

    pub fn set_jackpot(&self, amount: f64) {
        let pool = self.sequencer.with_engine(|engine| {
            engine.set_jackpot(amount);
            engine.state().jackpot_pool()
        });
        self.sequencer.emit(SessionEvent::JackpotChanged(pool));
    }

    /// Next accepted spin lands exactly one winning row
    pub fn force_win(&self) {
        self.arm(ForcedOutcome::Win, "Win will be forced on next spin");
    }

    /// Next accepted spin pays the jackpot
    pub fn force_jackpot(&self) {
        self.arm(ForcedOutcome::Jackpot, "Jackpot win will be forced on next spin");
    }

    fn arm(&self, outcome: ForcedOutcome, message: &str) {
        self.sequencer.with_engine(|engine| engine.arm_override(outcome));
        log::info!("[Session] override armed: {}", outcome.name());
        self.sequencer.notify(Notice::info(message));
        self.sequencer.emit(SessionEvent::OverrideArmed(outcome));
    }
}

impl Drop for SlotSession {
    fn drop(&mut self) {
        self.autoplay.cancel_pending();
        self.sequencer.cancel();
    }
}

/// Wait for the resolution of `spin_id` on an event stream
///
/// Fails with `StaleSpin` if the session is reset first.
pub async fn wait_for_outcome(
    events: &mut broadcast::Receiver<SessionEvent>,
    spin_id: u64,
) -> SlotResult<SpinOutcome> {
    let stale = SlotError::StaleSpin {
        expected: None,
        got: spin_id,
    };
    loop {
        match events.recv().await {
            Ok(SessionEvent::SpinResolved(outcome)) if outcome.spin_id == spin_id => {
                return Ok(outcome);
            }
            Ok(SessionEvent::SessionReset) => return Err(stale),
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                log::warn!("[Session] event stream lagged by {}", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => return Err(stale),
        }
    }
}

/// Builder for [`SlotSession`]
pub struct SessionBuilder {
    config: GameConfig,
    seed: Option<u64>,
    sound: Arc<dyn SoundBoard>,
    notifier: Arc<dyn Notifier>,
}

impl SessionBuilder {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            seed: None,
            sound: Arc::new(SilentSoundBoard),
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Reproducible RNG
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn sound(mut self, sound: Arc<dyn SoundBoard>) -> Self {
        self.sound = sound;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn build(self) -> SlotResult<SlotSession> {
        let engine = match self.seed {
            Some(seed) => SlotEngine::with_seed(self.config, seed)?,
            None => SlotEngine::new(self.config)?,
        };
        Ok(SlotSession::from_parts(engine, self.sound, self.notifier))
    }
}
