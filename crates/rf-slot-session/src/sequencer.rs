//! Spin Sequencer — timer-driven spin lifecycle
//!
//! Accepting a spin spawns one task per spin. The task sleeps until each
//! reel's stop time, stops the reels left to right, waits the resolve delay
//! and resolves. Every step is a single locked transition on the engine, so
//! no reader ever sees a half-applied state.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rf_slot_core::{
    ms_to_duration, SlotEngine, SlotError, SlotResult, SpinOutcome, SpinTicket, REEL_COUNT,
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::events::SessionEvent;
use crate::presenter::{Notice, Notifier, SoundBoard, SoundCue};

/// Called after every resolution, from the spin task
pub type ResolvedHook = Arc<dyn Fn(&SpinOutcome) + Send + Sync>;

const EVENT_CAPACITY: usize = 256;

struct SequencerInner {
    engine: Mutex<SlotEngine>,
    events: broadcast::Sender<SessionEvent>,
    spin_task: Mutex<Option<JoinHandle<()>>>,
    sound: Arc<dyn SoundBoard>,
    notifier: Arc<dyn Notifier>,
    on_resolved: RwLock<Option<ResolvedHook>>,
}

/// Runs spins on Tokio timers
#[derive(Clone)]
pub struct SpinSequencer {
    inner: Arc<SequencerInner>,
}

impl SpinSequencer {
    pub fn new(
        engine: SlotEngine,
        sound: Arc<dyn SoundBoard>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(SequencerInner {
                engine: Mutex::new(engine),
                events,
                spin_task: Mutex::new(None),
                sound,
                notifier,
                on_resolved: RwLock::new(None),
            }),
        }
    }

    /// Install the resolution hook, replacing any previous one
    pub fn set_on_resolved(&self, hook: ResolvedHook) {
        *self.inner.on_resolved.write() = Some(hook);
    }

    /// Run `f` with the engine locked
    ///
    /// Keep `f` short: the spin task waits on the same lock.
    pub fn with_engine<T>(&self, f: impl FnOnce(&mut SlotEngine) -> T) -> T {
        f(&mut self.inner.engine.lock())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub fn emit(&self, event: SessionEvent) {
        self.inner.emit(event);
    }

    pub fn notify(&self, notice: Notice) {
        self.inner.notifier.notify(notice);
    }

    /// Start a spin
    ///
    /// On success the reels are already spinning and the stop task is
    /// scheduled. A rejection leaves the state untouched, raises an error
    /// notice for insufficient funds and emits `SpinRejected`.
    pub fn spin(&self) -> SlotResult<SpinTicket> {
        let result = self.inner.engine.lock().begin_spin();

        let ticket = match result {
            Ok(ticket) => ticket,
            Err(err) => {
                match &err {
                    SlotError::InsufficientBalance { .. } => {
                        log::warn!("[Sequencer] spin rejected: {}", err);
                        self.notify(Notice::error("Insufficient balance for this bet"));
                    }
                    _ => log::debug!("[Sequencer] spin rejected: {}", err),
                }
                self.emit(SessionEvent::SpinRejected {
                    reason: err.to_string(),
                });
                return Err(err);
            }
        };

        self.inner.play(SoundCue::SpinStart);
        self.emit(SessionEvent::SpinStarted(ticket.clone()));

        let inner = Arc::clone(&self.inner);
        let spin_id = ticket.spin_id;
        let delays = ticket.reel_delays_ms;
        let handle = tokio::spawn(async move {
            inner.run_spin(spin_id, delays).await;
        });
        *self.inner.spin_task.lock() = Some(handle);

        Ok(ticket)
    }

    /// Abort the running spin task, if any
    ///
    /// The engine keeps its in-flight record; callers pair this with a reset.
    pub fn cancel(&self) {
        if let Some(handle) = self.inner.spin_task.lock().take() {
            handle.abort();
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.with_engine(|engine| engine.state().is_spinning())
    }
}

impl SequencerInner {
    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn play(&self, cue: SoundCue) {
        let enabled = self.engine.lock().state().sound_enabled;
        if !enabled {
            return;
        }
        if let Err(e) = self.sound.play(cue) {
            log::warn!("[Sequencer] {}", e);
        }
    }

    async fn run_spin(&self, spin_id: u64, delays: [f64; REEL_COUNT]) {
        let started = Instant::now();

        for (reel, delay) in delays.iter().enumerate() {
            let offset = ms_to_duration(*delay);
            match started.checked_add(offset) {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => tokio::time::sleep(offset).await,
            }
            let result = self.engine.lock().stop_reel(spin_id, reel);
            match result {
                Ok(stop) => self.emit(SessionEvent::ReelStopped(stop)),
                Err(e) => {
                    log::debug!("[Sequencer] dropping reel {} of spin {}: {}", reel, spin_id, e);
                    return;
                }
            }
        }

        let resolve_delay = self.engine.lock().config().timing.resolve_delay();
        tokio::time::sleep(resolve_delay).await;

        let result = self.engine.lock().resolve(spin_id);
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                log::debug!("[Sequencer] dropping resolution of spin {}: {}", spin_id, e);
                return;
            }
        };

        self.present(&outcome);
        self.emit(SessionEvent::SpinResolved(outcome.clone()));

        let hook = self.on_resolved.read().clone();
        if let Some(hook) = hook {
            hook(&outcome);
        }
    }

    fn present(&self, outcome: &SpinOutcome) {
        if let Some(amount) = outcome.jackpot_award {
            self.play(SoundCue::Jackpot);
            self.notifier
                .notify(Notice::success(format!("JACKPOT WIN! {:.2}", amount)));
        } else if outcome.is_win() {
            self.play(SoundCue::Win);
            if outcome.big_win {
                self.notifier
                    .notify(Notice::success(format!("Big Win! {:.2}", outcome.total_payout)));
            }
        }
    }
}
