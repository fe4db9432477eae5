//! Auto-Play Controller
//!
//! At most one delayed trigger is pending at any time. Scheduling a new one
//! aborts the old, and every trigger carries a generation number so a trigger
//! that was superseded while already running does nothing.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use rf_slot_core::{SlotError, SpinOutcome};
use tokio::task::JoinHandle;

use crate::events::SessionEvent;
use crate::presenter::Notice;
use crate::sequencer::{ResolvedHook, SpinSequencer};

struct PendingTrigger {
    generation: u64,
    handle: JoinHandle<()>,
}

struct AutoPlayInner {
    sequencer: SpinSequencer,
    pending: Mutex<Option<PendingTrigger>>,
    generation: Mutex<u64>,
}

/// Chains spins while auto-play is on
#[derive(Clone)]
pub struct AutoPlayController {
    inner: Arc<AutoPlayInner>,
}

impl AutoPlayController {
    pub fn new(sequencer: SpinSequencer) -> Self {
        Self {
            inner: Arc::new(AutoPlayInner {
                sequencer,
                pending: Mutex::new(None),
                generation: Mutex::new(0),
            }),
        }
    }

    /// Hook for [`SpinSequencer::set_on_resolved`]
    ///
    /// Holds the controller weakly so the sequencer does not keep it alive.
    pub fn resolved_hook(&self) -> ResolvedHook {
        let weak: Weak<AutoPlayInner> = Arc::downgrade(&self.inner);
        Arc::new(move |outcome: &SpinOutcome| {
            if let Some(inner) = weak.upgrade() {
                AutoPlayController { inner }.on_resolved(outcome);
            }
        })
    }

    pub fn is_active(&self) -> bool {
        self.inner
            .sequencer
            .with_engine(|engine| engine.state().auto_play)
    }

    /// A trigger is waiting to fire
    pub fn has_pending(&self) -> bool {
        self.inner
            .pending
            .lock()
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    /// Flip auto-play; returns the new flag
    pub fn toggle(&self) -> bool {
        if self.is_active() {
            self.stop();
            false
        } else {
            self.start();
            true
        }
    }

    /// Switch auto-play on
    ///
    /// From Idle with enough balance the first spin follows after the start
    /// delay; during a spin the chain continues from its resolution.
    pub fn start(&self) {
        let (was_active, spinning, affordable, delay) =
            self.inner.sequencer.with_engine(|engine| {
                let was_active = engine.state().auto_play;
                engine.set_auto_play(true);
                (
                    was_active,
                    engine.state().is_spinning(),
                    engine.state().can_afford_spin(),
                    engine.config().timing.auto_play_start_delay(),
                )
            });

        if !was_active {
            log::info!("[AutoPlay] on");
            self.inner.sequencer.emit(SessionEvent::AutoPlayChanged(true));
        }
        if !spinning && affordable {
            self.schedule(delay);
        }
    }

    /// Switch auto-play off and cancel any pending trigger
    pub fn stop(&self) {
        self.cancel_pending();
        let was_active = self.inner.sequencer.with_engine(|engine| {
            let was_active = engine.state().auto_play;
            engine.set_auto_play(false);
            was_active
        });
        if was_active {
            log::info!("[AutoPlay] off");
            self.inner.sequencer.emit(SessionEvent::AutoPlayChanged(false));
        }
    }

    /// Abort the pending trigger without touching the auto-play flag
    pub fn cancel_pending(&self) {
        *self.inner.generation.lock() += 1;
        if let Some(pending) = self.inner.pending.lock().take() {
            pending.handle.abort();
        }
    }

    fn on_resolved(&self, outcome: &SpinOutcome) {
        let (active, affordable, delay) = self.inner.sequencer.with_engine(|engine| {
            (
                engine.state().auto_play,
                engine.state().can_afford_spin(),
                engine.config().timing.auto_play_delay(),
            )
        });
        if !active {
            return;
        }
        if !affordable {
            log::info!(
                "[AutoPlay] stopping after spin {}: balance {:.2} below wager",
                outcome.spin_id,
                outcome.balance
            );
            self.stop();
            self.inner
                .sequencer
                .notify(Notice::info("Auto-play stopped: insufficient balance"));
            return;
        }
        self.schedule(delay);
    }

    fn schedule(&self, delay: Duration) {
        let mut generation = self.inner.generation.lock();
        *generation += 1;
        let this_generation = *generation;

        let weak = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                AutoPlayController { inner }.fire(this_generation);
            }
        });

        let previous = self.inner.pending.lock().replace(PendingTrigger {
            generation: this_generation,
            handle,
        });
        drop(generation);
        if let Some(previous) = previous {
            previous.handle.abort();
        }
    }

    fn fire(&self, generation: u64) {
        {
            let current = self.inner.generation.lock();
            if *current != generation {
                log::debug!("[AutoPlay] trigger {} superseded", generation);
                return;
            }
            let mut pending = self.inner.pending.lock();
            if pending.as_ref().is_some_and(|p| p.generation == generation) {
                pending.take();
            }
        }

        if !self.is_active() {
            return;
        }

        match self.inner.sequencer.spin() {
            Ok(ticket) => log::debug!("[AutoPlay] started spin {}", ticket.spin_id),
            Err(SlotError::SpinInProgress) => {
                // The running spin's resolution schedules the next trigger
            }
            Err(e) => {
                log::info!("[AutoPlay] stopping: {}", e);
                self.stop();
            }
        }
    }
}
