//! # rf-slot-session — Live slot session
//!
//! Drives the synchronous [`rf_slot_core::SlotEngine`] on Tokio timers:
//! reels stop one by one, the result is evaluated after a short pause, and
//! auto-play chains the next spin. Presentation (audio cues, notifications)
//! is pluggable through [`SoundBoard`] and [`Notifier`]; everything that
//! happens is also broadcast as a [`SessionEvent`].
//!
//! All timer-driven operations must be called from within a Tokio runtime.

pub mod autoplay;
pub mod events;
pub mod presenter;
pub mod sequencer;
pub mod session;

pub use autoplay::AutoPlayController;
pub use events::SessionEvent;
pub use presenter::*;
pub use sequencer::{ResolvedHook, SpinSequencer};
pub use session::{wait_for_outcome, SessionBuilder, SlotSession};
