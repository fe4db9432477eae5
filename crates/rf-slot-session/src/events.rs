//! Session event stream

use rf_slot_core::{ForcedOutcome, ReelStop, SpinOutcome, SpinTicket};
use serde::{Deserialize, Serialize};

/// Everything observable that happens in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Wager debited, reels spinning
    SpinStarted(SpinTicket),
    /// One reel came to rest; the window is interim until the last reel
    ReelStopped(ReelStop),
    /// Final evaluation credited
    SpinResolved(SpinOutcome),
    /// Spin request refused, state untouched
    SpinRejected { reason: String },
    AutoPlayChanged(bool),
    SoundChanged(bool),
    WagerChanged(f64),
    BalanceChanged(f64),
    JackpotChanged(f64),
    OverrideArmed(ForcedOutcome),
    /// Back to initial state; pending timers were cancelled
    SessionReset,
}

impl SessionEvent {
    /// Spin this event belongs to, if any
    pub fn spin_id(&self) -> Option<u64> {
        match self {
            Self::SpinStarted(ticket) => Some(ticket.spin_id),
            Self::ReelStopped(stop) => Some(stop.spin_id),
            Self::SpinResolved(outcome) => Some(outcome.spin_id),
            _ => None,
        }
    }
}
