//! # rf-slot-core — Classic three-reel slot game core
//!
//! Pure game-state engine for a 3×3 fruit machine with a progressive jackpot.
//! Everything here is synchronous and deterministic given an RNG seed; the
//! timer-driven spin sequencing lives in `rf-slot-session`.
//!
//! ## Architecture
//!
//! ```text
//! Symbol catalog ──> ReelSet (pool-and-shuffle)
//!                        │
//!                        v
//!     stop positions ─> VisibleWindow (3×3)
//!                        │
//!                        v
//!                   Evaluation (rows + full grid)
//!                        │
//!                        v
//!              JackpotLedger (accrue / decide / award)
//!                        │
//!                        v
//!                  SlotEngine (SessionState transitions)
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod jackpot;
pub mod paytable;
pub mod reels;
pub mod session;
pub mod spin;
pub mod symbols;
pub mod timing;
pub mod window;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use jackpot::*;
pub use paytable::*;
pub use reels::*;
pub use session::*;
pub use spin::*;
pub use symbols::*;
pub use timing::*;
pub use window::*;
