//! Error types for the slot core

use thiserror::Error;

/// Slot game error type
///
/// None of these are fatal: a rejected spin leaves the session untouched.
#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Insufficient balance for this bet: balance {balance:.2}, wager {wager:.2}")]
    InsufficientBalance { balance: f64, wager: f64 },

    #[error("A spin is already in progress")]
    SpinInProgress,

    #[error("Stale spin step: expected spin {expected:?}, got {got}")]
    StaleSpin { expected: Option<u64>, got: u64 },

    #[error("Reel stopped out of order: expected reel {expected}, got {got}")]
    ReelOutOfOrder { expected: usize, got: usize },

    #[error("Reels still spinning")]
    ReelsStillSpinning,

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SlotError {
    /// Rejections the player can see and act on (as opposed to sequencing faults)
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::InsufficientBalance { .. } | Self::SpinInProgress)
    }
}

impl From<serde_json::Error> for SlotError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type alias
pub type SlotResult<T> = Result<T, SlotError>;
