//! Presentation collaborators: audio cues and user notifications

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Audio cue requested by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    SpinStart,
    Win,
    Jackpot,
}

impl SoundCue {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SpinStart => "spin",
            Self::Win => "win",
            Self::Jackpot => "jackpot",
        }
    }
}

/// Audio playback failure; never fatal
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio backend unavailable: {0}")]
    Unavailable(String),

    #[error("Could not play '{cue}': {reason}")]
    Playback { cue: &'static str, reason: String },
}

/// Plays audio cues
pub trait SoundBoard: Send + Sync {
    fn play(&self, cue: SoundCue) -> Result<(), AudioError>;
}

/// Sound board that plays nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSoundBoard;

impl SoundBoard for SilentSoundBoard {
    fn play(&self, cue: SoundCue) -> Result<(), AudioError> {
        log::trace!("[Sound] {}", cue.name());
        Ok(())
    }
}

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Short user-facing message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Shows notices to the player
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier writing to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => log::warn!("[Notice] {}", notice.message),
            NoticeLevel::Info | NoticeLevel::Success => log::info!("[Notice] {}", notice.message),
        }
    }
}
