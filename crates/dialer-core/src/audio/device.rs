//! Audio collaborator traits
//!
//! Two ways to control call audio exist on the device:
//!
//! - [`InCallAudio`]: the telephony-managed route exposed by the active
//!   in-call surface. It coordinates with system audio focus.
//! - [`AudioDevice`]: direct control of the device audio manager (mode,
//!   speakerphone flag, microphone mute).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for audio collaborator calls
pub type AudioResult<T> = Result<T, AudioRouteError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioRouteError {
    /// The path does not implement this operation
    #[error("Operation not supported by this audio path")]
    Unsupported,

    #[error("Audio route rejected: {reason}")]
    Rejected { reason: String },

    #[error("Audio device error: {message}")]
    Device { message: String },
}

impl AudioRouteError {
    pub fn device(message: impl Into<String>) -> Self {
        Self::Device { message: message.into() }
    }
}

/// Device audio mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioMode {
    Normal,
    InCall,
    InCommunication,
}

impl AudioMode {
    /// Modes in which the speakerphone flag routes call audio
    pub fn is_call_mode(&self) -> bool {
        matches!(self, AudioMode::InCall | AudioMode::InCommunication)
    }
}

/// Output endpoint for the telephony-managed route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioOutput {
    Speaker,
    Earpiece,
}

/// Direct control over the device audio manager
pub trait AudioDevice: Send + Sync {
    fn set_microphone_mute(&self, muted: bool) -> AudioResult<()>;

    fn is_microphone_mute(&self) -> AudioResult<bool>;

    fn set_speakerphone_on(&self, on: bool) -> AudioResult<()>;

    fn is_speakerphone_on(&self) -> AudioResult<bool>;

    fn set_mode(&self, mode: AudioMode) -> AudioResult<()>;

    fn mode(&self) -> AudioResult<AudioMode>;
}

/// Audio controls of the active in-call surface
pub trait InCallAudio: Send + Sync {
    fn set_muted(&self, muted: bool) -> AudioResult<()>;

    fn set_audio_route(&self, output: AudioOutput) -> AudioResult<()>;

    /// Switch the device into call audio. Most surfaces leave this to the
    /// audio manager.
    fn engage_call_audio(&self) -> AudioResult<()> {
        Err(AudioRouteError::Unsupported)
    }

    fn reset_audio(&self) -> AudioResult<()> {
        Err(AudioRouteError::Unsupported)
    }
}
