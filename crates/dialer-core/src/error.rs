//! Error types for dialer-core
//!
//! Only a failed dial is surfaced as [`CallState::Error`](crate::call::CallState::Error).
//! Other platform command failures are logged and absorbed by the session,
//! and audio routing failures never leave [`AudioRoute`](crate::audio::AudioRoute).
//! The variants below are what the command surface returns to its caller.

use dialer_call_history::HistoryError;
use thiserror::Error;

/// Result type alias for dialer operations
pub type DialerResult<T> = Result<T, DialerError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialerError {
    /// The platform refused to place the call
    #[error("Call setup failed: {reason}")]
    CallSetupFailed { reason: String },

    /// A new call was requested while another one is live
    #[error("Another call is in progress ({state})")]
    CallInProgress { state: String },

    #[error("Invalid number: '{number}'")]
    InvalidNumber { number: String },

    #[error("No active call")]
    NoActiveCall,

    #[error("Platform command '{command}' failed: {reason}")]
    PlatformCommandFailed { command: String, reason: String },

    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("Preferences error: {reason}")]
    PreferencesError { reason: String },

    #[error("Call history error: {0}")]
    History(#[from] HistoryError),
}

impl DialerError {
    pub fn call_setup_failed(reason: impl Into<String>) -> Self {
        Self::CallSetupFailed { reason: reason.into() }
    }

    pub fn invalid_number(number: impl Into<String>) -> Self {
        Self::InvalidNumber { number: number.into() }
    }

    pub fn platform_command_failed(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PlatformCommandFailed {
            command: command.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn preferences(reason: impl Into<String>) -> Self {
        Self::PreferencesError { reason: reason.into() }
    }

    /// Check if this error is recoverable (user can simply try again)
    pub fn is_recoverable(&self) -> bool {
        match self {
            DialerError::CallSetupFailed { .. }
            | DialerError::CallInProgress { .. }
            | DialerError::NoActiveCall
            | DialerError::PlatformCommandFailed { .. }
            | DialerError::PreferencesError { .. } => true,

            DialerError::History(err) => err.is_recoverable(),

            DialerError::InvalidNumber { .. } | DialerError::InvalidConfiguration { .. } => false,
        }
    }

    /// Get error category for metrics/logging
    pub fn category(&self) -> &'static str {
        match self {
            DialerError::CallSetupFailed { .. }
            | DialerError::CallInProgress { .. }
            | DialerError::InvalidNumber { .. }
            | DialerError::NoActiveCall => "call",
            DialerError::PlatformCommandFailed { .. } => "platform",
            DialerError::InvalidConfiguration { .. } | DialerError::PreferencesError { .. } => "configuration",
            DialerError::History(_) => "history",
        }
    }
}
