//! Call state and platform call types
//!
//! [`CallState`] is what the UI observes. [`PlatformCallState`] is what the
//! telephony stack reports for a bound call; the session maps one onto the
//! other.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle of the single current call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallState {
    /// No call
    #[default]
    Idle,
    Dialing { number: String, display_name: String },
    Connecting { number: String, display_name: String },
    Incoming { number: String, display_name: String },
    Active { number: String, display_name: String },
    OnHold { number: String, display_name: String },
    /// Call just ended; becomes `Idle` once the call handle is unregistered
    Ended,
    /// The dial attempt failed
    Error { message: String },
}

impl CallState {
    /// True while a call exists (dialing through on hold)
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            CallState::Dialing { .. }
                | CallState::Connecting { .. }
                | CallState::Incoming { .. }
                | CallState::Active { .. }
                | CallState::OnHold { .. }
        )
    }

    /// `Idle`, `Ended` and `Error` accept no call commands
    pub fn is_terminal(&self) -> bool {
        !self.is_live()
    }

    /// Connected states during which the duration timer runs
    pub fn is_in_call(&self) -> bool {
        matches!(self, CallState::Active { .. } | CallState::OnHold { .. })
    }

    /// Number of the current call, if any
    pub fn number(&self) -> Option<&str> {
        match self {
            CallState::Dialing { number, .. }
            | CallState::Connecting { number, .. }
            | CallState::Incoming { number, .. }
            | CallState::Active { number, .. }
            | CallState::OnHold { number, .. } => Some(number),
            _ => None,
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        match self {
            CallState::Dialing { display_name, .. }
            | CallState::Connecting { display_name, .. }
            | CallState::Incoming { display_name, .. }
            | CallState::Active { display_name, .. }
            | CallState::OnHold { display_name, .. } => Some(display_name),
            _ => None,
        }
    }

    /// Short name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            CallState::Idle => "Idle",
            CallState::Dialing { .. } => "Dialing",
            CallState::Connecting { .. } => "Connecting",
            CallState::Incoming { .. } => "Incoming",
            CallState::Active { .. } => "Active",
            CallState::OnHold { .. } => "OnHold",
            CallState::Ended => "Ended",
            CallState::Error { .. } => "Error",
        }
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallState::Error { message } => write!(f, "Error({message})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Opaque identity of one platform-tracked call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallHandle(Uuid);

impl CallHandle {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CallHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Call state as reported by the telephony stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformCallState {
    New,
    Dialing,
    Ringing,
    Connecting,
    Active,
    Holding,
    Disconnecting,
    Disconnected,
}

/// Capability bitmask the platform reports per call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallCapabilities(u32);

impl CallCapabilities {
    /// Call can be put on hold right now
    pub const HOLD: u32 = 0x0000_0001;
    /// Call supports hold in general
    pub const SUPPORT_HOLD: u32 = 0x0000_0002;
    pub const MUTE: u32 = 0x0000_0040;

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn contains(&self, flag: u32) -> bool {
        self.0 & flag == flag
    }

    pub const fn can_hold(&self) -> bool {
        self.contains(Self::HOLD)
    }
}

/// Details the platform exposes for a call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallDetails {
    pub number: Option<String>,
    pub display_name: Option<String>,
    pub capabilities: CallCapabilities,
}

impl CallDetails {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: Some(number.into()),
            display_name: None,
            capabilities: CallCapabilities::default(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_capabilities(mut self, capabilities: CallCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}

/// Failure reported by a platform call primitive
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Operation rejected by platform: {reason}")]
    Rejected { reason: String },

    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("Call no longer exists")]
    CallGone,

    #[error("Platform error: {message}")]
    Other { message: String },
}

impl PlatformError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected { reason: reason.into() }
    }
}
