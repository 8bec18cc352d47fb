//! Dialer configuration
//!
//! ```rust
//! use dialer_core::config::{DialerConfig, SessionConfig};
//! use std::time::Duration;
//!
//! let config = DialerConfig::new()
//!     .with_session(SessionConfig::new().with_duration_tick(Duration::from_millis(500)))
//!     .with_sync_on_start(false);
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.session.duration_tick(), Duration::from_millis(500));
//! ```

use std::path::PathBuf;
use std::time::Duration;

use dialer_call_history::HistoryConfig;
use serde::{Deserialize, Serialize};

use crate::error::{DialerError, DialerResult};

/// Call-session behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Interval of the call duration timer, in milliseconds
    pub duration_tick_ms: u64,
    /// Display name for outgoing calls without one
    pub unknown_caller_label: String,
    /// Display name for incoming calls without caller details
    pub unknown_incoming_label: String,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self {
            duration_tick_ms: 1000,
            unknown_caller_label: "Unknown".to_string(),
            unknown_incoming_label: "Unknown Caller".to_string(),
        }
    }

    pub fn with_duration_tick(mut self, tick: Duration) -> Self {
        self.duration_tick_ms = tick.as_millis() as u64;
        self
    }

    pub fn with_unknown_caller_label(mut self, label: impl Into<String>) -> Self {
        self.unknown_caller_label = label.into();
        self
    }

    pub fn with_unknown_incoming_label(mut self, label: impl Into<String>) -> Self {
        self.unknown_incoming_label = label.into();
        self
    }

    pub fn duration_tick(&self) -> Duration {
        Duration::from_millis(self.duration_tick_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level dialer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialerConfig {
    pub session: SessionConfig,
    pub history: HistoryConfig,
    /// Run one history sync when the manager starts
    pub sync_on_start: bool,
    /// Run a history sync every time a call ends
    pub sync_on_call_end: bool,
    /// Capacity of the event broadcast channel
    pub event_capacity: usize,
    /// Where the last dialed number is persisted (memory only when `None`)
    pub last_dialed_path: Option<PathBuf>,
}

impl DialerConfig {
    pub fn new() -> Self {
        Self {
            session: SessionConfig::default(),
            history: HistoryConfig::default(),
            sync_on_start: true,
            sync_on_call_end: true,
            event_capacity: 256,
            last_dialed_path: None,
        }
    }

    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    pub fn with_history(mut self, history: HistoryConfig) -> Self {
        self.history = history;
        self
    }

    pub fn with_sync_on_start(mut self, enabled: bool) -> Self {
        self.sync_on_start = enabled;
        self
    }

    pub fn with_sync_on_call_end(mut self, enabled: bool) -> Self {
        self.sync_on_call_end = enabled;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn with_last_dialed_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.last_dialed_path = Some(path.into());
        self
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> DialerResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| DialerError::invalid_configuration("dialer", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DialerResult<()> {
        if self.session.duration_tick_ms == 0 {
            return Err(DialerError::invalid_configuration(
                "session.duration_tick_ms",
                "must be greater than zero",
            ));
        }
        if self.event_capacity == 0 {
            return Err(DialerError::invalid_configuration(
                "event_capacity",
                "must be greater than zero",
            ));
        }
        self.history.validate()?;
        Ok(())
    }
}

impl Default for DialerConfig {
    fn default() -> Self {
        Self::new()
    }
}
