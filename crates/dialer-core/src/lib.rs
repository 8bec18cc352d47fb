//! # dialer-core
//!
//! Call handling for a mobile dialer: the lifecycle of the single current
//! call, audio routing that follows it, and call-history sync when it ends.
//!
//! ## Architecture
//!
//! ```text
//! platform call events ──▶ CallSession ──▶ watch<CallState> ──▶ UI
//!                              │   └────▶ watch<u64> (duration)
//!                              ▼
//!                          AudioRoute (in-call surface → audio device)
//!
//! call ended / start-up ──▶ DialerManager ──▶ CallHistorySync ──▶ store ──▶ UI
//! ```
//!
//! - [`CallSession`]: state machine fed by [`PlatformCall`] state changes and
//!   user commands
//! - [`AudioRoute`]: two-tier mute/speaker/mode control that never fails
//! - [`DialerManager`]: owns the session and history sync, publishes
//!   [`DialerEvent`]s
//! - [`DialerBuilder`]: wires collaborators together
//!
//! Call-history types are re-exported from `dialer-call-history`.

pub mod audio;
pub mod builder;
pub mod call;
pub mod config;
pub mod error;
pub mod events;
pub mod manager;
pub mod platform;
pub mod prefs;
pub mod session;

pub use audio::{
    AudioDevice, AudioMode, AudioOutput, AudioPath, AudioResult, AudioRoute, AudioRouteError, InCallAudio,
};
pub use builder::DialerBuilder;
pub use call::{CallCapabilities, CallDetails, CallHandle, CallState, PlatformCallState, PlatformError};
pub use config::{DialerConfig, SessionConfig};
pub use error::{DialerError, DialerResult};
pub use events::{DialerEvent, EventEmitter, EventPriority, EventStream};
pub use manager::DialerManager;
pub use platform::{CallPlacer, PlatformCall};
pub use prefs::LastDialed;
pub use session::CallSession;

pub use dialer_call_history::{
    CallHistoryMerger, CallHistoryStore, CallHistorySync, CallLogProvider, CallRecord, CallType,
    ContactEntry, ContactProvider, HistoryConfig, HistoryError, HistoryResult, MemoryCallHistoryStore,
    NumberKeyConfig, NumberNormalizer, PhoneNumberKey, RawCallRecord, SyncReport,
};
#[cfg(feature = "persistence")]
pub use dialer_call_history::SqliteCallHistoryStore;
