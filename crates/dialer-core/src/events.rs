//! Dialer event bus
//!
//! Everything the UI may want to react to besides the observable call state
//! (microphone and speaker changes, hold requests, history sync outcomes) is
//! published as a [`DialerEvent`] on a broadcast channel. Slow subscribers
//! miss events rather than blocking the publisher.
//!
//! ```rust
//! use dialer_core::events::{DialerEvent, EventEmitter, EventPriority};
//! use tokio_stream::StreamExt;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let emitter = EventEmitter::new(16);
//! let mut events = emitter.subscribe();
//!
//! emitter.emit(DialerEvent::HoldRequested { on_hold: true });
//!
//! let event = events.next().await.unwrap().unwrap();
//! assert_eq!(event.priority(), EventPriority::Normal);
//! # }
//! ```

use chrono::{DateTime, Utc};
use dialer_call_history::SyncReport;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::audio::AudioPath;
use crate::call::CallState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialerEvent {
    CallStateChanged {
        previous: CallState,
        current: CallState,
        timestamp: DateTime<Utc>,
    },
    MicrophoneStateChanged {
        muted: bool,
        path: AudioPath,
    },
    SpeakerStateChanged {
        on: bool,
        path: AudioPath,
    },
    /// A hold or unhold command was sent to the platform
    HoldRequested {
        on_hold: bool,
    },
    HistorySynced {
        report: SyncReport,
    },
    HistorySyncFailed {
        reason: String,
    },
}

/// Event priority levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventPriority {
    /// Routine updates (history synced)
    Low,
    /// State changes and user commands
    Normal,
    /// Incoming calls and call failures
    High,
}

impl DialerEvent {
    pub fn priority(&self) -> EventPriority {
        match self {
            DialerEvent::CallStateChanged { current, .. } => match current {
                CallState::Incoming { .. } | CallState::Error { .. } => EventPriority::High,
                _ => EventPriority::Normal,
            },
            DialerEvent::MicrophoneStateChanged { .. }
            | DialerEvent::SpeakerStateChanged { .. }
            | DialerEvent::HoldRequested { .. }
            | DialerEvent::HistorySyncFailed { .. } => EventPriority::Normal,
            DialerEvent::HistorySynced { .. } => EventPriority::Low,
        }
    }

    /// Events about the current call, as opposed to history
    pub fn is_call_event(&self) -> bool {
        !matches!(
            self,
            DialerEvent::HistorySynced { .. } | DialerEvent::HistorySyncFailed { .. }
        )
    }
}

/// Event stream type
pub type EventStream = BroadcastStream<DialerEvent>;

/// Broadcasts [`DialerEvent`]s to any number of subscribers
#[derive(Clone)]
pub struct EventEmitter {
    sender: broadcast::Sender<DialerEvent>,
}

impl EventEmitter {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn emit(&self, event: DialerEvent) {
        // No receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> EventStream {
        BroadcastStream::new(self.sender.subscribe())
    }

    /// Raw receiver, for callers that prefer `recv()` over a stream
    pub fn receiver(&self) -> broadcast::Receiver<DialerEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new(256)
    }
}
