//! Builder for [`DialerManager`]
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use dialer_core::*;
//! # async fn example(
//! #     placer: Arc<dyn CallPlacer>,
//! #     device: Arc<dyn AudioDevice>,
//! #     call_log: Arc<dyn CallLogProvider>,
//! #     contacts: Arc<dyn ContactProvider>,
//! # ) -> DialerResult<()> {
//! let dialer = DialerBuilder::new()
//!     .call_placer(placer)
//!     .audio_device(device)
//!     .call_log_provider(call_log)
//!     .contact_provider(contacts)
//!     .config(DialerConfig::new().with_last_dialed_path("/data/dialer/prefs.json"))
//!     .build()
//!     .await?;
//!
//! dialer.start();
//! dialer.session().start_call("5551234", Some("Alex")).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use dialer_call_history::{
    CallHistoryStore, CallHistorySync, CallLogProvider, ContactProvider, MemoryCallHistoryStore,
};
use tracing::debug;

use crate::audio::{AudioDevice, AudioRoute};
use crate::config::DialerConfig;
use crate::error::{DialerError, DialerResult};
use crate::events::EventEmitter;
use crate::manager::DialerManager;
use crate::platform::CallPlacer;
use crate::prefs::LastDialed;
use crate::session::CallSession;

/// Collects collaborators and configuration for a [`DialerManager`].
///
/// A call placer is required. History sync is enabled when both a call-log
/// and a contact provider are given; without a store it keeps history in
/// memory.
#[derive(Default)]
pub struct DialerBuilder {
    config: DialerConfig,
    placer: Option<Arc<dyn CallPlacer>>,
    audio_device: Option<Arc<dyn AudioDevice>>,
    call_log: Option<Arc<dyn CallLogProvider>>,
    contacts: Option<Arc<dyn ContactProvider>>,
    store: Option<Arc<dyn CallHistoryStore>>,
}

impl DialerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: DialerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn call_placer(mut self, placer: Arc<dyn CallPlacer>) -> Self {
        self.placer = Some(placer);
        self
    }

    /// Direct audio control used when no in-call surface can serve a request
    pub fn audio_device(mut self, device: Arc<dyn AudioDevice>) -> Self {
        self.audio_device = Some(device);
        self
    }

    pub fn call_log_provider(mut self, provider: Arc<dyn CallLogProvider>) -> Self {
        self.call_log = Some(provider);
        self
    }

    pub fn contact_provider(mut self, provider: Arc<dyn ContactProvider>) -> Self {
        self.contacts = Some(provider);
        self
    }

    pub fn history_store(mut self, store: Arc<dyn CallHistoryStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub async fn build(self) -> DialerResult<Arc<DialerManager>> {
        self.config.validate()?;
        let placer = self
            .placer
            .ok_or_else(|| DialerError::invalid_configuration("call_placer", "a call placer is required"))?;

        let last_dialed = match &self.config.last_dialed_path {
            Some(path) => LastDialed::open(path).await?,
            None => LastDialed::in_memory(),
        };

        let events = EventEmitter::new(self.config.event_capacity);
        let audio = Arc::new(AudioRoute::new(self.audio_device));
        let session = Arc::new(CallSession::new(
            placer,
            audio,
            events.clone(),
            Arc::new(last_dialed),
            self.config.session.clone(),
        ));

        let history = match (self.call_log, self.contacts) {
            (Some(call_log), Some(contacts)) => {
                let store: Arc<dyn CallHistoryStore> = match self.store {
                    Some(store) => store,
                    None => Arc::new(MemoryCallHistoryStore::new()),
                };
                Some(Arc::new(CallHistorySync::new(
                    call_log,
                    contacts,
                    store,
                    self.config.history.clone(),
                )?))
            }
            (None, None) => None,
            _ => {
                return Err(DialerError::invalid_configuration(
                    "history",
                    "call history needs both a call-log and a contact provider",
                ))
            }
        };
        debug!(history = history.is_some(), "dialer built");

        Ok(Arc::new(DialerManager::new(session, history, events, self.config)))
    }
}
