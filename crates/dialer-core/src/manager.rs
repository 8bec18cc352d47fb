//! Dialer facade
//!
//! [`DialerManager`] owns the [`CallSession`] and the optional
//! [`CallHistorySync`] and wires them together: one sync at start-up and one
//! each time a call ends. Sync failures from these triggers are logged and
//! published as [`DialerEvent::HistorySyncFailed`]; they are never retried.

use std::sync::{Arc, Mutex, PoisonError};

use dialer_call_history::{CallHistorySync, CallRecord, SyncReport};
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::call::CallState;
use crate::config::DialerConfig;
use crate::error::{DialerError, DialerResult};
use crate::events::{DialerEvent, EventEmitter, EventStream};
use crate::session::CallSession;

pub struct DialerManager {
    session: Arc<CallSession>,
    history: Option<Arc<CallHistorySync>>,
    events: EventEmitter,
    config: DialerConfig,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl DialerManager {
    /// Assemble a manager from parts; [`DialerBuilder`](crate::builder::DialerBuilder)
    /// is the usual way in.
    pub fn new(
        session: Arc<CallSession>,
        history: Option<Arc<CallHistorySync>>,
        events: EventEmitter,
        config: DialerConfig,
    ) -> Self {
        Self {
            session,
            history,
            events,
            config,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn session(&self) -> &Arc<CallSession> {
        &self.session
    }

    pub fn config(&self) -> &DialerConfig {
        &self.config
    }

    pub fn subscribe_events(&self) -> EventStream {
        self.events.subscribe()
    }

    pub fn events(&self) -> &EventEmitter {
        &self.events
    }

    /// Start the background sync triggers configured in [`DialerConfig`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let Some(history) = self.history.clone() else {
            debug!("no call history configured, sync triggers not started");
            return;
        };
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);

        if self.config.sync_on_start {
            let history = Arc::clone(&history);
            let events = self.events.clone();
            tasks.push(tokio::spawn(async move {
                let _ = sync_and_publish(&history, &events, "start-up").await;
            }));
        }

        if self.config.sync_on_call_end {
            // Every `Ended` counts, including one already replaced by `Idle`
            let mut receiver = self.events.receiver();
            let events = self.events.clone();
            tasks.push(tokio::spawn(async move {
                loop {
                    match receiver.recv().await {
                        Ok(DialerEvent::CallStateChanged {
                            current: CallState::Ended,
                            ..
                        }) => {
                            let _ = sync_and_publish(&history, &events, "call ended").await;
                        }
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "call-end watcher lagged behind events");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }));
        }
        info!(
            sync_on_start = self.config.sync_on_start,
            sync_on_call_end = self.config.sync_on_call_end,
            "dialer started"
        );
    }

    /// Stop the background sync triggers
    pub fn stop(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        for task in tasks.drain(..) {
            task.abort();
        }
        info!("dialer stopped");
    }

    /// Run a sync now and wait for it
    pub async fn sync_history(&self) -> DialerResult<SyncReport> {
        let history = self.history.as_ref().ok_or_else(|| {
            DialerError::invalid_configuration("history", "no call history providers configured")
        })?;
        Ok(sync_and_publish(history, &self.events, "manual").await?)
    }

    /// Stored call history, newest first
    pub async fn recent_calls(&self) -> DialerResult<Vec<CallRecord>> {
        match &self.history {
            Some(history) => Ok(history.store().load_all().await?),
            None => Ok(Vec::new()),
        }
    }

    /// Call history snapshots: the current content, then one per store write
    pub fn history_stream(&self) -> BoxStream<'static, Vec<CallRecord>> {
        match &self.history {
            Some(history) => history.store().changes(),
            None => stream::once(async { Vec::new() }).boxed(),
        }
    }
}

impl Drop for DialerManager {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().unwrap_or_else(PoisonError::into_inner);
        for task in tasks.drain(..) {
            task.abort();
        }
    }
}

async fn sync_and_publish(
    history: &CallHistorySync,
    events: &EventEmitter,
    trigger: &'static str,
) -> Result<SyncReport, dialer_call_history::HistoryError> {
    match history.sync().await {
        Ok(report) => {
            debug!(trigger, merged = report.merged, "history sync finished");
            events.emit(DialerEvent::HistorySynced { report: report.clone() });
            Ok(report)
        }
        Err(e) => {
            error!(trigger, error = %e, category = e.category(), "history sync failed");
            events.emit(DialerEvent::HistorySyncFailed { reason: e.to_string() });
            Err(e)
        }
    }
}
