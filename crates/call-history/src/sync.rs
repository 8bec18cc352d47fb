//! One call-history synchronization pass
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use dialer_call_history::*;
//! # async fn example(
//! #     call_log: Arc<dyn CallLogProvider>,
//! #     contacts: Arc<dyn ContactProvider>,
//! # ) -> HistoryResult<()> {
//! let store = Arc::new(MemoryCallHistoryStore::new());
//! let sync = CallHistorySync::new(call_log, contacts, store.clone(), HistoryConfig::default())?;
//!
//! let report = sync.sync().await?;
//! println!("merged {} numbers from {} rows", report.merged, report.raw_records);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::HistoryConfig;
use crate::error::HistoryResult;
use crate::merge::CallHistoryMerger;
use crate::number::NumberNormalizer;
use crate::provider::{CallLogProvider, ContactProvider};
use crate::recovery::with_timeout;
use crate::store::CallHistoryStore;

/// Outcome of a completed sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Raw call-log rows read
    pub raw_records: usize,
    /// Contacts that contributed a name or photo
    pub contacts: usize,
    /// Distinct numbers after merging
    pub merged: usize,
    /// Records written to the store (0 when the batch was empty)
    pub written: usize,
    pub elapsed: Duration,
}

/// Pulls the platform call log into the durable store.
///
/// Only one pass runs at a time: a second caller waits for the in-flight
/// pass to finish, then runs its own against the updated store.
pub struct CallHistorySync {
    call_log: Arc<dyn CallLogProvider>,
    contacts: Arc<dyn ContactProvider>,
    store: Arc<dyn CallHistoryStore>,
    merger: CallHistoryMerger,
    config: HistoryConfig,
    write_lock: Mutex<()>,
}

impl CallHistorySync {
    pub fn new(
        call_log: Arc<dyn CallLogProvider>,
        contacts: Arc<dyn ContactProvider>,
        store: Arc<dyn CallHistoryStore>,
        config: HistoryConfig,
    ) -> HistoryResult<Self> {
        config.validate()?;
        let merger = CallHistoryMerger::new(NumberNormalizer::new(config.number_key.clone()));
        Ok(Self {
            call_log,
            contacts,
            store,
            merger,
            config,
            write_lock: Mutex::new(()),
        })
    }

    /// Store this sync writes to; hand it to readers for `changes()`
    pub fn store(&self) -> Arc<dyn CallHistoryStore> {
        Arc::clone(&self.store)
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Run one pass: read contacts and the recent call log, merge, upsert.
    ///
    /// An empty merge result leaves the store untouched. Errors are returned
    /// as-is; nothing here retries.
    pub async fn sync(&self) -> HistoryResult<SyncReport> {
        let _guard = self.write_lock.lock().await;
        let started = Instant::now();
        let timeout = self.config.provider_timeout();

        let contacts = with_timeout("fetch_contacts", timeout, self.contacts.fetch_contacts()).await?;
        let lookup = self.merger.build_lookup(&contacts);
        debug!(contacts = contacts.len(), lookup = lookup.len(), "contact lookup built");

        let raw = with_timeout(
            "fetch_recent_calls",
            timeout,
            self.call_log.fetch_recent(self.config.window),
        )
        .await?;

        let merged = self.merger.merge(&raw, &lookup);

        let written = if merged.is_empty() {
            if !raw.is_empty() {
                warn!(raw_records = raw.len(), "no call record had a usable number");
            }
            debug!("empty batch, store left untouched");
            0
        } else {
            self.store.upsert_all(&merged).await?
        };

        let report = SyncReport {
            raw_records: raw.len(),
            contacts: lookup.len(),
            merged: merged.len(),
            written,
            elapsed: started.elapsed(),
        };
        info!(
            raw_records = report.raw_records,
            merged = report.merged,
            written = report.written,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "call history synced"
        );
        Ok(report)
    }
}
