//! Shared fixtures for call-history integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;

use dialer_call_history::{
    CallHistoryStore, CallLogProvider, CallRecord, ContactEntry, ContactProvider, HistoryError,
    HistoryResult, MemoryCallHistoryStore, RawCallRecord,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Call log returning a configurable batch, optionally slowly or failing
#[derive(Default)]
pub struct MockCallLog {
    records: Mutex<Vec<RawCallRecord>>,
    fail_with: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,
    pub requested_windows: Mutex<Vec<Option<usize>>>,
}

impl MockCallLog {
    pub fn with_records(records: Vec<RawCallRecord>) -> Arc<Self> {
        let log = Self::default();
        *log.records.lock().unwrap() = records;
        Arc::new(log)
    }

    pub fn set_records(&self, records: Vec<RawCallRecord>) {
        *self.records.lock().unwrap() = records;
    }

    pub fn fail(&self, reason: &str) {
        *self.fail_with.lock().unwrap() = Some(reason.to_string());
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }
}

#[async_trait]
impl CallLogProvider for MockCallLog {
    async fn fetch_recent(&self, window: Option<usize>) -> HistoryResult<Vec<RawCallRecord>> {
        self.requested_windows.lock().unwrap().push(window);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = self.fail_with.lock().unwrap().clone() {
            return Err(HistoryError::provider_read_failed("call_log", reason));
        }
        let records = self.records.lock().unwrap().clone();
        Ok(match window {
            Some(limit) => records.into_iter().take(limit).collect(),
            None => records,
        })
    }
}

#[derive(Default)]
pub struct MockContacts {
    contacts: Mutex<Vec<ContactEntry>>,
    pub fetches: AtomicUsize,
}

impl MockContacts {
    pub fn with_contacts(contacts: Vec<ContactEntry>) -> Arc<Self> {
        let provider = Self::default();
        *provider.contacts.lock().unwrap() = contacts;
        Arc::new(provider)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContactProvider for MockContacts {
    async fn fetch_contacts(&self) -> HistoryResult<Vec<ContactEntry>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.contacts.lock().unwrap().clone())
    }
}

/// Store wrapper that records writes and checks that none overlap
pub struct TrackingStore {
    inner: MemoryCallHistoryStore,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub writes: AtomicUsize,
    write_delay: Duration,
    fail_writes: bool,
}

impl TrackingStore {
    pub fn new(write_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryCallHistoryStore::new(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            write_delay,
            fail_writes: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryCallHistoryStore::new(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            write_delay: Duration::ZERO,
            fail_writes: true,
        })
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CallHistoryStore for TrackingStore {
    async fn upsert_all(&self, records: &[CallRecord]) -> HistoryResult<usize> {
        if self.fail_writes {
            return Err(HistoryError::store_write_failed("disk full"));
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.write_delay).await;
        let result = self.inner.upsert_all(records).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.writes.fetch_add(1, Ordering::SeqCst);
        result
    }

    async fn load_all(&self) -> HistoryResult<Vec<CallRecord>> {
        self.inner.load_all().await
    }

    async fn clear(&self) -> HistoryResult<()> {
        self.inner.clear().await
    }

    fn changes(&self) -> BoxStream<'static, Vec<CallRecord>> {
        self.inner.changes()
    }
}
