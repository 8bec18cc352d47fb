//! In-process store backed by a map and a watch channel

use std::collections::HashMap;

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use tokio::sync::{watch, RwLock};
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use super::{sort_newest_first, CallHistoryStore};
use crate::error::HistoryResult;
use crate::number::PhoneNumberKey;
use crate::record::CallRecord;

/// Call history kept in memory for the lifetime of the process
pub struct MemoryCallHistoryStore {
    records: RwLock<HashMap<PhoneNumberKey, CallRecord>>,
    snapshot: watch::Sender<Vec<CallRecord>>,
}

impl MemoryCallHistoryStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Vec::new());
        Self {
            records: RwLock::new(HashMap::new()),
            snapshot,
        }
    }

    /// Store pre-populated with `records` (later duplicates replace earlier ones)
    pub fn with_records(records: impl IntoIterator<Item = CallRecord>) -> Self {
        let map: HashMap<_, _> = records.into_iter().map(|r| (r.number.clone(), r)).collect();
        let (snapshot, _) = watch::channel(Self::sorted(&map));
        Self {
            records: RwLock::new(map),
            snapshot,
        }
    }

    fn sorted(map: &HashMap<PhoneNumberKey, CallRecord>) -> Vec<CallRecord> {
        let mut records: Vec<_> = map.values().cloned().collect();
        sort_newest_first(&mut records);
        records
    }
}

impl Default for MemoryCallHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CallHistoryStore for MemoryCallHistoryStore {
    async fn upsert_all(&self, records: &[CallRecord]) -> HistoryResult<usize> {
        let mut map = self.records.write().await;
        for record in records {
            map.insert(record.number.clone(), record.clone());
        }
        // Published while the write guard is held so snapshots follow write order
        self.snapshot.send_replace(Self::sorted(&map));
        debug!(written = records.len(), total = map.len(), "memory store updated");
        Ok(records.len())
    }

    async fn load_all(&self) -> HistoryResult<Vec<CallRecord>> {
        let map = self.records.read().await;
        Ok(Self::sorted(&map))
    }

    async fn clear(&self) -> HistoryResult<()> {
        let mut map = self.records.write().await;
        map.clear();
        self.snapshot.send_replace(Vec::new());
        Ok(())
    }

    fn changes(&self) -> BoxStream<'static, Vec<CallRecord>> {
        WatchStream::new(self.snapshot.subscribe()).boxed()
    }
}
