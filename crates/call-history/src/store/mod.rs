//! Durable call-history stores
//!
//! The store holds at most one [`CallRecord`] per number. Only
//! [`CallHistorySync`](crate::sync::CallHistorySync) writes to it; readers
//! take a snapshot with [`load_all`](CallHistoryStore::load_all) or follow
//! [`changes`](CallHistoryStore::changes), which never block on a running
//! sync.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::HistoryResult;
use crate::record::CallRecord;

pub mod memory;
#[cfg(feature = "persistence")]
pub mod sqlite;

pub use memory::MemoryCallHistoryStore;
#[cfg(feature = "persistence")]
pub use sqlite::SqliteCallHistoryStore;

/// Keyed store of canonical call records
#[async_trait]
pub trait CallHistoryStore: Send + Sync {
    /// Insert or replace each record by its number key.
    ///
    /// All records become visible together; subscribers see one change.
    /// Returns the number of records written.
    async fn upsert_all(&self, records: &[CallRecord]) -> HistoryResult<usize>;

    /// Every stored record, newest first
    async fn load_all(&self) -> HistoryResult<Vec<CallRecord>>;

    /// Remove every record
    async fn clear(&self) -> HistoryResult<()>;

    /// Stream of full snapshots (newest first).
    ///
    /// The current content is yielded immediately, then once per completed write.
    fn changes(&self) -> BoxStream<'static, Vec<CallRecord>>;
}

/// Newest first, ties broken by number so snapshots are deterministic
pub(crate) fn sort_newest_first(records: &mut [CallRecord]) {
    records.sort_by(|a, b| {
        b.timestamp_ms
            .cmp(&a.timestamp_ms)
            .then_with(|| a.number.cmp(&b.number))
    });
}
