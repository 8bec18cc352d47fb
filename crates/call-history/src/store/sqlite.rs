//! SQLite store (`persistence` feature)
//!
//! One `recent_calls` row per number key. A batch is written inside a single
//! transaction with `ON CONFLICT(number) DO UPDATE`, so readers see either
//! the whole batch or none of it.

use std::str::FromStr;

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info};

use super::CallHistoryStore;
use crate::error::{HistoryError, HistoryResult};
use crate::number::PhoneNumberKey;
use crate::record::{CallRecord, CallType};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS recent_calls (
    number       TEXT PRIMARY KEY NOT NULL,
    name         TEXT,
    photo        TEXT,
    call_type    INTEGER NOT NULL,
    date         INTEGER NOT NULL,
    duration_sec INTEGER NOT NULL
)";

const UPSERT: &str = "INSERT INTO recent_calls (number, name, photo, call_type, date, duration_sec)
    VALUES ($1, $2, $3, $4, $5, $6)
    ON CONFLICT(number) DO UPDATE SET
        name = excluded.name,
        photo = excluded.photo,
        call_type = excluded.call_type,
        date = excluded.date,
        duration_sec = excluded.duration_sec";

const SELECT_ALL: &str = "SELECT number, name, photo, call_type, date, duration_sec
    FROM recent_calls
    ORDER BY date DESC, number ASC";

#[derive(sqlx::FromRow, Debug)]
struct RecentCallRow {
    number: String,
    name: Option<String>,
    photo: Option<String>,
    call_type: i64,
    date: i64,
    duration_sec: i64,
}

impl From<RecentCallRow> for CallRecord {
    fn from(row: RecentCallRow) -> Self {
        CallRecord {
            number: PhoneNumberKey::from_canonical(row.number),
            display_name: row.name,
            call_type: i32::try_from(row.call_type).map_or(CallType::Other(i32::MAX), CallType::from_code),
            timestamp_ms: row.date,
            duration_secs: row.duration_sec.max(0) as u64,
            photo: row.photo,
        }
    }
}

/// Call history persisted in a SQLite database
pub struct SqliteCallHistoryStore {
    pool: SqlitePool,
    snapshot: watch::Sender<Vec<CallRecord>>,
}

impl SqliteCallHistoryStore {
    /// Open (creating if needed) the database at `database_url`,
    /// e.g. `sqlite:///data/dialer/history.db` or `sqlite::memory:`
    pub async fn open(database_url: &str) -> HistoryResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| HistoryError::invalid_configuration("database_url", e.to_string()))?
            .create_if_missing(true);

        // A single long-lived connection keeps `sqlite::memory:` databases alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| HistoryError::store_read_failed(format!("open {database_url}: {e}")))?;

        sqlx::query(CREATE_TABLE).execute(&pool).await?;

        let (snapshot, _) = watch::channel(Vec::new());
        let store = Self { pool, snapshot };
        let existing = store.load_all().await?;
        info!(database_url, records = existing.len(), "call history store opened");
        store.snapshot.send_replace(existing);
        Ok(store)
    }

    /// Private in-memory database
    pub async fn in_memory() -> HistoryResult<Self> {
        Self::open("sqlite::memory:").await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl CallHistoryStore for SqliteCallHistoryStore {
    async fn upsert_all(&self, records: &[CallRecord]) -> HistoryResult<usize> {
        let mut tx = self.pool.begin().await?;
        for record in records {
            sqlx::query(UPSERT)
                .bind(record.number.as_str())
                .bind(record.display_name.as_deref())
                .bind(record.photo.as_deref())
                .bind(i64::from(record.call_type.code()))
                .bind(record.timestamp_ms)
                .bind(i64::try_from(record.duration_secs).unwrap_or(i64::MAX))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        let snapshot = self.load_all().await?;
        debug!(written = records.len(), total = snapshot.len(), "sqlite store updated");
        self.snapshot.send_replace(snapshot);
        Ok(records.len())
    }

    async fn load_all(&self) -> HistoryResult<Vec<CallRecord>> {
        let rows: Vec<RecentCallRow> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| HistoryError::store_read_failed(e.to_string()))?;
        Ok(rows.into_iter().map(CallRecord::from).collect())
    }

    async fn clear(&self) -> HistoryResult<()> {
        sqlx::query("DELETE FROM recent_calls").execute(&self.pool).await?;
        self.snapshot.send_replace(Vec::new());
        Ok(())
    }

    fn changes(&self) -> BoxStream<'static, Vec<CallRecord>> {
        WatchStream::new(self.snapshot.subscribe()).boxed()
    }
}
