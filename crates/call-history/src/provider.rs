//! Read-only platform data sources
//!
//! The call log and the contact list belong to the platform. The history
//! sync only ever reads them; implementations typically wrap a platform
//! content query and convert each row.

use async_trait::async_trait;

use crate::error::HistoryResult;
use crate::record::{ContactEntry, RawCallRecord};

/// Source of raw call-log rows
#[async_trait]
pub trait CallLogProvider: Send + Sync {
    /// Most recent call-log rows, newest first.
    ///
    /// `window` caps the number of rows returned; `None` reads the whole log.
    async fn fetch_recent(&self, window: Option<usize>) -> HistoryResult<Vec<RawCallRecord>>;
}

/// Source of contact names and photos
#[async_trait]
pub trait ContactProvider: Send + Sync {
    /// Every contact phone number with its display name and photo
    async fn fetch_contacts(&self) -> HistoryResult<Vec<ContactEntry>>;
}
