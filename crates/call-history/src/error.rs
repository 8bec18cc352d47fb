//! Error types for call-history operations
//!
//! Sync failures are returned to whoever triggered the sync. Nothing in this
//! crate retries: a failed sync leaves the store at its last written state and
//! the next natural trigger (call ended, screen resumed) runs it again.
//!
//! ```rust
//! use dialer_call_history::HistoryError;
//!
//! let err = HistoryError::provider_read_failed("call_log", "cursor closed");
//! assert_eq!(err.category(), "provider");
//! assert!(err.is_recoverable());
//! ```

use thiserror::Error;

/// Result type alias for call-history operations
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Errors raised while reading providers or touching the durable store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// A read-only provider (call log or contacts) failed
    #[error("Provider read failed ({provider}): {reason}")]
    ProviderReadFailed { provider: String, reason: String },

    #[error("Store write failed: {reason}")]
    StoreWriteFailed { reason: String },

    #[error("Store read failed: {reason}")]
    StoreReadFailed { reason: String },

    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("Operation {operation} timed out after {duration_ms}ms")]
    OperationTimeout { operation: String, duration_ms: u64 },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl HistoryError {
    /// Create a provider read error
    pub fn provider_read_failed(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProviderReadFailed {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Create a store write error
    pub fn store_write_failed(reason: impl Into<String>) -> Self {
        Self::StoreWriteFailed { reason: reason.into() }
    }

    /// Create a store read error
    pub fn store_read_failed(reason: impl Into<String>) -> Self {
        Self::StoreReadFailed { reason: reason.into() }
    }

    /// Create a configuration error
    pub fn invalid_configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether a later sync has a reasonable chance of succeeding
    pub fn is_recoverable(&self) -> bool {
        match self {
            HistoryError::ProviderReadFailed { .. }
            | HistoryError::StoreWriteFailed { .. }
            | HistoryError::StoreReadFailed { .. }
            | HistoryError::OperationTimeout { .. } => true,

            HistoryError::InvalidConfiguration { .. } | HistoryError::InternalError { .. } => false,
        }
    }

    /// Get error category for metrics/logging
    pub fn category(&self) -> &'static str {
        match self {
            HistoryError::ProviderReadFailed { .. } => "provider",
            HistoryError::StoreWriteFailed { .. } | HistoryError::StoreReadFailed { .. } => "store",
            HistoryError::InvalidConfiguration { .. } => "configuration",
            HistoryError::OperationTimeout { .. } | HistoryError::InternalError { .. } => "system",
        }
    }
}

#[cfg(feature = "persistence")]
impl From<sqlx::Error> for HistoryError {
    fn from(err: sqlx::Error) -> Self {
        HistoryError::StoreWriteFailed { reason: err.to_string() }
    }
}
