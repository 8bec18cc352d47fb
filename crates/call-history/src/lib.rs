//! # dialer-call-history
//!
//! Reconciles the platform call log with the dialer's own history store.
//!
//! The platform log holds one row per call, with numbers spelled however they
//! were dialled. The dialer shows one row per number: the most recent call,
//! with the current contact name. This crate turns the former into the latter.
//!
//! ## Pieces
//!
//! - [`NumberNormalizer`] / [`PhoneNumberKey`]: canonical matching key for a number
//! - [`CallHistoryMerger`]: pure, idempotent merge of raw rows against a contact lookup
//! - [`CallLogProvider`] / [`ContactProvider`]: read-only platform sources
//! - [`CallHistoryStore`]: keyed durable store with a change stream
//!   ([`MemoryCallHistoryStore`], and [`SqliteCallHistoryStore`] with the
//!   `persistence` feature)
//! - [`CallHistorySync`]: single-writer sync pass tying it all together
//!
//! ## Example
//!
//! ```rust
//! use dialer_call_history::{CallHistoryMerger, CallType, ContactEntry, RawCallRecord};
//!
//! let merger = CallHistoryMerger::default();
//! let lookup = merger.build_lookup(&[ContactEntry::new("555-1234", Some("Alex".into()), None)]);
//! let merged = merger.merge(
//!     &[
//!         RawCallRecord::new("5551234", CallType::Incoming, 100),
//!         RawCallRecord::new("5551234", CallType::Outgoing, 200),
//!     ],
//!     &lookup,
//! );
//!
//! assert_eq!(merged.len(), 1);
//! assert_eq!(merged[0].timestamp_ms, 200);
//! assert_eq!(merged[0].display_name.as_deref(), Some("Alex"));
//! ```

pub mod config;
pub mod error;
pub mod merge;
pub mod number;
pub mod provider;
pub mod record;
pub mod recovery;
pub mod store;
pub mod sync;

pub use config::{HistoryConfig, NumberKeyConfig};
pub use error::{HistoryError, HistoryResult};
pub use merge::{CallHistoryMerger, ContactLookup};
pub use number::{NumberNormalizer, PhoneNumberKey};
pub use provider::{CallLogProvider, ContactProvider};
pub use record::{CallRecord, CallType, ContactEntry, ContactInfo, RawCallRecord};
pub use store::{CallHistoryStore, MemoryCallHistoryStore};
#[cfg(feature = "persistence")]
pub use store::SqliteCallHistoryStore;
pub use sync::{CallHistorySync, SyncReport};
