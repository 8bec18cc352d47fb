//! Call-history reconciliation
//!
//! [`CallHistoryMerger::merge`] folds a batch of raw call-log rows into one
//! [`CallRecord`] per canonical number:
//!
//! - the first row seen for a number is inserted with its name and photo
//!   taken from the contact lookup only
//! - a row with a strictly newer timestamp replaces the entry, but never
//!   turns a named entry back into an unnamed one
//! - an older or equal row only backfills a missing name or photo
//!
//! The result is sorted newest first. Merging is idempotent, so feeding the
//! output back in (or the same batch twice) yields the same records.

use std::collections::HashMap;

use tracing::trace;

use crate::number::{NumberNormalizer, PhoneNumberKey};
use crate::record::{non_blank, CallRecord, ContactEntry, ContactInfo, RawCallRecord};

/// Number → (name, photo) table built from one pass over the contacts
pub type ContactLookup = HashMap<PhoneNumberKey, ContactInfo>;

/// Pure merge of raw call records into canonical history
#[derive(Debug, Clone, Default)]
pub struct CallHistoryMerger {
    normalizer: NumberNormalizer,
}

impl CallHistoryMerger {
    pub fn new(normalizer: NumberNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &NumberNormalizer {
        &self.normalizer
    }

    /// Build the lookup table used by [`merge`](Self::merge).
    ///
    /// Contacts with a blank number, or with neither name nor photo, are
    /// left out. When several contacts share a key the first name wins and
    /// a later entry may only fill a missing photo.
    pub fn build_lookup(&self, contacts: &[ContactEntry]) -> ContactLookup {
        let mut lookup = ContactLookup::with_capacity(contacts.len());
        for contact in contacts {
            let Some(key) = self.normalizer.key(&contact.number) else {
                continue;
            };
            let display_name = non_blank(contact.display_name.as_deref());
            let photo = non_blank(contact.photo.as_deref());
            if display_name.is_none() && photo.is_none() {
                continue;
            }

            let entry = lookup.entry(key).or_default();
            if entry.display_name.is_none() {
                entry.display_name = display_name;
            }
            if entry.photo.is_none() {
                entry.photo = photo;
            }
        }
        lookup
    }

    /// Merge `records` against `lookup`, newest first
    pub fn merge(&self, records: &[RawCallRecord], lookup: &ContactLookup) -> Vec<CallRecord> {
        let mut merged: Vec<CallRecord> = Vec::new();
        let mut index: HashMap<PhoneNumberKey, usize> = HashMap::new();

        for raw in records {
            let Some(key) = self.normalizer.key(&raw.number) else {
                trace!(timestamp_ms = raw.timestamp_ms, "skipping call record without a number");
                continue;
            };

            let ContactInfo { display_name, photo } = lookup.get(&key).cloned().unwrap_or_default();

            match index.get(&key) {
                None => {
                    index.insert(key.clone(), merged.len());
                    merged.push(CallRecord {
                        number: key,
                        display_name,
                        call_type: raw.call_type,
                        timestamp_ms: raw.timestamp_ms,
                        duration_secs: raw.duration_secs,
                        photo,
                    });
                }
                Some(&position) => {
                    let existing = &mut merged[position];
                    if raw.timestamp_ms > existing.timestamp_ms {
                        existing.call_type = raw.call_type;
                        existing.timestamp_ms = raw.timestamp_ms;
                        existing.duration_secs = raw.duration_secs;
                        if display_name.is_some() {
                            existing.display_name = display_name;
                        }
                        if photo.is_some() {
                            existing.photo = photo;
                        }
                    } else {
                        if existing.display_name.is_none() {
                            existing.display_name = display_name;
                        }
                        if existing.photo.is_none() {
                            existing.photo = photo;
                        }
                    }
                }
            }
        }

        // Stable: equal timestamps keep first-seen order
        merged.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
        merged
    }
}
