//! Property tests for the call-history merge

use std::collections::HashSet;

use proptest::prelude::*;

use dialer_call_history::{
    CallHistoryMerger, CallType, ContactEntry, ContactLookup, NumberNormalizer, RawCallRecord,
};

const NUMBERS: &[&str] = &[
    "5551234",
    "555-1234",
    "+91 98450 12345",
    "9845012345",
    "0044 20 7946 0123",
    "Private",
    "",
];

fn raw_record() -> impl Strategy<Value = RawCallRecord> {
    (
        prop::sample::select(NUMBERS),
        1..=8i32,
        0..40i64,
        0..600u64,
    )
        .prop_map(|(number, code, ts, duration)| {
            RawCallRecord::new(number, CallType::from_code(code), ts).with_duration(duration)
        })
}

fn lookup() -> impl Strategy<Value = ContactLookup> {
    prop::collection::vec(
        (
            prop::sample::select(NUMBERS),
            prop::option::of(prop::sample::select(&["Alex B", "Kim", "  "][..])),
            prop::option::of(prop::sample::select(&["content://photo/1", "content://photo/2"][..])),
        ),
        0..4,
    )
    .prop_map(|entries| {
        let contacts: Vec<_> = entries
            .into_iter()
            .map(|(number, name, photo)| {
                ContactEntry::new(number, name.map(str::to_string), photo.map(str::to_string))
            })
            .collect();
        CallHistoryMerger::default().build_lookup(&contacts)
    })
}

proptest! {
    #[test]
    fn test_merge_is_idempotent(batch in prop::collection::vec(raw_record(), 0..24), lookup in lookup()) {
        let merger = CallHistoryMerger::default();
        let once = merger.merge(&batch, &lookup);
        let as_raw: Vec<RawCallRecord> = once.iter().cloned().map(RawCallRecord::from).collect();
        let twice = merger.merge(&as_raw, &lookup);
        prop_assert_eq!(&twice, &once);

        let doubled: Vec<RawCallRecord> = batch.iter().chain(batch.iter()).cloned().collect();
        prop_assert_eq!(merger.merge(&doubled, &lookup), once);
    }

    #[test]
    fn test_one_record_per_key_newest_first(batch in prop::collection::vec(raw_record(), 0..24)) {
        let merger = CallHistoryMerger::default();
        let merged = merger.merge(&batch, &ContactLookup::new());

        let keys: HashSet<_> = merged.iter().map(|r| r.number.clone()).collect();
        prop_assert_eq!(keys.len(), merged.len());
        prop_assert!(merged.windows(2).all(|w| w[0].timestamp_ms >= w[1].timestamp_ms));

        let normalizer = NumberNormalizer::default();
        for record in &merged {
            let newest = batch
                .iter()
                .filter(|raw| normalizer.key(&raw.number).as_ref() == Some(&record.number))
                .map(|raw| raw.timestamp_ms)
                .max();
            prop_assert_eq!(newest, Some(record.timestamp_ms));
        }
    }

    #[test]
    fn test_named_numbers_stay_named(batch in prop::collection::vec(raw_record(), 0..24), lookup in lookup()) {
        let merger = CallHistoryMerger::default();
        let merged = merger.merge(&batch, &lookup);

        for record in &merged {
            let contact = lookup.get(&record.number);
            prop_assert_eq!(&record.display_name, &contact.and_then(|c| c.display_name.clone()));
            prop_assert_eq!(&record.photo, &contact.and_then(|c| c.photo.clone()));
        }

        // Stored records fed back keep their names while the contact exists
        let as_raw: Vec<RawCallRecord> = merged.iter().cloned().map(RawCallRecord::from).collect();
        for record in merger.merge(&as_raw, &lookup) {
            let named = lookup.get(&record.number).is_some_and(|c| c.display_name.is_some());
            prop_assert_eq!(record.has_name(), named);
        }
    }
}

#[test]
fn test_renamed_contact_shows_current_name() {
    let merger = CallHistoryMerger::default();
    let batch = vec![
        RawCallRecord::new("5551234", CallType::Incoming, 100),
        RawCallRecord::new("555 1234", CallType::Outgoing, 200),
    ];
    let before = merger.build_lookup(&[ContactEntry::new("5551234", Some("Alex".to_string()), None)]);
    let stored = merger.merge(&batch, &before);
    assert_eq!(stored[0].display_name.as_deref(), Some("Alex"));

    let after = merger.build_lookup(&[ContactEntry::new("555-1234", Some("Alex Kim".to_string()), None)]);
    let as_raw: Vec<RawCallRecord> = stored.into_iter().map(RawCallRecord::from).collect();
    let merged = merger.merge(&as_raw, &after);

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].timestamp_ms, 200);
    assert_eq!(merged[0].display_name.as_deref(), Some("Alex Kim"));
}

#[test]
fn test_contact_lookup_names_unnamed_calls() {
    let merger = CallHistoryMerger::default();
    let lookup = merger.build_lookup(&[ContactEntry::new("5551234", Some("Alex".to_string()), None)]);
    let batch = vec![
        RawCallRecord::new("5551234", CallType::Incoming, 100),
        RawCallRecord::new("5551234", CallType::Outgoing, 200),
    ];
    let merged = merger.merge(&batch, &lookup);

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].number.as_str(), "5551234");
    assert_eq!(merged[0].timestamp_ms, 200);
    assert_eq!(merged[0].call_type, CallType::Outgoing);
    assert_eq!(merged[0].display_name.as_deref(), Some("Alex"));
}
