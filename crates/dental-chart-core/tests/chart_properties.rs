//! Property tests for notation, status conversion and chart coverage.

use std::collections::BTreeMap;

use dental_chart_core::backend::InMemoryBackend;
use dental_chart_core::chart::{from_fdi, is_valid_fdi, to_fdi, ToothChart};
use dental_chart_core::models::{RawStatus, TeethRecord, ToothStatus};
use proptest::prelude::*;

fn status_strategy() -> impl Strategy<Value = ToothStatus> {
    prop::sample::select(ToothStatus::ALL.to_vec())
}

fn raw_status_strategy() -> impl Strategy<Value = RawStatus> {
    prop_oneof![
        any::<i64>().prop_map(RawStatus::Code),
        any::<String>().prop_map(RawStatus::Text),
        status_strategy().prop_map(RawStatus::from),
        Just(RawStatus::Other(serde_json::json!({ "nested": true }))),
        Just(RawStatus::Other(serde_json::Value::Null)),
    ]
}

/// Subset of canonical teeth with a status each.
fn records_strategy() -> impl Strategy<Value = BTreeMap<u8, ToothStatus>> {
    prop::collection::btree_map(1u8..=32, status_strategy(), 0..=32)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn fdi_round_trip(n in 1u8..=32) {
        let fdi = to_fdi(n);
        prop_assert!(is_valid_fdi(fdi));
        prop_assert_eq!(from_fdi(fdi), n);
    }

    #[test]
    fn unmapped_fdi_passes_through(code in any::<u8>()) {
        prop_assume!(!is_valid_fdi(code));
        prop_assert_eq!(from_fdi(code), code);
    }

    #[test]
    fn status_conversion_is_total(raw in raw_status_strategy()) {
        let status = ToothStatus::from_raw(&raw);
        prop_assert!(ToothStatus::ALL.contains(&status));
    }

    #[test]
    fn status_names_and_codes_convert_back(status in status_strategy()) {
        prop_assert_eq!(ToothStatus::from_raw(&RawStatus::from(status)), status);
        prop_assert_eq!(ToothStatus::from_raw(&RawStatus::Code(status.code() as i64)), status);
        let upper = RawStatus::Text(status.name().to_uppercase());
        prop_assert_eq!(ToothStatus::from_raw(&upper), status);
    }

    #[test]
    fn chart_always_covers_every_tooth(records in records_strategy()) {
        let backend = InMemoryBackend::new();
        for (n, status) in &records {
            backend.insert(9, TeethRecord::new(*n as i64, *status));
        }

        let mut chart = ToothChart::new();
        chart.load_for_patient(&backend, 9).unwrap();

        let numbers: Vec<u8> = chart.entries().iter().map(|e| e.tooth_number).collect();
        prop_assert_eq!(numbers, (1..=32).collect::<Vec<u8>>());

        for entry in chart.entries() {
            let expected = records.get(&entry.tooth_number).copied().unwrap_or_default();
            prop_assert_eq!(entry.status, expected);
            prop_assert_eq!(entry.is_persisted(), records.contains_key(&entry.tooth_number));
        }
    }

    #[test]
    fn cancel_never_touches_chart(fdi in 11u8..=48, status in status_strategy()) {
        prop_assume!(is_valid_fdi(fdi));
        let backend = InMemoryBackend::new();
        let mut chart = ToothChart::new();
        chart.load_for_patient(&backend, 1).unwrap();
        let before: Vec<ToothStatus> = chart.entries().iter().map(|e| e.status).collect();

        chart.select_tooth(fdi).unwrap();
        chart.update_scratch_status(status).unwrap();
        chart.update_scratch_notes("scratch").unwrap();
        chart.cancel();

        let after: Vec<ToothStatus> = chart.entries().iter().map(|e| e.status).collect();
        prop_assert_eq!(before, after);
        prop_assert!(chart.entries().iter().all(|e| e.notes.is_none()));
    }
}
