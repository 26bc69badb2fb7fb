use std::fs;
use std::path::PathBuf;
use std::thread;

use chrono_tz::America::New_York;
use pumpsync_core::{
    CanonicalRecord, EntryCategory, EntryContext, EntryError, EntryNormalizer, NormalizerConfig,
    RawFields,
};
use serde_json::{json, Value};

fn fixture_records(name: &str) -> Vec<RawFields> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name);
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", path.display(), err));
    serde_json::from_str(&content).expect("fixture is a JSON array of objects")
}

fn fields(value: Value) -> RawFields {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn normalizer() -> EntryNormalizer {
    EntryNormalizer::new(NormalizerConfig::new(New_York))
}

#[test]
fn category_names_parse_back() {
    for category in EntryCategory::ALL {
        let parsed: EntryCategory = category.name().parse().expect("known category");
        assert_eq!(parsed, category);
    }
    assert_eq!("Stream_Basal".parse::<EntryCategory>().ok(), Some(EntryCategory::StreamBasal));
    let err = "pump".parse::<EntryCategory>().unwrap_err();
    assert!(err.to_string().contains("unknown entry category 'pump'"));
}

#[test]
fn stream_basal_without_delivery_type_is_rejected() {
    let records = fixture_records("stream_basal.json");
    let err = normalizer()
        .normalize(EntryCategory::StreamBasal, &records[0], &EntryContext::default())
        .unwrap_err();
    assert!(matches!(
        err,
        EntryError::MissingContext { name: "delivery_type", .. }
    ));
}

#[test]
fn dispatch_produces_matching_record_kind() {
    let records = fixture_records("stream_basal.json");
    let context = EntryContext::default().with_delivery_type("Profile");
    let record = normalizer()
        .normalize(EntryCategory::StreamBasal, &records[0], &context)
        .expect("normalized");

    assert!(matches!(record, CanonicalRecord::Basal(_)));
    assert_eq!(
        record.time().map(|t| t.to_rfc3339()).as_deref(),
        Some("2020-09-01T06:00:00-04:00")
    );

    let untyped = record.into_fields().expect("fields");
    assert_eq!(untyped.get("delivery_type"), Some(&json!("Profile")));
    assert_eq!(untyped.get("duration_mins"), Some(&json!(30.0)));
}

#[test]
fn export_basal_uses_context_duration() {
    let raw = fields(json!({ "EventDateTime": "2021-03-16T05:00:00", "BasalRate": 0.65 }));
    let context = EntryContext::default().with_duration_mins(15.0);
    let record = normalizer()
        .normalize(EntryCategory::ExportBasal, &raw, &context)
        .expect("normalized");

    match record {
        CanonicalRecord::Basal(entry) => {
            assert_eq!(entry.duration_mins, Some(15.0));
            assert_eq!(entry.delivery_type, "Unknown");
        }
        other => panic!("expected basal entry, got {other:?}"),
    }
}

#[test]
fn bolus_records_have_no_primary_time() {
    let records = fixture_records("bolus_export.json");
    let batch = normalizer()
        .normalize_batch(EntryCategory::Bolus, &records, &EntryContext::default())
        .expect("batch normalized");

    assert_eq!(batch.len(), 3);
    assert!(batch.iter().all(|record| record.time().is_none()));
}

#[test]
fn batch_reports_index_of_first_bad_record() {
    let records = vec![
        fields(json!({ "EventDateTime": "2021-03-16T00:29:00", "IOB": 1.2, "EventID": 81 })),
        fields(json!({ "EventDateTime": "2021-03-16T00:34:00", "IOB": 1.1, "EventID": 81 })),
        fields(json!({ "IOB": 1.0, "EventID": 81 })),
        fields(json!({ "IOB": 0.9 })),
    ];
    let err = normalizer()
        .normalize_batch(EntryCategory::Iob, &records, &EntryContext::default())
        .unwrap_err();

    assert_eq!(err.index, 2);
    assert!(matches!(
        err.source,
        EntryError::MissingField { field: "EventDateTime", .. }
    ));
}

#[test]
fn workers_can_share_one_configuration() {
    let normalizer = normalizer();
    let records = fixture_records("stream_basal.json");
    let context = EntryContext::default().with_delivery_type("Algorithm");

    let expected = normalizer
        .normalize_batch(EntryCategory::StreamBasal, &records, &context)
        .expect("sequential batch");

    let parallel: Vec<CanonicalRecord> = thread::scope(|scope| {
        let handles: Vec<_> = records
            .iter()
            .map(|record| {
                let context = &context;
                scope.spawn(move || {
                    normalizer
                        .normalize(EntryCategory::StreamBasal, record, context)
                        .expect("normalized on worker")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker finished"))
            .collect()
    });

    assert_eq!(parallel, expected);
}
