//! Error Taxonomy Tests
//!
//! Three things can go wrong at submit time: a duplicate run start, a
//! malformed document, or a factory failure. Everything else is a silent
//! drop, never an error.

use manifold::{DocumentKind, RouterError, Uid};
use serde_json::json;

use crate::*;

// =============================================================================
// DUPLICATE RUN
// =============================================================================

#[test]
fn test_second_start_for_a_live_run_is_rejected() {
    let (router, _log) = router_with_tags(&["a"]);

    router.submit(&start("r1")).unwrap();
    let err = router.submit(&start("r1")).unwrap_err();

    assert!(matches!(err, RouterError::DuplicateRun { ref uid } if uid.as_str() == "r1"));
    assert_eq!(err.to_string(), "duplicate run start: r1");
}

#[test]
fn test_rejected_duplicate_leaves_the_original_untouched() {
    let calls = Arc::new(Mutex::new(0usize));
    let calls_in = Arc::clone(&calls);
    let log = new_log();
    let log_in = Arc::clone(&log);
    let router = RunRouter::builder()
        .factory(move |_start: &RunStart| -> FactoryResult {
            *calls_in.lock() += 1;
            Ok(Some(Box::new(Recorder::new("a", &log_in))))
        })
        .build();

    router.submit(&start("r1")).unwrap();
    router.submit(&start("r1")).unwrap_err();

    // Factories were not consulted for the rejected duplicate.
    assert_eq!(*calls.lock(), 1);

    // The original registration still routes.
    router.submit(&descriptor("d1", "r1")).unwrap();
    router.submit(&event("d1", 1)).unwrap();
    assert_eq!(entries(&log), vec!["a:start", "a:descriptor", "a:event"]);
}

// =============================================================================
// MALFORMED DOCUMENTS
// =============================================================================

#[test]
fn test_each_kind_rejects_its_missing_required_field() {
    let cases = [
        (DocumentKind::Start, json!({ "time": 0.0 })),
        (DocumentKind::Descriptor, json!({ "uid": "d1" })),
        (DocumentKind::Resource, json!({ "uid": "res1" })),
        (DocumentKind::Event, json!({ "seq_num": 1, "data": {} })),
        (
            DocumentKind::BulkEvent,
            json!({ "descriptor": "d1", "events": [{ "descriptor": "", "seq_num": 1 }] }),
        ),
        (DocumentKind::Datum, json!({ "datum_kwargs": {} })),
        (
            DocumentKind::BulkDatum,
            json!({ "resource": "res1", "datums": [{ "resource": "" }] }),
        ),
        (DocumentKind::Stop, json!({ "exit_status": "success" })),
    ];

    for (kind, value) in cases {
        let err = Document::from_json(kind, value).unwrap_err();
        assert!(
            matches!(err, RouterError::MalformedDocument { kind: k, .. } if k == kind),
            "wrong error for {}: {}",
            kind,
            err
        );
    }
}

#[test]
fn test_empty_required_field_counts_as_missing() {
    let err = Document::from_json(DocumentKind::Event, json!({ "descriptor": "", "seq_num": 1 }))
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "malformed event document: missing required field `descriptor`"
    );
}

#[test]
fn test_malformed_document_is_rejected_before_any_delivery() {
    let (router, log) = router_with_tags(&["a"]);

    router.submit(&start("r1")).unwrap();
    router.submit(&descriptor("d1", "r1")).unwrap();
    let before = entries(&log).len();

    let malformed = Document::Event(Event::new("", 1));
    let err = router.submit(&malformed).unwrap_err();

    assert!(err.is_contract_violation());
    assert_eq!(entries(&log).len(), before);
    // Rejected is not dropped: the document never reached routing.
    assert_eq!(router.stats().documents_dropped, 0);
}

// =============================================================================
// FACTORY FAILURES
// =============================================================================

#[test]
fn test_factory_failure_aborts_the_whole_registration() {
    let (log, third_called) = (new_log(), Arc::new(Mutex::new(false)));
    let third_flag = Arc::clone(&third_called);
    let log_a = Arc::clone(&log);
    let log_c = Arc::clone(&log);
    let router = RunRouter::builder()
        .factory(move |_start: &RunStart| -> FactoryResult {
            Ok(Some(Box::new(Recorder::new("a", &log_a))))
        })
        .factory(|_start: &RunStart| -> FactoryResult { Err("detector offline".into()) })
        .factory(move |_start: &RunStart| -> FactoryResult {
            *third_flag.lock() = true;
            Ok(Some(Box::new(Recorder::new("c", &log_c))))
        })
        .build();

    let err = router.submit(&start("r1")).unwrap_err();

    assert!(err.is_factory_failure());
    assert!(matches!(
        err,
        RouterError::Factory { index: 1, ref run, .. } if run.as_str() == "r1"
    ));
    assert_eq!(
        err.to_string(),
        "factory 1 failed for run r1: detector offline"
    );

    // No partial registration: the run is unknown and nothing was delivered.
    assert!(!router.is_active(&Uid::from("r1")));
    assert!(entries(&log).is_empty());
    assert!(!*third_called.lock());
    assert_eq!(router.stats().runs_started, 0);

    // Later documents for the failed run drop like any unknown reference.
    router.submit(&descriptor("d1", "r1")).unwrap();
    assert_eq!(router.stats().documents_dropped, 1);
}

#[test]
fn test_factory_error_source_is_preserved() {
    let router = RunRouter::builder()
        .factory(|_start: &RunStart| -> FactoryResult { Err("no disk space".into()) })
        .build();

    let err = router.submit(&start("r1")).unwrap_err();
    let source = std::error::Error::source(&err).map(|s| s.to_string());

    assert_eq!(source.as_deref(), Some("no disk space"));
}
