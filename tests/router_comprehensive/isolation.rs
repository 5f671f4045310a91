//! Cross-Run Isolation Tests
//!
//! Several runs may interleave arbitrarily on one router. Nothing from one
//! run may reach another run's subscribers, and stopping one run must not
//! disturb the rest.

use manifold::{FactoryResult, RunStart, SubscriberFactory, Uid};
use proptest::prelude::*;
use proptest::test_runner::{Config as PropConfig, RngAlgorithm, TestRng, TestRunner};

use crate::*;

/// Factory that tags each recorder with the uid of the run it serves
fn per_run_recording_factory(log: &DeliveryLog) -> impl SubscriberFactory {
    let log = Arc::clone(log);
    move |start: &RunStart| -> FactoryResult {
        Ok(Some(Box::new(Recorder::new(start.uid.as_str(), &log))))
    }
}

/// Kinds delivered to `run`'s subscriber, in delivery order
fn kinds_for(log: &DeliveryLog, run: &str) -> Vec<String> {
    let prefix = format!("{}:", run);
    entries(log)
        .into_iter()
        .filter_map(|entry| entry.strip_prefix(&prefix).map(str::to_string))
        .collect()
}

/// The full document script of one run: start, one stream, `events` events
fn run_script(run: &str, desc: &str, events: u64) -> Vec<Document> {
    let mut docs = vec![start(run), descriptor(desc, run)];
    for seq in 1..=events {
        docs.push(event(desc, seq));
    }
    docs.push(stop(run));
    docs
}

// =============================================================================
// INTERLEAVED RUNS
// =============================================================================

#[test]
fn test_interleaved_runs_keep_their_streams_apart() {
    let log = new_log();
    let router = RunRouter::builder()
        .factory(per_run_recording_factory(&log))
        .build();

    router.submit(&start("alpha")).unwrap();
    router.submit(&start("beta")).unwrap();
    router.submit(&descriptor("d-alpha", "alpha")).unwrap();
    router.submit(&descriptor("d-beta", "beta")).unwrap();
    router.submit(&event("d-alpha", 1)).unwrap();
    router.submit(&event("d-beta", 1)).unwrap();
    router.submit(&event("d-alpha", 2)).unwrap();
    router.submit(&stop("alpha")).unwrap();
    router.submit(&event("d-beta", 2)).unwrap();
    router.submit(&stop("beta")).unwrap();

    assert_eq!(
        kinds_for(&log, "alpha"),
        vec!["start", "descriptor", "event", "event", "stop"]
    );
    assert_eq!(
        kinds_for(&log, "beta"),
        vec!["start", "descriptor", "event", "event", "stop"]
    );
    assert_eq!(router.stats().documents_dropped, 0);
}

#[test]
fn test_stop_purges_only_its_own_run() {
    let log = new_log();
    let router = RunRouter::builder()
        .factory(per_run_recording_factory(&log))
        .build();

    router.submit(&start("alpha")).unwrap();
    router.submit(&start("beta")).unwrap();
    router.submit(&descriptor("d-alpha", "alpha")).unwrap();
    router.submit(&descriptor("d-beta", "beta")).unwrap();
    router.submit(&stop("alpha")).unwrap();

    // alpha is gone; beta still routes.
    router.submit(&event("d-alpha", 1)).unwrap();
    router.submit(&event("d-beta", 1)).unwrap();

    assert!(!router.is_active(&Uid::from("alpha")));
    assert!(router.is_active(&Uid::from("beta")));
    assert_eq!(router.stats().documents_dropped, 1);
    assert_eq!(
        kinds_for(&log, "beta"),
        vec!["start", "descriptor", "event"]
    );
}

#[test]
fn test_purged_descriptor_uid_may_serve_a_later_run() {
    let log = new_log();
    let router = RunRouter::builder()
        .factory(per_run_recording_factory(&log))
        .build();

    router.submit(&start("alpha")).unwrap();
    router.submit(&descriptor("d1", "alpha")).unwrap();
    router.submit(&event("d1", 1)).unwrap();
    router.submit(&stop("alpha")).unwrap();

    // The purge freed "d1"; a later run may register it anew.
    router.submit(&start("beta")).unwrap();
    router.submit(&descriptor("d1", "beta")).unwrap();
    router.submit(&event("d1", 1)).unwrap();

    assert_eq!(
        kinds_for(&log, "alpha"),
        vec!["start", "descriptor", "event", "stop"]
    );
    assert_eq!(kinds_for(&log, "beta"), vec!["start", "descriptor", "event"]);
    assert_eq!(router.stats().documents_dropped, 0);
}

#[test]
fn test_round_robin_over_many_runs() {
    let log = new_log();
    let router = RunRouter::builder()
        .factory(per_run_recording_factory(&log))
        .build();

    let runs: Vec<String> = (0..5).map(|i| format!("run-{}", i)).collect();
    for run in &runs {
        router.submit(&start(run)).unwrap();
        router.submit(&descriptor(&format!("d-{}", run), run)).unwrap();
    }
    for seq in 1..=4 {
        for run in &runs {
            router.submit(&event(&format!("d-{}", run), seq)).unwrap();
        }
    }
    for run in &runs {
        router.submit(&stop(run)).unwrap();
    }

    for run in &runs {
        assert_eq!(
            kinds_for(&log, run),
            vec!["start", "descriptor", "event", "event", "event", "event", "stop"],
            "stream for {} leaked or lost documents",
            run
        );
    }
    assert!(router.active_runs().is_empty());
}

// =============================================================================
// PROPERTY: EVERY INTERLEAVING ISOLATES
// =============================================================================

// Pinned seed so failures reproduce across machines and CI. Override
// locally with PROPTEST_SEED when hunting a new case.
#[test]
fn proptest_seed_pinned_interleavings_preserve_isolation() {
    const SEED_BYTES: [u8; 32] = [
        0x5a, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0,
    ];

    let rng = TestRng::from_seed(RngAlgorithm::ChaCha, &SEED_BYTES);
    let mut runner = TestRunner::new_with_rng(PropConfig::default(), rng);

    // A schedule decides, at each step, which run advances next.
    let schedule = proptest::collection::vec(any::<bool>(), 0..24);

    runner
        .run(&schedule, |schedule| {
            let log = new_log();
            let router = RunRouter::builder()
                .factory(per_run_recording_factory(&log))
                .build();

            let scripts = [
                run_script("alpha", "d-alpha", 3),
                run_script("beta", "d-beta", 3),
            ];
            let mut cursors = [0usize, 0usize];
            let mut turns = schedule.into_iter();

            // Drain both scripts in schedule order; an exhausted script
            // cedes its turn to the other.
            while cursors[0] < scripts[0].len() || cursors[1] < scripts[1].len() {
                let mut pick = usize::from(!turns.next().unwrap_or(true));
                if cursors[pick] == scripts[pick].len() {
                    pick = 1 - pick;
                }
                router
                    .submit(&scripts[pick][cursors[pick]])
                    .expect("scripted documents are well-formed");
                cursors[pick] += 1;
            }

            let expected = vec!["start", "descriptor", "event", "event", "event", "stop"];
            prop_assert_eq!(kinds_for(&log, "alpha"), expected.clone());
            prop_assert_eq!(kinds_for(&log, "beta"), expected);
            prop_assert!(router.active_runs().is_empty());
            prop_assert_eq!(router.stats().documents_dropped, 0);
            Ok(())
        })
        .expect("every interleaving should preserve isolation");
}
