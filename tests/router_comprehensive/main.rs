//! Router Comprehensive Test Suite
//!
//! End-to-end coverage of the document router through the public facade:
//! run lifecycle, index-driven fan-out, error taxonomy, cross-run
//! isolation, the bundled subscriber kit, and concurrent submission.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the whole suite
//! cargo test --test router_comprehensive
//!
//! # Run one area only
//! cargo test --test router_comprehensive lifecycle::
//! ```

use std::sync::Arc;

use manifold::{
    BulkDatum, BulkEvent, Datum, Descriptor, Document, Event, FactoryResult, Resource, RunRouter,
    RunStart, RunStop, Subscriber, SubscriberFactory,
};
use parking_lot::Mutex;
use serde_json::json;

pub mod errors;
pub mod isolation;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Shared append-only log of `tag:kind` delivery records
pub type DeliveryLog = Arc<Mutex<Vec<String>>>;

/// Create an empty delivery log
pub fn new_log() -> DeliveryLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Snapshot the delivery log
pub fn entries(log: &DeliveryLog) -> Vec<String> {
    log.lock().clone()
}

/// Subscriber that appends one `tag:kind` record per delivered document
pub struct Recorder {
    tag: String,
    log: DeliveryLog,
}

impl Recorder {
    pub fn new(tag: impl Into<String>, log: &DeliveryLog) -> Self {
        Recorder {
            tag: tag.into(),
            log: Arc::clone(log),
        }
    }
}

impl Subscriber for Recorder {
    fn handle(&mut self, doc: &Document) {
        self.log.lock().push(format!("{}:{}", self.tag, doc.kind()));
    }
}

/// Factory that attaches a [`Recorder`] with a fixed tag to every run
pub fn recording_factory(tag: &str, log: &DeliveryLog) -> impl SubscriberFactory {
    let tag = tag.to_string();
    let log = Arc::clone(log);
    move |_start: &RunStart| -> FactoryResult {
        Ok(Some(Box::new(Recorder::new(tag.clone(), &log))))
    }
}

/// Build a router with one recording factory per tag, all feeding one log
pub fn router_with_tags(tags: &[&str]) -> (RunRouter, DeliveryLog) {
    let log = new_log();
    let mut builder = RunRouter::builder();
    for tag in tags {
        builder = builder.factory(recording_factory(tag, &log));
    }
    (builder.build(), log)
}

// =============================================================================
// DOCUMENT CONSTRUCTORS
// =============================================================================

pub fn start(uid: &str) -> Document {
    Document::Start(RunStart::new(uid))
}

pub fn start_with_plan(uid: &str, plan: &str) -> Document {
    let mut doc = RunStart::new(uid);
    doc.plan_name = plan.to_string();
    Document::Start(doc)
}

pub fn descriptor(uid: &str, run: &str) -> Document {
    Document::Descriptor(Descriptor::new(uid, run))
}

pub fn resource(uid: &str, run: &str) -> Document {
    Document::Resource(Resource::new(uid, run))
}

pub fn event(desc: &str, seq_num: u64) -> Document {
    Document::Event(Event::new(desc, seq_num))
}

/// Event carrying one numeric data field
pub fn event_with(desc: &str, seq_num: u64, field: &str, value: f64) -> Document {
    let mut doc = Event::new(desc, seq_num);
    doc.data.insert(field.to_string(), json!(value));
    Document::Event(doc)
}

pub fn bulk_event(desc: &str, count: u64) -> Document {
    let mut doc = BulkEvent::new(desc);
    doc.events = (1..=count).map(|seq| Event::new(desc, seq)).collect();
    Document::BulkEvent(doc)
}

pub fn datum(res: &str) -> Document {
    Document::Datum(Datum::new(res))
}

pub fn bulk_datum(res: &str, count: usize) -> Document {
    let mut doc = BulkDatum::new(res);
    doc.datums = (0..count).map(|_| Datum::new(res)).collect();
    Document::BulkDatum(doc)
}

pub fn stop(run: &str) -> Document {
    Document::Stop(RunStop::new(run))
}

pub fn stop_with_status(run: &str, status: &str) -> Document {
    let mut doc = RunStop::new(run);
    doc.exit_status = status.to_string();
    Document::Stop(doc)
}
