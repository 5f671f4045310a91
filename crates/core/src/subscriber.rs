//! Subscriber and factory contracts
//!
//! Subscribers never talk to the document source directly: the router calls
//! them. A [`SubscriberFactory`] decides at run-start time whether a run is
//! interesting; the [`Subscriber`] it returns then receives every document
//! of that run until the run stops.

use crate::document::{
    BulkDatum, BulkEvent, Datum, Descriptor, Document, Event, Resource, RunStart, RunStop,
};
use crate::error::FactoryError;

/// Per-run consumer of forwarded documents.
///
/// Visitor-style: one strongly-typed method per document kind, dispatched by
/// the document's tag, never by runtime type inspection. Every hook defaults
/// to a no-op so implementations override only the kinds they care about.
///
/// ## Contract
///
/// - The router calls exactly the hook matching the forwarded document's
///   kind, in run-stream order: `on_start` first, `on_stop` at most once and
///   last.
/// - Calls are synchronous and made under the router's lock; a slow hook
///   blocks the producing stream. That is the intended backpressure path.
/// - Hooks must not call back into the router that owns this subscriber.
/// - Hooks have no error channel. A subscriber that cannot handle a document
///   should log and move on; per-run state it keeps is dropped with it after
///   `on_stop`.
pub trait Subscriber: Send {
    /// The run this subscriber was created for has started
    fn on_start(&mut self, _doc: &RunStart) {}

    /// An event stream was declared within the run
    fn on_descriptor(&mut self, _doc: &Descriptor) {}

    /// An external asset was declared within the run
    fn on_resource(&mut self, _doc: &Resource) {}

    /// One measurement row arrived
    fn on_event(&mut self, _doc: &Event) {}

    /// A batch of measurement rows arrived
    fn on_bulk_event(&mut self, _doc: &BulkEvent) {}

    /// One resource pointer arrived
    fn on_datum(&mut self, _doc: &Datum) {}

    /// A batch of resource pointers arrived
    fn on_bulk_datum(&mut self, _doc: &BulkDatum) {}

    /// The run has ended; this is the final call for this subscriber
    fn on_stop(&mut self, _doc: &RunStop) {}

    /// Dispatch a document to the hook matching its kind
    fn handle(&mut self, doc: &Document) {
        match doc {
            Document::Start(d) => self.on_start(d),
            Document::Descriptor(d) => self.on_descriptor(d),
            Document::Resource(d) => self.on_resource(d),
            Document::Event(d) => self.on_event(d),
            Document::BulkEvent(d) => self.on_bulk_event(d),
            Document::Datum(d) => self.on_datum(d),
            Document::BulkDatum(d) => self.on_bulk_datum(d),
            Document::Stop(d) => self.on_stop(d),
        }
    }
}

/// What a factory returns: not interested, a fresh subscriber, or a failure
pub type FactoryResult = Result<Option<Box<dyn Subscriber>>, FactoryError>;

/// Decides, per run, whether and how to subscribe.
///
/// ## Contract
///
/// - Called once per accepted start document, in registration order.
/// - `Ok(None)` means "not interested in this run"; `Ok(Some(subscriber))`
///   hands the router a subscriber that will receive every document of the
///   run; `Err` aborts registration of the run (no subscriber set is kept).
/// - May inspect any field of the start document to decide (plan name,
///   detector list, anything in `extra`).
/// - Must not mutate router state or call back into the router; the router's
///   lock is held for the duration of the call.
///
/// Any `Fn(&RunStart) -> FactoryResult + Send + Sync` closure is a factory.
pub trait SubscriberFactory: Send + Sync {
    /// Inspect a start document and optionally produce a subscriber for the run
    fn subscribe(&self, start: &RunStart) -> FactoryResult;
}

impl<F> SubscriberFactory for F
where
    F: Fn(&RunStart) -> FactoryResult + Send + Sync,
{
    fn subscribe(&self, start: &RunStart) -> FactoryResult {
        self(start)
    }
}
