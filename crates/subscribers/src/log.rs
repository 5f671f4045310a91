//! Logging subscriber

use manifold_core::{
    BulkDatum, BulkEvent, Datum, Descriptor, Event, FactoryResult, Resource, RunStart, RunStop,
    Subscriber, SubscriberFactory,
};

/// Emits one structured log record per document received.
///
/// Lifecycle documents log at `info`, stream declarations at `debug`, and
/// the high-volume kinds (events, datums) at `trace`. The subscriber never
/// formats output itself; rendering is whatever `tracing` subscriber the
/// host application installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSubscriber;

impl LogSubscriber {
    /// Create a logging subscriber
    pub fn new() -> Self {
        LogSubscriber
    }

    /// A factory that attaches a logging subscriber to every run
    pub fn factory() -> impl SubscriberFactory {
        |_start: &RunStart| -> FactoryResult { Ok(Some(Box::new(LogSubscriber))) }
    }
}

impl Subscriber for LogSubscriber {
    fn on_start(&mut self, doc: &RunStart) {
        tracing::info!(run = %doc.uid, plan = %doc.plan_name, "run started");
    }

    fn on_descriptor(&mut self, doc: &Descriptor) {
        tracing::debug!(
            descriptor = %doc.uid,
            run = %doc.run_start,
            stream = %doc.name,
            "stream declared"
        );
    }

    fn on_resource(&mut self, doc: &Resource) {
        tracing::debug!(
            resource = %doc.uid,
            run = %doc.run_start,
            spec = %doc.spec,
            "resource declared"
        );
    }

    fn on_event(&mut self, doc: &Event) {
        tracing::trace!(
            descriptor = %doc.descriptor,
            seq_num = doc.seq_num,
            fields = doc.data.len(),
            "event"
        );
    }

    fn on_bulk_event(&mut self, doc: &BulkEvent) {
        tracing::trace!(
            descriptor = %doc.descriptor,
            events = doc.events.len(),
            "bulk event"
        );
    }

    fn on_datum(&mut self, doc: &Datum) {
        tracing::trace!(resource = %doc.resource, "datum");
    }

    fn on_bulk_datum(&mut self, doc: &BulkDatum) {
        tracing::trace!(
            resource = %doc.resource,
            datums = doc.datums.len(),
            "bulk datum"
        );
    }

    fn on_stop(&mut self, doc: &RunStop) {
        tracing::info!(
            run = %doc.run_start,
            exit_status = %doc.exit_status,
            "run stopped"
        );
    }
}
