//! Collect-then-compute subscriber

use manifold_core::{BulkEvent, Descriptor, Event, RunStart, RunStop, Subscriber, Uid};

/// Everything captured from one run, handed to the compute hook at stop time.
#[derive(Debug, Clone, Default)]
pub struct CapturedRun {
    /// The start document, once seen
    pub start: Option<RunStart>,
    /// All descriptors of the run, in arrival order
    pub descriptors: Vec<Descriptor>,
    /// All events of the run, in arrival order (bulk events are unpacked)
    pub events: Vec<Event>,
    /// The stop document that triggered the compute hook
    pub stop: Option<RunStop>,
}

impl CapturedRun {
    /// Events belonging to one descriptor, in arrival order
    pub fn events_for(&self, descriptor: &Uid) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| &e.descriptor == descriptor)
            .collect()
    }
}

/// Buffers a whole run, then invokes a compute hook exactly once at stop.
///
/// For analyses that need the complete run before they can produce anything:
/// fitting, statistics over all events, end-of-run summaries. The hook runs
/// inside the router's `submit(stop)` call, so whatever it does is finished
/// before the stop returns to the producer.
///
/// A run that never receives its stop document never computes; the buffer
/// is dropped with the subscriber when the router is dropped.
pub struct RunCapture<F>
where
    F: FnMut(&CapturedRun) + Send,
{
    buffer: CapturedRun,
    compute: F,
}

impl<F> RunCapture<F>
where
    F: FnMut(&CapturedRun) + Send,
{
    /// Create a capture that runs `compute` on the buffered run at stop time
    pub fn new(compute: F) -> Self {
        RunCapture {
            buffer: CapturedRun::default(),
            compute,
        }
    }
}

impl<F> Subscriber for RunCapture<F>
where
    F: FnMut(&CapturedRun) + Send,
{
    fn on_start(&mut self, doc: &RunStart) {
        self.buffer.start = Some(doc.clone());
    }

    fn on_descriptor(&mut self, doc: &Descriptor) {
        self.buffer.descriptors.push(doc.clone());
    }

    fn on_event(&mut self, doc: &Event) {
        self.buffer.events.push(doc.clone());
    }

    fn on_bulk_event(&mut self, doc: &BulkEvent) {
        self.buffer.events.extend(doc.events.iter().cloned());
    }

    fn on_stop(&mut self, doc: &RunStop) {
        self.buffer.stop = Some(doc.clone());
        (self.compute)(&self.buffer);
    }
}
