//! Field-collecting subscriber

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use manifold_core::{BulkEvent, Event, Subscriber};

/// Collects one named field out of every event's data payload.
///
/// The output buffer is shared: the caller keeps a handle (via [`output`] or
/// a clone of the collector) and reads it after, or during, the run. Events
/// whose payload lacks the field are logged and skipped; subscriber hooks
/// have no error channel.
///
/// Bulk events contribute their contained events in order.
///
/// [`output`]: FieldCollector::output
#[derive(Debug, Clone)]
pub struct FieldCollector {
    field: String,
    output: Arc<Mutex<Vec<Value>>>,
}

impl FieldCollector {
    /// Collect `field` into a fresh buffer
    pub fn new(field: impl Into<String>) -> Self {
        FieldCollector {
            field: field.into(),
            output: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Collect `field` into a caller-supplied buffer
    pub fn with_output(field: impl Into<String>, output: Arc<Mutex<Vec<Value>>>) -> Self {
        FieldCollector {
            field: field.into(),
            output,
        }
    }

    /// Handle on the shared output buffer
    pub fn output(&self) -> Arc<Mutex<Vec<Value>>> {
        Arc::clone(&self.output)
    }

    /// Snapshot of the values collected so far
    pub fn values(&self) -> Vec<Value> {
        self.output.lock().clone()
    }

    fn collect(&self, event: &Event) {
        match event.data.get(&self.field) {
            Some(value) => self.output.lock().push(value.clone()),
            None => tracing::warn!(
                field = %self.field,
                seq_num = event.seq_num,
                "event data lacks collected field"
            ),
        }
    }
}

impl Subscriber for FieldCollector {
    fn on_event(&mut self, doc: &Event) {
        self.collect(doc);
    }

    fn on_bulk_event(&mut self, doc: &BulkEvent) {
        for event in &doc.events {
            self.collect(event);
        }
    }
}
