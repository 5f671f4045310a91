//! Counting subscriber

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use manifold_core::{
    BulkDatum, BulkEvent, Datum, Descriptor, DocumentKind, Event, Resource, RunStart, RunStop,
    Subscriber,
};

/// Counts documents received, in total and per kind.
///
/// The counts live behind an `Arc`, so a clone handed to the router keeps
/// feeding the clones the caller retained. Typical use: keep one counter,
/// register a factory that clones it per run, read totals after the stream.
///
/// # Examples
///
/// ```
/// use manifold_subscribers::DocumentCounter;
/// use manifold_core::DocumentKind;
///
/// let counter = DocumentCounter::new();
/// let mut feed = counter.clone();
///
/// use manifold_core::{Document, RunStart, Subscriber};
/// feed.handle(&Document::Start(RunStart::new("r1")));
///
/// assert_eq!(counter.total(), 1);
/// assert_eq!(counter.count(DocumentKind::Start), 1);
/// assert_eq!(counter.count(DocumentKind::Stop), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentCounter {
    shared: Arc<Counts>,
}

#[derive(Debug, Default)]
struct Counts {
    total: AtomicU64,
    by_kind: [AtomicU64; 8],
}

fn slot(kind: DocumentKind) -> usize {
    match kind {
        DocumentKind::Start => 0,
        DocumentKind::Descriptor => 1,
        DocumentKind::Resource => 2,
        DocumentKind::Event => 3,
        DocumentKind::BulkEvent => 4,
        DocumentKind::Datum => 5,
        DocumentKind::BulkDatum => 6,
        DocumentKind::Stop => 7,
    }
}

impl DocumentCounter {
    /// Create a counter with all counts at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents received across all kinds
    pub fn total(&self) -> u64 {
        self.shared.total.load(Ordering::Relaxed)
    }

    /// Documents received of one kind
    pub fn count(&self, kind: DocumentKind) -> u64 {
        self.shared.by_kind[slot(kind)].load(Ordering::Relaxed)
    }

    fn bump(&self, kind: DocumentKind) {
        self.shared.total.fetch_add(1, Ordering::Relaxed);
        self.shared.by_kind[slot(kind)].fetch_add(1, Ordering::Relaxed);
    }
}

impl Subscriber for DocumentCounter {
    fn on_start(&mut self, _doc: &RunStart) {
        self.bump(DocumentKind::Start);
    }
    fn on_descriptor(&mut self, _doc: &Descriptor) {
        self.bump(DocumentKind::Descriptor);
    }
    fn on_resource(&mut self, _doc: &Resource) {
        self.bump(DocumentKind::Resource);
    }
    fn on_event(&mut self, _doc: &Event) {
        self.bump(DocumentKind::Event);
    }
    fn on_bulk_event(&mut self, _doc: &BulkEvent) {
        self.bump(DocumentKind::BulkEvent);
    }
    fn on_datum(&mut self, _doc: &Datum) {
        self.bump(DocumentKind::Datum);
    }
    fn on_bulk_datum(&mut self, _doc: &BulkDatum) {
        self.bump(DocumentKind::BulkDatum);
    }
    fn on_stop(&mut self, _doc: &RunStop) {
        self.bump(DocumentKind::Stop);
    }
}
