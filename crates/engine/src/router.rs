//! The document router
//!
//! [`RunRouter`] is the single entry point for an ordered run-document
//! stream. It owns three indices:
//! - run uid → subscriber set (created at `start`, deleted at `stop`)
//! - descriptor uid → owning run uid
//! - resource uid → owning run uid
//!
//! Per document kind, `submit` does:
//!
//! | kind               | action                                                    |
//! |--------------------|-----------------------------------------------------------|
//! | start              | consult factories, register subscriber set, forward start |
//! | descriptor         | record descriptor→run, forward to the run's set           |
//! | resource           | record resource→run, forward to the run's set             |
//! | event, bulk_event  | resolve run via descriptor index, forward                 |
//! | datum, bulk_datum  | resolve run via resource index, forward                   |
//! | stop               | forward to the run's set, then purge all three indices    |
//!
//! Documents that reference an unknown run, descriptor, or resource are
//! dropped silently: the router cannot tell "not interested" from "never
//! heard of it", and neither condition is the source's fault.
//!
//! A run whose stop never arrives stays registered, along with its
//! descriptor and resource entries. The router has no expiry of its own;
//! reclaiming abandoned runs is the document source's problem.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use manifold_core::{
    Descriptor, Document, Resource, Result, RouterError, RunStart, RunStop, Subscriber,
    SubscriberFactory, Uid,
};

use crate::builder::RouterBuilder;

/// Point-in-time snapshot of router activity.
///
/// Counters are cumulative since construction. `active_runs` is the current
/// size of the run index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouterStats {
    /// Calls to `submit`, including rejected documents
    pub documents_submitted: u64,
    /// Documents dropped for referencing an unknown run, descriptor, or resource
    pub documents_dropped: u64,
    /// Individual deliveries (one per subscriber per forwarded document)
    pub subscriber_deliveries: u64,
    /// Runs registered by an accepted start document
    pub runs_started: u64,
    /// Runs purged by a stop document
    pub runs_stopped: u64,
    /// Runs currently registered
    pub active_runs: u64,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    dropped: AtomicU64,
    deliveries: AtomicU64,
    runs_started: AtomicU64,
    runs_stopped: AtomicU64,
}

/// All mutable routing state, guarded as one unit.
///
/// The three maps must only ever change together: a dangling
/// descriptor→run entry would route events to a purged run. Keeping them
/// behind one lock makes the stop-time purge a single atomic step.
#[derive(Default)]
struct RouterInner {
    /// run uid → subscribers created for that run, in factory order
    subscribers: FxHashMap<Uid, Vec<Box<dyn Subscriber>>>,
    /// descriptor uid → owning run uid
    descriptors: FxHashMap<Uid, Uid>,
    /// resource uid → owning run uid
    resources: FxHashMap<Uid, Uid>,
}

/// Routes documents, by run, to subscribers it creates from factories.
///
/// The router's promise: every registered factory sees every accepted start
/// document, in registration order, and whatever subscriber a factory
/// returns receives every later document of that run, until and including
/// its stop. After the stop, the router holds no reference to the
/// subscriber.
///
/// A run whose factories all decline is still registered, with an empty
/// subscriber set: its descriptors and resources index normally, and
/// fan-out to the empty set is a no-op. This keeps "run with zero
/// subscribers" distinct from "unknown run".
///
/// # Thread Safety
///
/// `submit` takes `&self` and may be called from multiple producer threads.
/// One router-wide lock is held for the duration of each call, subscriber
/// hooks included, so the processing of two documents never interleaves and
/// the stream's total order is preserved. A slow subscriber therefore blocks
/// the stream; that is the intended backpressure path.
pub struct RunRouter {
    /// Factories consulted, in order, for every accepted start document
    factories: Vec<Box<dyn SubscriberFactory>>,
    inner: Mutex<RouterInner>,
    counters: Counters,
}

impl RunRouter {
    /// Create a router over an ordered list of factories
    pub fn new(factories: Vec<Box<dyn SubscriberFactory>>) -> Self {
        RunRouter {
            factories,
            inner: Mutex::new(RouterInner::default()),
            counters: Counters::default(),
        }
    }

    /// Start building a router
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Route one document.
    ///
    /// Processes the document to completion, subscriber calls included,
    /// before returning.
    ///
    /// ## Errors
    ///
    /// - [`RouterError::MalformedDocument`]: a required field is missing or
    ///   empty
    /// - [`RouterError::DuplicateRun`]: a start document repeats a
    ///   registered run uid
    /// - [`RouterError::Factory`]: a factory failed during start processing;
    ///   nothing was registered for that run
    ///
    /// All three are terminal for this call only. Indices of other runs are
    /// untouched, and the router keeps accepting documents afterwards.
    pub fn submit(&self, doc: &Document) -> Result<()> {
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        doc.validate()?;

        // One lock for the whole call: no partial interleaving of two
        // documents is permitted, whatever threads they arrive on.
        let mut inner = self.inner.lock();
        match doc {
            Document::Start(d) => self.handle_start(&mut inner, doc, d)?,
            Document::Descriptor(d) => self.handle_descriptor(&mut inner, doc, d),
            Document::Resource(d) => self.handle_resource(&mut inner, doc, d),
            Document::Event(d) => self.forward_by_descriptor(&mut inner, doc, &d.descriptor),
            Document::BulkEvent(d) => self.forward_by_descriptor(&mut inner, doc, &d.descriptor),
            Document::Datum(d) => self.forward_by_resource(&mut inner, doc, &d.resource),
            Document::BulkDatum(d) => self.forward_by_resource(&mut inner, doc, &d.resource),
            Document::Stop(d) => self.handle_stop(&mut inner, doc, d),
        }
        Ok(())
    }

    /// Check whether a run is currently registered
    pub fn is_active(&self, run: &Uid) -> bool {
        self.inner.lock().subscribers.contains_key(run)
    }

    /// Uids of all currently registered runs, sorted
    pub fn active_runs(&self) -> Vec<Uid> {
        let inner = self.inner.lock();
        let mut runs: Vec<Uid> = inner.subscribers.keys().cloned().collect();
        runs.sort();
        runs
    }

    /// Number of subscribers registered for a run, if the run is known
    pub fn subscriber_count(&self, run: &Uid) -> Option<usize> {
        self.inner.lock().subscribers.get(run).map(Vec::len)
    }

    /// Number of registered factories
    pub fn factory_count(&self) -> usize {
        self.factories.len()
    }

    /// Snapshot the router's counters
    pub fn stats(&self) -> RouterStats {
        let active_runs = self.inner.lock().subscribers.len() as u64;
        RouterStats {
            documents_submitted: self.counters.submitted.load(Ordering::Relaxed),
            documents_dropped: self.counters.dropped.load(Ordering::Relaxed),
            subscriber_deliveries: self.counters.deliveries.load(Ordering::Relaxed),
            runs_started: self.counters.runs_started.load(Ordering::Relaxed),
            runs_stopped: self.counters.runs_stopped.load(Ordering::Relaxed),
            active_runs,
        }
    }

    /// Register a run: consult every factory, then record the set.
    ///
    /// Fail fast on the first factory error: later factories are not
    /// invoked and nothing is registered, so registration is all-or-nothing.
    /// Subscribers earlier factories already produced are dropped unused.
    fn handle_start(
        &self,
        inner: &mut RouterInner,
        doc: &Document,
        start: &RunStart,
    ) -> Result<()> {
        if inner.subscribers.contains_key(&start.uid) {
            return Err(RouterError::DuplicateRun {
                uid: start.uid.clone(),
            });
        }

        let mut set: Vec<Box<dyn Subscriber>> = Vec::new();
        for (index, factory) in self.factories.iter().enumerate() {
            match factory.subscribe(start) {
                Ok(Some(subscriber)) => set.push(subscriber),
                Ok(None) => {}
                Err(source) => {
                    return Err(RouterError::Factory {
                        index,
                        run: start.uid.clone(),
                        source,
                    });
                }
            }
        }

        // The start document is the set's first delivery, before any other
        // document of the run can arrive.
        self.deliver(&start.uid, &mut set, doc);

        tracing::trace!(
            run = %start.uid,
            subscribers = set.len(),
            "run registered"
        );
        // Insert even when empty: the run is now known.
        inner.subscribers.insert(start.uid.clone(), set);
        self.counters.runs_started.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn handle_descriptor(&self, inner: &mut RouterInner, doc: &Document, d: &Descriptor) {
        let RouterInner {
            subscribers,
            descriptors,
            ..
        } = inner;
        match subscribers.get_mut(&d.run_start) {
            Some(set) => {
                descriptors.insert(d.uid.clone(), d.run_start.clone());
                self.deliver(&d.run_start, set, doc);
            }
            None => self.drop_document(doc, "unknown run"),
        }
    }

    fn handle_resource(&self, inner: &mut RouterInner, doc: &Document, r: &Resource) {
        let RouterInner {
            subscribers,
            resources,
            ..
        } = inner;
        match subscribers.get_mut(&r.run_start) {
            Some(set) => {
                resources.insert(r.uid.clone(), r.run_start.clone());
                self.deliver(&r.run_start, set, doc);
            }
            None => self.drop_document(doc, "unknown run"),
        }
    }

    fn forward_by_descriptor(&self, inner: &mut RouterInner, doc: &Document, descriptor: &Uid) {
        let RouterInner {
            subscribers,
            descriptors,
            ..
        } = inner;
        match descriptors.get(descriptor) {
            Some(run) => match subscribers.get_mut(run) {
                Some(set) => self.deliver(run, set, doc),
                // Stop purges descriptor entries together with the run, so a
                // dangling mapping is unreachable; drop rather than panic.
                None => self.drop_document(doc, "dangling descriptor entry"),
            },
            None => self.drop_document(doc, "unknown descriptor"),
        }
    }

    fn forward_by_resource(&self, inner: &mut RouterInner, doc: &Document, resource: &Uid) {
        let RouterInner {
            subscribers,
            resources,
            ..
        } = inner;
        match resources.get(resource) {
            Some(run) => match subscribers.get_mut(run) {
                Some(set) => self.deliver(run, set, doc),
                None => self.drop_document(doc, "dangling resource entry"),
            },
            None => self.drop_document(doc, "unknown resource"),
        }
    }

    /// Close a run: forward the stop, then purge every trace of the run.
    ///
    /// Forwarding happens first so subscribers can finalize per-run state
    /// while the run is still addressable. The purge of all three indices
    /// happens under the same lock acquisition as the forwarding, so no
    /// intermediate state is observable from outside.
    fn handle_stop(&self, inner: &mut RouterInner, doc: &Document, stop: &RunStop) {
        let run = &stop.run_start;
        match inner.subscribers.get_mut(run) {
            Some(set) => self.deliver(run, set, doc),
            None => {
                // Never started, or already stopped. Idempotent no-op.
                self.drop_document(doc, "unknown run");
                return;
            }
        }

        inner.subscribers.remove(run);
        inner.descriptors.retain(|_, owner| owner != run);
        inner.resources.retain(|_, owner| owner != run);
        self.counters.runs_stopped.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(run = %run, "run purged");
    }

    fn deliver(&self, run: &Uid, set: &mut [Box<dyn Subscriber>], doc: &Document) {
        for subscriber in set.iter_mut() {
            subscriber.handle(doc);
        }
        self.counters
            .deliveries
            .fetch_add(set.len() as u64, Ordering::Relaxed);
        tracing::trace!(
            kind = %doc.kind(),
            run = %run,
            subscribers = set.len(),
            "forwarded document"
        );
    }

    fn drop_document(&self, doc: &Document, reason: &'static str) {
        self.counters.dropped.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(kind = %doc.kind(), reason = reason, "dropped document");
    }
}

impl std::fmt::Debug for RunRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("RunRouter")
            .field("factories", &self.factories.len())
            .field("active_runs", &stats.active_runs)
            .field("documents_submitted", &stats.documents_submitted)
            .finish()
    }
}
