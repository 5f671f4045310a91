//! # Manifold
//!
//! In-process document router for ordered experiment-run streams.
//!
//! Acquisition systems emit a run as a stream of documents: one `start`,
//! stream declarations (`descriptor`, `resource`), the measurements
//! themselves (`event`, `datum`, and their bulk forms), and one `stop`.
//! Manifold routes that stream. Each run start is offered to every
//! registered [`SubscriberFactory`]; the subscribers the factories return
//! then receive every document belonging to that run, in submission order,
//! until the run stops.
//!
//! ## Quick Start
//!
//! ```
//! use manifold::prelude::*;
//! use manifold::subscribers::DocumentCounter;
//!
//! let counter = DocumentCounter::new();
//! let tap = counter.clone();
//!
//! let router = RunRouter::builder()
//!     .factory(move |_start: &RunStart| -> FactoryResult {
//!         Ok(Some(Box::new(tap.clone())))
//!     })
//!     .build();
//!
//! router.submit(&Document::Start(RunStart::new("r1")))?;
//! router.submit(&Document::Descriptor(Descriptor::new("d1", "r1")))?;
//! router.submit(&Document::Event(Event::new("d1", 1)))?;
//! router.submit(&Document::Stop(RunStop::new("r1")))?;
//!
//! assert_eq!(counter.total(), 4);
//! # Ok::<(), RouterError>(())
//! ```
//!
//! ## Routing Model
//!
//! The router keeps three indices while a run is active: run to
//! subscribers, descriptor to run, and resource to run. Documents that
//! reference an unknown run, descriptor, or resource are dropped silently;
//! out-of-order delivery is an upstream defect the router absorbs rather
//! than propagates. A `stop` document is forwarded to the run's
//! subscribers first, then all three indices forget the run in one step.
//!
//! ## Crates
//!
//! - [`manifold_core`] - document model, error taxonomy, subscriber contract
//! - [`manifold_engine`] - the router itself
//! - [`manifold_subscribers`] - bundled subscriber kit (re-exported as
//!   [`subscribers`])

#![warn(missing_docs)]

pub mod prelude;

// Re-export the document model
pub use manifold_core::{
    BulkDatum, BulkEvent, Datum, Descriptor, Document, DocumentKind, Event, Resource, RunStart,
    RunStop, Uid,
};

// Re-export error handling
pub use manifold_core::{FactoryError, Result, RouterError};

// Re-export the subscriber contract
pub use manifold_core::{FactoryResult, Subscriber, SubscriberFactory};

// Re-export the router
pub use manifold_engine::{RouterBuilder, RouterStats, RunRouter};

// Re-export the bundled subscriber kit
pub use manifold_subscribers as subscribers;
