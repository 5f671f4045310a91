//! Convenient imports for manifold.
//!
//! This module re-exports the most commonly used types so you can get
//! started with a single import:
//!
//! ```
//! use manifold::prelude::*;
//!
//! let router = RunRouter::builder().build();
//! router.submit(&Document::Start(RunStart::new("r1")))?;
//! # Ok::<(), RouterError>(())
//! ```

// Router entry points
pub use manifold_engine::{RouterBuilder, RouterStats, RunRouter};

// Error handling
pub use manifold_core::{Result, RouterError};

// Document model
pub use manifold_core::{
    BulkDatum, BulkEvent, Datum, Descriptor, Document, DocumentKind, Event, Resource, RunStart,
    RunStop, Uid,
};

// Subscriber contract
pub use manifold_core::{FactoryResult, Subscriber, SubscriberFactory};

// Re-export serde_json for convenience
pub use serde_json::json;
