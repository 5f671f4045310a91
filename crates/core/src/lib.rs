//! Core types for the manifold document router
//!
//! This crate defines the vocabulary shared by the router engine and every
//! subscriber implementation:
//! - [`Document`] and its eight kinds: the immutable records of a run stream
//! - [`Uid`]: the string identifier connecting documents to each other
//! - [`Subscriber`] / [`SubscriberFactory`]: the contracts callers implement
//! - [`RouterError`]: the closed error taxonomy surfaced by `submit`
//!
//! No routing logic lives here; see `manifold-engine` for the router itself.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod subscriber;
pub mod uid;

pub use document::{
    BulkDatum, BulkEvent, Datum, Descriptor, Document, DocumentKind, Event, Resource, RunStart,
    RunStop,
};
pub use error::{FactoryError, Result, RouterError};
pub use subscriber::{FactoryResult, Subscriber, SubscriberFactory};
pub use uid::Uid;
