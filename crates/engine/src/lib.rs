//! Routing engine for run-document streams
//!
//! This crate implements the document router:
//! - [`RunRouter`]: dispatch, the three indices, and run lifecycle
//! - [`RouterBuilder`]: ordered factory registration
//! - [`RouterStats`]: counter snapshots for introspection
//!
//! The vocabulary types (documents, subscribers, errors) live in
//! `manifold-core`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod router;

pub use builder::RouterBuilder;
pub use router::{RouterStats, RunRouter};
