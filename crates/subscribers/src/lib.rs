//! Ready-made subscribers for manifold routers
//!
//! This crate provides the subscriber kit that ships with manifold:
//!
//! - [`DocumentCounter`] - count documents by kind across a run
//! - [`FieldCollector`] - accumulate one data field from every event
//! - [`RunCapture`] - buffer a whole run and compute at stop
//! - [`LogSubscriber`] - emit structured log records per document
//!
//! plus the factory adapters [`always_factory`] and [`interest_factory`]
//! for wiring plain closures into a router.
//!
//! All subscribers here keep their state behind shared handles, so the
//! caller can hand a clone to the router and keep reading results from
//! the original.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod capture;
pub mod collector;
pub mod counter;
pub mod factories;
pub mod log;

pub use capture::{CapturedRun, RunCapture};
pub use collector::FieldCollector;
pub use counter::DocumentCounter;
pub use factories::{always_factory, interest_factory};
pub use log::LogSubscriber;
