//! Factory adapters
//!
//! Helpers for building [`SubscriberFactory`] values out of plain closures:
//!
//! - [`always_factory`] - attach a fresh subscriber to every run
//! - [`interest_factory`] - attach one only when a predicate accepts the
//!   run's start document

use manifold_core::{FactoryResult, RunStart, Subscriber, SubscriberFactory};

/// Build a factory that subscribes to every run.
///
/// `make` is called once per run start and its return value becomes that
/// run's subscriber.
///
/// # Examples
///
/// ```
/// use manifold_subscribers::{always_factory, DocumentCounter};
///
/// let factory = always_factory(|_start| DocumentCounter::new());
/// ```
pub fn always_factory<M, S>(make: M) -> impl SubscriberFactory
where
    M: Fn(&RunStart) -> S + Send + Sync + 'static,
    S: Subscriber + 'static,
{
    move |start: &RunStart| -> FactoryResult { Ok(Some(Box::new(make(start)))) }
}

/// Build a factory that subscribes only to runs accepted by `predicate`.
///
/// Runs the predicate rejects get no subscriber from this factory; the run
/// itself still proceeds normally.
///
/// # Examples
///
/// ```
/// use manifold_subscribers::{interest_factory, FieldCollector};
///
/// let factory = interest_factory(
///     |start| start.plan_name == "scan",
///     |_start| FieldCollector::new("temperature"),
/// );
/// ```
pub fn interest_factory<P, M, S>(predicate: P, make: M) -> impl SubscriberFactory
where
    P: Fn(&RunStart) -> bool + Send + Sync + 'static,
    M: Fn(&RunStart) -> S + Send + Sync + 'static,
    S: Subscriber + 'static,
{
    move |start: &RunStart| -> FactoryResult {
        if predicate(start) {
            Ok(Some(Box::new(make(start))))
        } else {
            Ok(None)
        }
    }
}
