//! Builder for router configuration

use manifold_core::SubscriberFactory;

use crate::router::RunRouter;

/// Builder collecting subscriber factories for a [`RunRouter`].
///
/// Registration order is load-bearing: factories are consulted in the order
/// they were added, and each run's subscriber set preserves that order for
/// every fan-out.
///
/// # Examples
///
/// ```
/// use manifold_core::{FactoryResult, RunStart};
/// use manifold_engine::RunRouter;
///
/// let router = RunRouter::builder()
///     .factory(|_start: &RunStart| -> FactoryResult { Ok(None) })
///     .build();
/// assert_eq!(router.factory_count(), 1);
/// ```
pub struct RouterBuilder {
    factories: Vec<Box<dyn SubscriberFactory>>,
}

impl RouterBuilder {
    /// Create a builder with no factories registered.
    pub fn new() -> Self {
        RouterBuilder {
            factories: Vec::new(),
        }
    }

    /// Register a factory at the next position in consultation order.
    pub fn factory(mut self, factory: impl SubscriberFactory + 'static) -> Self {
        self.factories.push(Box::new(factory));
        self
    }

    /// Register an already-boxed factory.
    ///
    /// Useful when factories come from a collection assembled elsewhere.
    pub fn boxed_factory(mut self, factory: Box<dyn SubscriberFactory>) -> Self {
        self.factories.push(factory);
        self
    }

    /// Finish building; the factory list is fixed from here on.
    pub fn build(self) -> RunRouter {
        RunRouter::new(self.factories)
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
