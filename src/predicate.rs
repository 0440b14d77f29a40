use std::fmt;
use std::sync::Arc;

/// A user-supplied, total function deciding whether a single element matches.
///
/// Predicates are evaluated only when a transition is actually attempted, in
/// left-to-right NFA-step order; the engine never batches, memoizes, or
/// reorders a call.
#[derive(Clone)]
pub struct Predicate<T>(Arc<dyn Fn(&T) -> bool + Send + Sync>);

impl<T> Predicate<T> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Predicate(Arc::new(f))
    }

    #[inline]
    pub(crate) fn test(&self, value: &T) -> bool {
        (self.0)(value)
    }

    pub(crate) fn always() -> Self {
        Predicate(Arc::new(|_: &T| true))
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}
