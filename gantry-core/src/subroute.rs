//! Deferred nested dispatch.

use crate::error::DispatchError;
use crate::routing::{Controller, Router};
use crate::value::Bag;
use std::fmt;

/// Depth at which nested dispatch refuses to recurse further.
///
/// Each [`Subroute::run`] strictly shrinks the remaining path, but mutually
/// referencing controllers can still cycle through empty-path default routes;
/// the guard turns that into an error instead of a stack overflow.
pub const MAX_SUBROUTE_DEPTH: usize = 32;

/// The unconsumed tail of a dispatched path, plus the request context.
///
/// A route that declares a subroute parameter receives one of these instead
/// of binding the remaining segments itself. Calling [`Subroute::run`]
/// re-enters dispatch against a nested router; the nested controller must
/// share the outer context type, which the compiler enforces at the call
/// site.
pub struct Subroute<C> {
    segments: Vec<String>,
    context: C,
    depth: usize,
}

impl<C: Clone> Subroute<C> {
    pub(crate) fn new(segments: Vec<String>, context: C, depth: usize) -> Self {
        Self {
            segments,
            context,
            depth,
        }
    }

    /// The segments left after the outer route finished binding.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True when nothing remains; a nested run will resolve to the nested
    /// table's default route, exactly as an empty path would.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The carried request context.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Dispatch the remaining segments against a nested router.
    ///
    /// The tail is joined back into a path and dispatched with an empty
    /// params bag and the carried context.
    pub fn run<K>(self, router: &Router<K>) -> Result<K::Out, DispatchError>
    where
        K: Controller<Ctx = C>,
    {
        let path = crate::path::join(&self.segments);
        router.dispatch_at(&path, &Bag::new(), self.context, self.depth)
    }
}

impl<C> fmt::Debug for Subroute<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subroute")
            .field("segments", &self.segments)
            .field("depth", &self.depth)
            .finish()
    }
}
