//! Controllers and the dispatcher.
//!
//! A [`Controller`] is a routable set of handlers sharing one context type
//! and one output type. A [`Router`] pairs a controller instance with its
//! route table, built exactly once; every dispatch afterwards is a pure
//! synchronous walk over immutable state, safe to run concurrently from any
//! number of threads.

use crate::bind::{self, Args};
use crate::coerce::CoercionRegistry;
use crate::describe::RouteDefinition;
use crate::error::{BuildError, DispatchError};
use crate::path;
use crate::subroute::MAX_SUBROUTE_DEPTH;
use crate::table::RouteTable;
use crate::value::Bag;

/// A routable set of handlers with a shared context and output type.
///
/// `routes` describes the set as data; `invoke` is the single surface
/// through which every handler is called with its bound arguments. Every
/// route of one controller produces the same output type.
///
/// ```
/// use gantry_core::{Args, Controller, DispatchError, RouteDefinition, Router, bag};
///
/// struct Calc;
///
/// impl Controller for Calc {
///     type Ctx = ();
///     type Out = i64;
///
///     fn routes(&self) -> Vec<RouteDefinition> {
///         vec![RouteDefinition::new("double").positional::<i64>("x")]
///     }
///
///     fn invoke(&self, route: &str, mut args: Args<()>) -> Result<i64, DispatchError> {
///         match route {
///             "double" => Ok(args.int()? * 2),
///             _ => Err(DispatchError::NotFound(route.to_string())),
///         }
///     }
/// }
///
/// let router = Router::new(Calc).unwrap();
/// assert_eq!(router.dispatch("double/21", &bag! {}, ()).unwrap(), 42);
/// ```
pub trait Controller: Send + Sync {
    /// Request-context type threaded through to every handler unchanged.
    ///
    /// A route may bind the context both to a request parameter and into a
    /// subroute, so the type must be `Clone`; wrap expensive state in `Arc`.
    type Ctx: Clone;

    /// The uniform output type of every route in this controller.
    type Out;

    /// Describe this controller's routes.
    fn routes(&self) -> Vec<RouteDefinition>;

    /// Register wrapper coercions used by this controller's parameters.
    fn coercions(&self, registry: &mut CoercionRegistry) {
        let _ = registry;
    }

    /// Invoke the named route with its bound arguments.
    fn invoke(&self, route: &str, args: Args<Self::Ctx>) -> Result<Self::Out, DispatchError>;
}

/// Dispatcher over one controller and its pre-built route table.
pub struct Router<K: Controller> {
    controller: K,
    table: RouteTable,
}

impl<K: Controller> std::fmt::Debug for Router<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl<K: Controller> Router<K> {
    /// Build the route table for `controller` and pair the two for dispatch.
    ///
    /// Table construction validates the controller's route definitions and
    /// resolves every declared parameter type; any misconfiguration fails
    /// here, before the first dispatch.
    pub fn new(controller: K) -> Result<Self, BuildError> {
        let mut registry = CoercionRegistry::new();
        controller.coercions(&mut registry);
        let table = RouteTable::build(controller.routes(), &registry)?;
        Ok(Self { controller, table })
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn controller(&self) -> &K {
        &self.controller
    }

    /// Resolve `path`, bind arguments, and invoke the matching route.
    ///
    /// The first segment selects the route; an empty path falls back to the
    /// default route if the table has one. Binding and invocation failures
    /// surface unchanged.
    pub fn dispatch(
        &self,
        path: &str,
        params: &Bag,
        ctx: K::Ctx,
    ) -> Result<K::Out, DispatchError> {
        self.dispatch_at(path, params, ctx, 0)
    }

    pub(crate) fn dispatch_at(
        &self,
        path: &str,
        params: &Bag,
        ctx: K::Ctx,
        depth: usize,
    ) -> Result<K::Out, DispatchError> {
        if depth >= MAX_SUBROUTE_DEPTH {
            return Err(DispatchError::RecursionLimit(depth));
        }

        let segments = path::segments(path);
        let (entry, rest) = match segments.split_first() {
            Some((head, rest)) => {
                let entry = self.table.get(head).ok_or_else(|| {
                    tracing::debug!(%path, "no route for first segment");
                    DispatchError::NotFound(path.to_string())
                })?;
                (entry, rest)
            }
            None => {
                let entry = self.table.default_route().ok_or_else(|| {
                    tracing::debug!(%path, "empty path and no default route");
                    DispatchError::NotFound(path.to_string())
                })?;
                (entry, &[][..])
            }
        };

        tracing::trace!(%path, route = %entry.name(), depth, "dispatching");
        let bound = bind::bind(entry, rest, params, &ctx, path, depth)?;
        self.controller.invoke(entry.name(), Args::new(entry.name(), bound))
    }
}
