// Gantry - a statically typed route resolution and dispatch engine
//
// Given a path string, a params bag, and a request-context value, Gantry
// resolves a route, coerces segments and bag fields into the declared
// argument types, and invokes the handler. Every route of one controller
// produces the same output type; transport, decoding, and configuration
// belong to the host.

// Re-export the engine
pub use gantry_core::*;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Args,
        Bag,
        BoundParams,
        BuildError,
        Coerce,
        CoercionRegistry,
        Controller,
        DispatchError,
        Field,
        RouteDefinition,
        RouteTable,
        Router,
        Subroute,
        Value,
        bag,
    };
}
