// Core engine for Gantry
// Route-table construction, path tokenization, typed argument binding, and
// dispatch over an immutable table

pub mod bind;
pub mod coerce;
pub mod describe;
pub mod error;
pub mod path;
pub mod routing;
pub mod subroute;
pub mod table;
pub mod value;

// Re-export commonly used types
pub use bind::{Args, BoundArg, BoundParams};
pub use coerce::{Coerce, Coerced, Coercer, CoercionRegistry, FromValue, Primitive, TypeKey};
pub use describe::{Field, ParamDefinition, RouteDefinition};
pub use error::{BuildError, CoerceError, DispatchError};
pub use routing::{Controller, Router};
pub use subroute::{Subroute, MAX_SUBROUTE_DEPTH};
pub use table::{RouteEntry, RouteTable, RESERVED_NAMES};
pub use value::{Bag, Value};
