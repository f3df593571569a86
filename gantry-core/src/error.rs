// Error types for the Gantry engine

use thiserror::Error;

/// Structural misconfiguration detected while building a route table.
///
/// Build errors abort construction entirely; no partial table is produced.
/// They indicate a bug in a controller's route definitions and are meant to
/// surface at startup, not per request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The same route name was registered twice in one table.
    #[error("route `{0}` is registered more than once")]
    DuplicateRoute(String),

    /// Two routes both carry the default marker.
    #[error("routes `{0}` and `{1}` are both marked as the default route")]
    DuplicateDefault(String, String),

    /// A declared parameter type has no registered coercion.
    #[error("no coercion for parameter `{param}` of route `{route}` (type `{ty}`)")]
    InvalidParameterType {
        route: String,
        param: String,
        ty: &'static str,
    },

    /// `params` or `request` was used as the name of a parameter with a
    /// different role.
    #[error("route `{route}` uses reserved name `{name}` for a {role} parameter")]
    ReservedNameMisuse {
        route: String,
        name: String,
        role: &'static str,
    },

    /// A role appears more than once, or a subroute parameter is not last.
    #[error("route `{route}`: {reason}")]
    InvalidRoute { route: String, reason: String },
}

/// A per-dispatch failure, surfaced to the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No route matches the path, the path was empty with no default route,
    /// or too few segments remained for the matched route's parameters.
    #[error("no route matches `{0}`")]
    NotFound(String),

    /// A path segment or bag field was rejected by its parameter's coercion.
    /// An empty `raw` means the bag field was absent.
    #[error("invalid value `{raw}` for parameter `{param}`")]
    InvalidValue { param: String, raw: String },

    /// A controller read its arguments against a different shape than its
    /// own route definition declared.
    #[error("route `{route}` expected {expected} argument next")]
    SignatureMismatch { route: String, expected: String },

    /// Nested dispatch exceeded the recursion guard.
    #[error("sub-route recursion reached depth {0}")]
    RecursionLimit(usize),
}

impl DispatchError {
    pub(crate) fn signature(route: &str, expected: impl Into<String>) -> Self {
        Self::SignatureMismatch {
            route: route.to_string(),
            expected: expected.into(),
        }
    }

    /// True for a route-resolution miss, as opposed to a value rejection.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// True if the failure is attributable to caller-supplied input.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::InvalidValue { .. })
    }
}

/// A raw value rejected by a coercion, before it is attributed to a
/// parameter name by the binder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot interpret `{raw}` as {target}")]
pub struct CoerceError {
    pub(crate) target: &'static str,
    pub(crate) raw: String,
}

impl CoerceError {
    pub(crate) fn new(target: &'static str, raw: impl Into<String>) -> Self {
        Self {
            target,
            raw: raw.into(),
        }
    }

    /// The declared target type that rejected the value.
    pub fn target(&self) -> &'static str {
        self.target
    }

    /// The rejected raw value, rendered as text.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_display() {
        let err = BuildError::DuplicateDefault("index".into(), "home".into());
        assert_eq!(
            err.to_string(),
            "routes `index` and `home` are both marked as the default route"
        );

        let err = BuildError::InvalidParameterType {
            route: "find".into(),
            param: "x".into(),
            ty: "std::vec::Vec<u8>",
        };
        assert!(err.to_string().contains("`x`"));
        assert!(err.to_string().contains("std::vec::Vec<u8>"));
    }

    #[test]
    fn test_dispatch_error_display() {
        let err = DispatchError::NotFound("missing".into());
        assert_eq!(err.to_string(), "no route matches `missing`");
        assert!(err.is_not_found());
        assert!(err.is_input_error());

        let err = DispatchError::InvalidValue {
            param: "x".into(),
            raw: "bar".into(),
        };
        assert_eq!(err.to_string(), "invalid value `bar` for parameter `x`");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_signature_mismatch_is_not_input_error() {
        let err = DispatchError::signature("find", "an int");
        assert!(!err.is_input_error());
        assert_eq!(err.to_string(), "route `find` expected an int argument next");
    }

    #[test]
    fn test_coerce_error_display() {
        let err = CoerceError::new("int", "abc");
        assert_eq!(err.to_string(), "cannot interpret `abc` as int");
        assert_eq!(err.target(), "int");
        assert_eq!(err.raw(), "abc");
    }
}
