//! Handler-set descriptions.
//!
//! A controller describes each of its routes as plain data: a name, an
//! optional default marker, and an ordered parameter list tagged with
//! explicit roles. The route table builder validates these records and
//! resolves every declared type to a coercion before the first dispatch.

use crate::coerce::TypeKey;

/// A single bag field with its declared type.
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) ty: TypeKey,
}

impl Field {
    /// Declare a bag field of type `T`.
    pub fn new<T: 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: TypeKey::of::<T>(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> TypeKey {
        self.ty
    }
}

/// One parameter record, tagged with its binding role.
///
/// The role is explicit rather than inferred from the parameter name, but
/// the reserved names stay validated: a positional parameter may not be
/// called `params` or `request`.
#[derive(Debug, Clone)]
pub enum ParamDefinition {
    /// Consumes the next path segment and coerces it to the declared type.
    Positional { name: String, ty: TypeKey },
    /// Binds the caller-supplied params bag against the declared fields.
    Params { fields: Vec<Field> },
    /// Binds the request context, unchanged and uninspected.
    Request,
    /// Receives the unconsumed tail of the path. Must be declared last.
    Subroute,
}

/// Description of one route: its name, default marker, and parameter list.
///
/// Built fluently:
///
/// ```
/// use gantry_core::{Field, RouteDefinition};
///
/// let route = RouteDefinition::new("find")
///     .positional::<i64>("x")
///     .params([Field::new::<i64>("y")])
///     .request();
/// assert_eq!(route.name(), "find");
/// ```
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    pub(crate) name: String,
    pub(crate) is_default: bool,
    pub(crate) params: Vec<ParamDefinition>,
}

impl RouteDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_default: false,
            params: Vec::new(),
        }
    }

    /// Mark this route as the table's default, invoked for empty paths.
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Append a positional parameter of type `T`.
    pub fn positional<T: 'static>(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamDefinition::Positional {
            name: name.into(),
            ty: TypeKey::of::<T>(),
        });
        self
    }

    /// Append the reserved params-bag parameter with its declared shape.
    pub fn params(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.params.push(ParamDefinition::Params {
            fields: fields.into_iter().collect(),
        });
        self
    }

    /// Append the reserved request-context parameter.
    pub fn request(mut self) -> Self {
        self.params.push(ParamDefinition::Request);
        self
    }

    /// Append a trailing subroute parameter.
    pub fn subroute(mut self) -> Self {
        self.params.push(ParamDefinition::Subroute);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn param_definitions(&self) -> &[ParamDefinition] {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fluent_construction() {
        let route = RouteDefinition::new("find")
            .positional::<i64>("x")
            .positional::<String>("label")
            .params([Field::new::<i64>("y"), Field::new::<bool>("strict")])
            .request()
            .subroute();

        assert_eq!(route.name(), "find");
        assert!(!route.is_default());
        assert_eq!(route.param_definitions().len(), 5);
        assert!(matches!(
            route.param_definitions()[0],
            ParamDefinition::Positional { .. }
        ));
        assert!(matches!(
            route.param_definitions()[4],
            ParamDefinition::Subroute
        ));
    }

    #[test]
    fn test_default_marker() {
        let route = RouteDefinition::new("index").as_default();
        assert!(route.is_default());
    }

    #[test]
    fn test_field_carries_type() {
        let field = Field::new::<f64>("ratio");
        assert_eq!(field.name(), "ratio");
        assert_eq!(field.ty().name(), "f64");
    }
}
