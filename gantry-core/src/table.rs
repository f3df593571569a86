//! Route table construction.
//!
//! A table is built once from a controller's route definitions, with every
//! declared parameter type resolved to a coercion up front. Tables are
//! immutable afterwards and safe to share across threads; dispatch performs
//! no type lookup of its own.

use crate::coerce::{Coercer, CoercionRegistry};
use crate::describe::{ParamDefinition, RouteDefinition};
use crate::error::BuildError;
use compact_str::CompactString;
use std::collections::HashMap;
use std::fmt;

/// Names that carry a fixed role and may not be used positionally.
pub const RESERVED_NAMES: [&str; 2] = ["params", "request"];

/// A parameter with its coercion resolved.
#[derive(Clone)]
pub(crate) enum ParamBinding {
    Positional {
        name: CompactString,
        coercer: Coercer,
    },
    Bag {
        fields: Vec<(CompactString, Coercer)>,
    },
    Request,
    Subroute,
}

/// A route with all build-time resolution applied.
#[derive(Clone)]
pub struct RouteEntry {
    name: CompactString,
    is_default: bool,
    pub(crate) bindings: Vec<ParamBinding>,
}

impl RouteEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Number of path segments this route consumes.
    pub fn arity(&self) -> usize {
        self.bindings
            .iter()
            .filter(|b| matches!(b, ParamBinding::Positional { .. }))
            .count()
    }

    pub fn has_subroute(&self) -> bool {
        self.bindings
            .iter()
            .any(|b| matches!(b, ParamBinding::Subroute))
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("name", &self.name)
            .field("is_default", &self.is_default)
            .field("arity", &self.arity())
            .finish()
    }
}

/// Immutable name-to-route mapping with an optional default route.
///
/// Route names are case-sensitive and unique; the first path segment selects
/// the entry. Built once, read-only thereafter.
pub struct RouteTable {
    by_name: HashMap<String, RouteEntry>,
    default_route: Option<String>,
}

impl RouteTable {
    /// Validate the definitions and resolve every declared type through the
    /// registry.
    pub fn build(
        routes: Vec<RouteDefinition>,
        registry: &CoercionRegistry,
    ) -> Result<Self, BuildError> {
        let mut by_name = HashMap::with_capacity(routes.len());
        let mut default_route: Option<String> = None;

        for definition in routes {
            let entry = compile(definition, registry)?;
            let name = entry.name().to_string();

            if entry.is_default() {
                if let Some(first) = &default_route {
                    return Err(BuildError::DuplicateDefault(first.clone(), name));
                }
                default_route = Some(name.clone());
            }

            tracing::debug!(route = %name, default = entry.is_default(), "route registered");
            if by_name.insert(name.clone(), entry).is_some() {
                return Err(BuildError::DuplicateRoute(name));
            }
        }

        Ok(Self {
            by_name,
            default_route,
        })
    }

    /// Look up a route by name.
    pub fn get(&self, name: &str) -> Option<&RouteEntry> {
        self.by_name.get(name)
    }

    /// The route invoked for an empty path, if one was marked.
    pub fn default_route(&self) -> Option<&RouteEntry> {
        self.default_route.as_deref().and_then(|name| self.by_name.get(name))
    }

    pub fn has_default(&self) -> bool {
        self.default_route.is_some()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Iterate over all registered routes, in no particular order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteEntry> {
        self.by_name.values()
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.by_name.len())
            .field("default_route", &self.default_route)
            .finish()
    }
}

/// Validate one definition and resolve its coercions.
fn compile(
    definition: RouteDefinition,
    registry: &CoercionRegistry,
) -> Result<RouteEntry, BuildError> {
    let route = definition.name;
    let param_count = definition.params.len();
    let mut bindings = Vec::with_capacity(param_count);
    let mut bag_seen = false;
    let mut request_seen = false;

    for (index, param) in definition.params.into_iter().enumerate() {
        match param {
            ParamDefinition::Positional { name, ty } => {
                if RESERVED_NAMES.contains(&name.as_str()) {
                    return Err(BuildError::ReservedNameMisuse {
                        route,
                        name,
                        role: "positional",
                    });
                }
                let coercer = registry.get(&ty).cloned().ok_or_else(|| {
                    BuildError::InvalidParameterType {
                        route: route.clone(),
                        param: name.clone(),
                        ty: ty.name(),
                    }
                })?;
                bindings.push(ParamBinding::Positional {
                    name: CompactString::new(&name),
                    coercer,
                });
            }
            ParamDefinition::Params { fields } => {
                if bag_seen {
                    return Err(BuildError::InvalidRoute {
                        route,
                        reason: "more than one params parameter".to_string(),
                    });
                }
                bag_seen = true;
                let mut resolved: Vec<(CompactString, Coercer)> = Vec::with_capacity(fields.len());
                for field in fields {
                    if resolved
                        .iter()
                        .any(|(name, _)| name.as_str() == field.name.as_str())
                    {
                        return Err(BuildError::InvalidRoute {
                            route,
                            reason: format!("duplicate params field `{}`", field.name),
                        });
                    }
                    let coercer = registry.get(&field.ty).cloned().ok_or_else(|| {
                        BuildError::InvalidParameterType {
                            route: route.clone(),
                            param: field.name.clone(),
                            ty: field.ty.name(),
                        }
                    })?;
                    resolved.push((CompactString::new(&field.name), coercer));
                }
                bindings.push(ParamBinding::Bag { fields: resolved });
            }
            ParamDefinition::Request => {
                if request_seen {
                    return Err(BuildError::InvalidRoute {
                        route,
                        reason: "more than one request parameter".to_string(),
                    });
                }
                request_seen = true;
                bindings.push(ParamBinding::Request);
            }
            ParamDefinition::Subroute => {
                if index + 1 != param_count {
                    return Err(BuildError::InvalidRoute {
                        route,
                        reason: "subroute parameter must be last".to_string(),
                    });
                }
                bindings.push(ParamBinding::Subroute);
            }
        }
    }

    Ok(RouteEntry {
        name: CompactString::new(&route),
        is_default: definition.is_default,
        bindings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::Field;

    fn registry() -> CoercionRegistry {
        CoercionRegistry::new()
    }

    #[test]
    fn test_build_keys_match_route_names() {
        let table = RouteTable::build(
            vec![
                RouteDefinition::new("find").positional::<i64>("x"),
                RouteDefinition::new("list"),
                RouteDefinition::new("index").as_default(),
            ],
            &registry(),
        )
        .unwrap();

        assert_eq!(table.len(), 3);
        let mut names: Vec<&str> = table.routes().map(|r| r.name()).collect();
        names.sort_unstable();
        assert_eq!(names, ["find", "index", "list"]);
        assert!(table.has_default());
        assert_eq!(table.default_route().unwrap().name(), "index");
    }

    #[test]
    fn test_route_names_are_case_sensitive() {
        let table = RouteTable::build(
            vec![RouteDefinition::new("Find"), RouteDefinition::new("find")],
            &registry(),
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.get("Find").is_some());
        assert!(table.get("FIND").is_none());
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let err = RouteTable::build(
            vec![RouteDefinition::new("find"), RouteDefinition::new("find")],
            &registry(),
        )
        .unwrap_err();
        assert_eq!(err, BuildError::DuplicateRoute("find".to_string()));
    }

    #[test]
    fn test_duplicate_default_rejected() {
        let err = RouteTable::build(
            vec![
                RouteDefinition::new("a").as_default(),
                RouteDefinition::new("b").as_default(),
            ],
            &registry(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BuildError::DuplicateDefault("a".to_string(), "b".to_string())
        );
    }

    #[test]
    fn test_reserved_names_rejected_positionally() {
        for reserved in RESERVED_NAMES {
            let err = RouteTable::build(
                vec![RouteDefinition::new("find").positional::<String>(reserved)],
                &registry(),
            )
            .unwrap_err();
            assert!(matches!(err, BuildError::ReservedNameMisuse { .. }));
        }
    }

    #[test]
    fn test_unregistered_type_rejected() {
        struct Opaque;

        let err = RouteTable::build(
            vec![RouteDefinition::new("find").positional::<Opaque>("x")],
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BuildError::InvalidParameterType { ref param, .. } if param == "x"
        ));

        let err = RouteTable::build(
            vec![RouteDefinition::new("find").params([Field::new::<Opaque>("y")])],
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BuildError::InvalidParameterType { ref param, .. } if param == "y"
        ));
    }

    #[test]
    fn test_role_multiplicity_rejected() {
        let err = RouteTable::build(
            vec![RouteDefinition::new("find").request().request()],
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::InvalidRoute { .. }));

        let err = RouteTable::build(
            vec![
                RouteDefinition::new("find")
                    .params([Field::new::<i64>("y")])
                    .params([Field::new::<i64>("z")]),
            ],
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::InvalidRoute { .. }));
    }

    #[test]
    fn test_subroute_must_be_last() {
        let err = RouteTable::build(
            vec![
                RouteDefinition::new("api")
                    .subroute()
                    .positional::<i64>("x"),
            ],
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::InvalidRoute { .. }));

        // Trailing subroute is fine.
        let table = RouteTable::build(
            vec![
                RouteDefinition::new("api")
                    .positional::<i64>("version")
                    .subroute(),
            ],
            &registry(),
        )
        .unwrap();
        let entry = table.get("api").unwrap();
        assert!(entry.has_subroute());
        assert_eq!(entry.arity(), 1);
    }

    #[test]
    fn test_duplicate_bag_field_rejected() {
        let err = RouteTable::build(
            vec![
                RouteDefinition::new("find")
                    .params([Field::new::<i64>("y"), Field::new::<bool>("y")]),
            ],
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::InvalidRoute { .. }));
    }
}
