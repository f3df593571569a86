//! Role-based argument binding.
//!
//! The binder walks a route's resolved parameter list in declaration order
//! against the segment cursor, the params bag, and the request context. No
//! segment is skipped or reordered: binding consumes exactly as many
//! segments as the route declares positional parameters, and a trailing
//! subroute parameter receives whatever is left.

use crate::coerce::Coerced;
use crate::error::DispatchError;
use crate::subroute::Subroute;
use crate::table::{ParamBinding, RouteEntry};
use crate::value::{Bag, Value};
use compact_str::CompactString;
use std::any::Any;
use std::collections::HashMap;

/// One bound argument, in declaration order.
pub enum BoundArg<C> {
    /// A coerced primitive.
    Value(Value),
    /// A coerced wrapper value.
    Wrapped(Box<dyn Any + Send>),
    /// The validated params bag.
    Params(BoundParams),
    /// The request context, passed through unchanged.
    Request(C),
    /// Deferred nested dispatch over the unconsumed tail.
    Subroute(Subroute<C>),
}

impl<C> std::fmt::Debug for BoundArg<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundArg::Value(value) => f.debug_tuple("Value").field(value).finish(),
            BoundArg::Wrapped(_) => f.debug_tuple("Wrapped").finish(),
            BoundArg::Params(params) => f.debug_tuple("Params").field(params).finish(),
            BoundArg::Request(_) => f.debug_tuple("Request").finish(),
            BoundArg::Subroute(_) => f.debug_tuple("Subroute").finish(),
        }
    }
}

impl<C> From<Coerced> for BoundArg<C> {
    fn from(coerced: Coerced) -> Self {
        match coerced {
            Coerced::Value(value) => BoundArg::Value(value),
            Coerced::Wrapped(boxed) => BoundArg::Wrapped(boxed),
        }
    }
}

/// Bind a route's parameters. Failures surface exactly as dispatch reports
/// them: too few segments is a miss for the whole path, a rejected value
/// names the parameter and the raw input.
pub(crate) fn bind<C: Clone>(
    entry: &RouteEntry,
    segments: &[&str],
    bag: &Bag,
    ctx: &C,
    path: &str,
    depth: usize,
) -> Result<Vec<BoundArg<C>>, DispatchError> {
    let mut args = Vec::with_capacity(entry.bindings.len());
    let mut cursor = segments.iter();

    for binding in &entry.bindings {
        match binding {
            ParamBinding::Positional { name, coercer } => {
                let Some(segment) = cursor.next() else {
                    tracing::debug!(route = %entry.name(), %path, "not enough segments");
                    return Err(DispatchError::NotFound(path.to_string()));
                };
                let coerced = coercer.apply(Value::from(*segment)).map_err(|err| {
                    tracing::debug!(param = %name, raw = %segment, %err, "segment rejected");
                    DispatchError::InvalidValue {
                        param: name.to_string(),
                        raw: (*segment).to_string(),
                    }
                })?;
                args.push(BoundArg::from(coerced));
            }
            ParamBinding::Bag { fields } => {
                args.push(BoundArg::Params(bind_bag(entry.name(), fields, bag)?));
            }
            ParamBinding::Request => {
                args.push(BoundArg::Request(ctx.clone()));
            }
            ParamBinding::Subroute => {
                // Last by construction; the cursor is drained into the tail.
                let rest: Vec<String> = cursor.clone().map(|s| s.to_string()).collect();
                args.push(BoundArg::Subroute(Subroute::new(
                    rest,
                    ctx.clone(),
                    depth + 1,
                )));
                break;
            }
        }
    }

    // Segments the route cannot account for are a miss, not dropped input.
    if !entry.has_subroute() && cursor.next().is_some() {
        tracing::debug!(route = %entry.name(), %path, "unconsumed segments");
        return Err(DispatchError::NotFound(path.to_string()));
    }

    Ok(args)
}

fn bind_bag(
    route: &str,
    fields: &[(CompactString, crate::coerce::Coercer)],
    bag: &Bag,
) -> Result<BoundParams, DispatchError> {
    let mut bound = HashMap::with_capacity(fields.len());
    for (name, coercer) in fields {
        let Some(raw) = bag.get(name) else {
            tracing::debug!(field = %name, "bag field absent");
            return Err(DispatchError::InvalidValue {
                param: name.to_string(),
                raw: String::new(),
            });
        };
        let coerced = coercer.apply(raw.clone()).map_err(|err| {
            tracing::debug!(field = %name, raw = %raw, %err, "bag field rejected");
            DispatchError::InvalidValue {
                param: name.to_string(),
                raw: raw.to_string(),
            }
        })?;
        bound.insert(name.to_string(), coerced);
    }
    Ok(BoundParams {
        route: CompactString::new(route),
        fields: bound,
    })
}

/// The validated, coerced params bag handed to a route.
#[derive(Debug)]
pub struct BoundParams {
    route: CompactString,
    fields: HashMap<String, Coerced>,
}

impl BoundParams {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn field(&self, name: &str, expected: &str) -> Result<&Coerced, DispatchError> {
        self.fields.get(name).ok_or_else(|| {
            DispatchError::signature(&self.route, format!("{} field `{}`", expected, name))
        })
    }

    pub fn str(&self, name: &str) -> Result<&str, DispatchError> {
        match self.field(name, "a string")? {
            Coerced::Value(Value::Str(s)) => Ok(s),
            _ => Err(DispatchError::signature(
                &self.route,
                format!("a string field `{}`", name),
            )),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64, DispatchError> {
        match self.field(name, "an int")? {
            Coerced::Value(Value::Int(n)) => Ok(*n),
            _ => Err(DispatchError::signature(
                &self.route,
                format!("an int field `{}`", name),
            )),
        }
    }

    pub fn float(&self, name: &str) -> Result<f64, DispatchError> {
        match self.field(name, "a float")? {
            Coerced::Value(Value::Float(x)) => Ok(*x),
            _ => Err(DispatchError::signature(
                &self.route,
                format!("a float field `{}`", name),
            )),
        }
    }

    pub fn boolean(&self, name: &str) -> Result<bool, DispatchError> {
        match self.field(name, "a bool")? {
            Coerced::Value(Value::Bool(b)) => Ok(*b),
            _ => Err(DispatchError::signature(
                &self.route,
                format!("a bool field `{}`", name),
            )),
        }
    }

    /// Take a wrapper-typed field out of the bag.
    pub fn wrapped<T: 'static>(&mut self, name: &str) -> Result<T, DispatchError> {
        let expected = std::any::type_name::<T>();
        match self.fields.remove(name) {
            Some(Coerced::Wrapped(boxed)) => match boxed.downcast::<T>() {
                Ok(wrapped) => Ok(*wrapped),
                Err(boxed) => {
                    // Put it back; the name was right but the type was not.
                    self.fields.insert(name.to_string(), Coerced::Wrapped(boxed));
                    Err(DispatchError::signature(
                        &self.route,
                        format!("a `{}` field `{}`", expected, name),
                    ))
                }
            },
            Some(other) => {
                self.fields.insert(name.to_string(), other);
                Err(DispatchError::signature(
                    &self.route,
                    format!("a `{}` field `{}`", expected, name),
                ))
            }
            None => Err(DispatchError::signature(
                &self.route,
                format!("a `{}` field `{}`", expected, name),
            )),
        }
    }
}

/// Cursor over a route's bound arguments, consumed in declaration order.
///
/// Handed to [`Controller::invoke`](crate::routing::Controller::invoke);
/// each accessor pops the next argument and checks it against the shape the
/// route definition declared.
pub struct Args<C> {
    route: CompactString,
    values: std::vec::IntoIter<BoundArg<C>>,
}

impl<C> Args<C> {
    pub(crate) fn new(route: &str, values: Vec<BoundArg<C>>) -> Self {
        Self {
            route: CompactString::new(route),
            values: values.into_iter(),
        }
    }

    /// The resolved route name.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Arguments not yet consumed.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    fn next_arg(&mut self, expected: &str) -> Result<BoundArg<C>, DispatchError> {
        self.values
            .next()
            .ok_or_else(|| DispatchError::signature(&self.route, expected.to_string()))
    }

    pub fn str(&mut self) -> Result<String, DispatchError> {
        match self.next_arg("a string")? {
            BoundArg::Value(Value::Str(s)) => Ok(s),
            _ => Err(DispatchError::signature(&self.route, "a string")),
        }
    }

    pub fn int(&mut self) -> Result<i64, DispatchError> {
        match self.next_arg("an int")? {
            BoundArg::Value(Value::Int(n)) => Ok(n),
            _ => Err(DispatchError::signature(&self.route, "an int")),
        }
    }

    pub fn float(&mut self) -> Result<f64, DispatchError> {
        match self.next_arg("a float")? {
            BoundArg::Value(Value::Float(x)) => Ok(x),
            _ => Err(DispatchError::signature(&self.route, "a float")),
        }
    }

    pub fn boolean(&mut self) -> Result<bool, DispatchError> {
        match self.next_arg("a bool")? {
            BoundArg::Value(Value::Bool(b)) => Ok(b),
            _ => Err(DispatchError::signature(&self.route, "a bool")),
        }
    }

    /// Pop a wrapper-typed argument.
    pub fn wrapped<T: 'static>(&mut self) -> Result<T, DispatchError> {
        let expected = std::any::type_name::<T>();
        match self.next_arg(expected)? {
            BoundArg::Wrapped(boxed) => boxed
                .downcast::<T>()
                .map(|wrapped| *wrapped)
                .map_err(|_| DispatchError::signature(&self.route, format!("a `{}`", expected))),
            _ => Err(DispatchError::signature(
                &self.route,
                format!("a `{}`", expected),
            )),
        }
    }

    /// Pop the validated params bag.
    pub fn params(&mut self) -> Result<BoundParams, DispatchError> {
        match self.next_arg("the params bag")? {
            BoundArg::Params(params) => Ok(params),
            _ => Err(DispatchError::signature(&self.route, "the params bag")),
        }
    }

    /// Pop the request context.
    pub fn request(&mut self) -> Result<C, DispatchError> {
        match self.next_arg("the request context")? {
            BoundArg::Request(ctx) => Ok(ctx),
            _ => Err(DispatchError::signature(&self.route, "the request context")),
        }
    }

    /// Pop the subroute handle.
    pub fn subroute(&mut self) -> Result<Subroute<C>, DispatchError> {
        match self.next_arg("the subroute")? {
            BoundArg::Subroute(subroute) => Ok(subroute),
            _ => Err(DispatchError::signature(&self.route, "the subroute")),
        }
    }
}
