//! Type coercion engine.
//!
//! Converts raw path segments and bag values into the argument types a route
//! declares. Every declared type resolves to a [`Coercer`] exactly once, when
//! the route table is built; the dispatch path then applies plain function
//! calls with no further type lookup.
//!
//! # Literal grammars
//!
//! | Target   | Accepted raw strings                                        |
//! |----------|-------------------------------------------------------------|
//! | `String` | anything (identity)                                         |
//! | `i64`    | optional `+`/`-`, then ASCII digits; nothing else           |
//! | `f64`    | decimal or exponential literal, e.g. `-1.5`, `2e10`         |
//! | `bool`   | `true`/`false`, case-insensitive                            |
//!
//! Raw bag values that already carry the target kind pass through unchanged;
//! an `Int` raw widens losslessly into a `Float` target. Any other kind
//! mismatch is rejected.

use crate::error::CoerceError;
use crate::value::Value;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ========== Primitive kinds ==========

/// The four primitive shapes a raw input can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Str,
    Int,
    Float,
    Bool,
}

impl Primitive {
    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::Str => "string",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Bool => "bool",
        }
    }

    /// Coerce a raw value into this primitive kind.
    pub fn coerce(self, raw: &Value) -> Result<Value, CoerceError> {
        match (self, raw) {
            (Primitive::Str, Value::Str(_)) => Ok(raw.clone()),
            (Primitive::Int, Value::Int(_)) => Ok(raw.clone()),
            (Primitive::Float, Value::Float(_)) => Ok(raw.clone()),
            (Primitive::Float, Value::Int(n)) => Ok(Value::Float(*n as f64)),
            (Primitive::Bool, Value::Bool(_)) => Ok(raw.clone()),
            (Primitive::Int, Value::Str(s)) => {
                parse_int(s).map(Value::Int).ok_or_else(|| CoerceError::new(self.as_str(), s))
            }
            (Primitive::Float, Value::Str(s)) => {
                parse_float(s).map(Value::Float).ok_or_else(|| CoerceError::new(self.as_str(), s))
            }
            (Primitive::Bool, Value::Str(s)) => {
                parse_bool(s).map(Value::Bool).ok_or_else(|| CoerceError::new(self.as_str(), s))
            }
            _ => Err(CoerceError::new(self.as_str(), raw.to_string())),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ========== Literal parsers ==========

/// Optional sign followed by one or more ASCII digits; no whitespace, no
/// fractional part.
fn parse_int(s: &str) -> Option<i64> {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Standard decimal or exponential literal. Rejects the extra spellings
/// `f64::from_str` would accept (`inf`, `NaN`, leading whitespace).
fn parse_float(s: &str) -> Option<f64> {
    if !is_float_literal(s) {
        return None;
    }
    s.parse().ok()
}

fn is_float_literal(s: &str) -> bool {
    let rest = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match rest.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e)),
        None => (rest, None),
    };
    let mantissa_ok = match mantissa.split_once('.') {
        Some((whole, frac)) => {
            (!whole.is_empty() || !frac.is_empty())
                && whole.bytes().all(|b| b.is_ascii_digit())
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
        None => !mantissa.is_empty() && mantissa.bytes().all(|b| b.is_ascii_digit()),
    };
    let exponent_ok = match exponent {
        Some(e) => {
            let e = e.strip_prefix(['+', '-']).unwrap_or(e);
            !e.is_empty() && e.bytes().all(|b| b.is_ascii_digit())
        }
        None => true,
    };
    mantissa_ok && exponent_ok
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

// ========== Wrapper types ==========

/// A Rust type corresponding to one of the four primitive kinds.
///
/// Implemented for `String`, `i64`, `f64`, and `bool`; used as the parse
/// stage of a wrapper coercion.
pub trait FromValue: Sized + Send + 'static {
    /// The primitive kind this type is parsed from.
    const PRIMITIVE: Primitive;

    /// Extract the typed value out of an already-coerced [`Value`].
    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for String {
    const PRIMITIVE: Primitive = Primitive::Str;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const PRIMITIVE: Primitive = Primitive::Int;

    fn from_value(value: Value) -> Option<Self> {
        value.as_int()
    }
}

impl FromValue for f64 {
    const PRIMITIVE: Primitive = Primitive::Float;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(x),
            _ => None,
        }
    }
}

impl FromValue for bool {
    const PRIMITIVE: Primitive = Primitive::Bool;

    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }
}

/// A domain wrapper type constructible from a single primitive.
///
/// Raw input is first parsed as [`Coerce::Source`] under the primitive's
/// literal grammar, then handed to [`Coerce::coerce`]. Both stages run as one
/// pre-composed call per parameter; a failure in either surfaces to the
/// caller as an invalid-value dispatch error.
///
/// ```
/// use gantry_core::Coerce;
///
/// struct UserId(i64);
///
/// impl Coerce for UserId {
///     type Source = i64;
///
///     fn coerce(source: i64) -> Result<Self, String> {
///         if source > 0 {
///             Ok(UserId(source))
///         } else {
///             Err(format!("{} is not a valid user id", source))
///         }
///     }
/// }
/// ```
pub trait Coerce: Sized + Send + 'static {
    /// The primitive representation parsed before conversion.
    type Source: FromValue;

    /// Convert the parsed primitive into the wrapper value.
    fn coerce(source: Self::Source) -> Result<Self, String>;
}

// ========== Resolved coercions ==========

/// A coerced argument: a plain primitive or a boxed wrapper value.
pub enum Coerced {
    Value(Value),
    Wrapped(Box<dyn Any + Send>),
}

impl fmt::Debug for Coerced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coerced::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Coerced::Wrapped(_) => f.debug_tuple("Wrapped").field(&"..").finish(),
        }
    }
}

type CoerceFn = Arc<dyn Fn(Value) -> Result<Coerced, CoerceError> + Send + Sync>;

/// A coercion resolved against one declared parameter type.
///
/// Cheap to clone; the table stores one per positional parameter and bag
/// field.
#[derive(Clone)]
pub struct Coercer {
    target: &'static str,
    apply: CoerceFn,
}

impl Coercer {
    pub(crate) fn primitive(kind: Primitive) -> Self {
        Self {
            target: kind.as_str(),
            apply: Arc::new(move |raw| kind.coerce(&raw).map(Coerced::Value)),
        }
    }

    pub(crate) fn wrapper<W: Coerce>() -> Self {
        Self {
            target: std::any::type_name::<W>(),
            apply: Arc::new(|raw| {
                let parsed = W::Source::PRIMITIVE.coerce(&raw)?;
                let source = match W::Source::from_value(parsed) {
                    Some(source) => source,
                    None => {
                        return Err(CoerceError::new(
                            std::any::type_name::<W>(),
                            raw.to_string(),
                        ));
                    }
                };
                match W::coerce(source) {
                    Ok(wrapped) => Ok(Coerced::Wrapped(Box::new(wrapped))),
                    Err(reason) => {
                        tracing::debug!(ty = std::any::type_name::<W>(), %reason, "wrapper conversion failed");
                        Err(CoerceError::new(
                            std::any::type_name::<W>(),
                            raw.to_string(),
                        ))
                    }
                }
            }),
        }
    }

    /// The name of the type this coercion produces.
    pub fn target(&self) -> &'static str {
        self.target
    }

    /// Run the coercion against a raw value.
    pub fn apply(&self, raw: Value) -> Result<Coerced, CoerceError> {
        (self.apply)(raw)
    }
}

impl fmt::Debug for Coercer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coercer").field("target", &self.target).finish()
    }
}

// ========== Registry ==========

/// A declared argument type: the key into the coercion registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Registry of coercions keyed by declared argument type.
///
/// Pre-populated with the four primitives (`String`, `i64`, `f64`, `bool`);
/// wrapper types are added through [`CoercionRegistry::register`]. The
/// registry is consulted only while a route table is built.
pub struct CoercionRegistry {
    by_type: HashMap<TypeId, Coercer>,
}

impl CoercionRegistry {
    pub fn new() -> Self {
        let mut by_type = HashMap::new();
        by_type.insert(TypeId::of::<String>(), Coercer::primitive(Primitive::Str));
        by_type.insert(TypeId::of::<i64>(), Coercer::primitive(Primitive::Int));
        by_type.insert(TypeId::of::<f64>(), Coercer::primitive(Primitive::Float));
        by_type.insert(TypeId::of::<bool>(), Coercer::primitive(Primitive::Bool));
        Self { by_type }
    }

    /// Register a wrapper type's coercion.
    pub fn register<W: Coerce>(&mut self) {
        self.by_type.insert(TypeId::of::<W>(), Coercer::wrapper::<W>());
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.by_type.contains_key(&key.id)
    }

    pub(crate) fn get(&self, key: &TypeKey) -> Option<&Coercer> {
        self.by_type.get(&key.id)
    }
}

impl Default for CoercionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_grammar() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("-7"), Some(-7));
        assert_eq!(parse_int("+5"), Some(5));
        assert_eq!(parse_int("0"), Some(0));

        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("+"), None);
        assert_eq!(parse_int("--5"), None);
        assert_eq!(parse_int("1.5"), None);
        assert_eq!(parse_int(" 42"), None);
        assert_eq!(parse_int("42 "), None);
        assert_eq!(parse_int("0x10"), None);
        assert_eq!(parse_int("bar"), None);
    }

    #[test]
    fn test_float_grammar() {
        assert_eq!(parse_float("-1.5"), Some(-1.5));
        assert_eq!(parse_float("2e10"), Some(2e10));
        assert_eq!(parse_float("2E-3"), Some(2e-3));
        assert_eq!(parse_float(".5"), Some(0.5));
        assert_eq!(parse_float("5."), Some(5.0));
        assert_eq!(parse_float("42"), Some(42.0));

        assert_eq!(parse_float(""), None);
        assert_eq!(parse_float("."), None);
        assert_eq!(parse_float("1.5e"), None);
        assert_eq!(parse_float("e10"), None);
        assert_eq!(parse_float("inf"), None);
        assert_eq!(parse_float("NaN"), None);
        assert_eq!(parse_float(" 1.5"), None);
        assert_eq!(parse_float("1,5"), None);
    }

    #[test]
    fn test_bool_grammar() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("False"), Some(false));

        assert_eq!(parse_bool("1"), None);
        assert_eq!(parse_bool("yes"), None);
        assert_eq!(parse_bool("true "), None);
    }

    #[test]
    fn test_primitive_pass_through() {
        assert_eq!(
            Primitive::Int.coerce(&Value::Int(4)).unwrap(),
            Value::Int(4)
        );
        assert_eq!(
            Primitive::Float.coerce(&Value::Int(4)).unwrap(),
            Value::Float(4.0)
        );
        assert_eq!(
            Primitive::Bool.coerce(&Value::Bool(true)).unwrap(),
            Value::Bool(true)
        );
        assert!(Primitive::Int.coerce(&Value::Float(1.5)).is_err());
        assert!(Primitive::Str.coerce(&Value::Int(4)).is_err());
        assert!(Primitive::Bool.coerce(&Value::Int(1)).is_err());
    }

    #[test]
    fn test_round_trip_canonical_forms() {
        for raw in ["42", "-7", "0"] {
            let coerced = Primitive::Int.coerce(&Value::from(raw)).unwrap();
            assert_eq!(coerced.to_string(), raw);
        }
        for raw in ["-1.5", "0.25"] {
            let coerced = Primitive::Float.coerce(&Value::from(raw)).unwrap();
            assert_eq!(coerced.to_string(), raw);
        }
    }

    struct Positive(i64);

    impl Coerce for Positive {
        type Source = i64;

        fn coerce(source: i64) -> Result<Self, String> {
            if source > 0 {
                Ok(Positive(source))
            } else {
                Err("must be positive".to_string())
            }
        }
    }

    #[test]
    fn test_wrapper_coercion_composes() {
        let coercer = Coercer::wrapper::<Positive>();
        match coercer.apply(Value::from("42")).unwrap() {
            Coerced::Wrapped(boxed) => {
                let positive = boxed.downcast::<Positive>().unwrap();
                assert_eq!(positive.0, 42);
            }
            Coerced::Value(_) => panic!("expected a wrapped value"),
        }
    }

    #[test]
    fn test_wrapper_coercion_fails_in_either_stage() {
        let coercer = Coercer::wrapper::<Positive>();
        // Parse stage: not an int literal.
        assert!(coercer.apply(Value::from("bar")).is_err());
        // Conversion stage: parses but is rejected by the wrapper.
        assert!(coercer.apply(Value::from("-3")).is_err());
    }

    #[test]
    fn test_registry_primitives_preloaded() {
        let registry = CoercionRegistry::new();
        assert!(registry.contains(&TypeKey::of::<String>()));
        assert!(registry.contains(&TypeKey::of::<i64>()));
        assert!(registry.contains(&TypeKey::of::<f64>()));
        assert!(registry.contains(&TypeKey::of::<bool>()));
        assert!(!registry.contains(&TypeKey::of::<Vec<u8>>()));
    }

    #[test]
    fn test_registry_register_wrapper() {
        let mut registry = CoercionRegistry::new();
        assert!(!registry.contains(&TypeKey::of::<Positive>()));
        registry.register::<Positive>();
        assert!(registry.contains(&TypeKey::of::<Positive>()));

        let coercer = registry.get(&TypeKey::of::<Positive>()).unwrap();
        assert!(coercer.target().contains("Positive"));
    }
}
