//! Primitive values and the params bag.
//!
//! A [`Bag`] is the flat, caller-supplied map of primitive values that a
//! route's reserved `params` parameter is validated against. Values keep
//! their primitive kind until binding, when each declared field's coercion
//! runs against them.

use crate::coerce::Primitive;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A primitive value: the only shapes a bag field or raw input can take.
///
/// The untagged serde representation means a bag round-trips through JSON in
/// the natural form, e.g. `{"y": 4, "label": "hi"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// The primitive kind of this value.
    pub fn kind(&self) -> Primitive {
        match self {
            Value::Bool(_) => Primitive::Bool,
            Value::Int(_) => Primitive::Int,
            Value::Float(_) => Primitive::Float,
            Value::Str(_) => Primitive::Str,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as a float. `Int` widens losslessly.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Renders the canonical literal form: re-coercing the output yields an
/// equal value.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(f64::from(x))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// The params bag: a flat map of primitive values supplied per dispatch.
///
/// The engine never mutates a bag; it is read field-by-field when a route
/// declares a `params` parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bag(HashMap<String, Value>);

impl Bag {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Insert a field, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Bag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Build a [`Bag`] from field/value pairs.
///
/// ```
/// use gantry_core::bag;
///
/// let params = bag! { y: 4, label: "hi" };
/// assert_eq!(params.len(), 2);
/// ```
#[macro_export]
macro_rules! bag {
    () => { $crate::Bag::new() };
    ($($key:ident : $value:expr),+ $(,)?) => {{
        let mut bag = $crate::Bag::new();
        $(bag.insert(stringify!($key), $value);)+
        bag
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kinds() {
        assert_eq!(Value::from(true).kind(), Primitive::Bool);
        assert_eq!(Value::from(4).kind(), Primitive::Int);
        assert_eq!(Value::from(2.5).kind(), Primitive::Float);
        assert_eq!(Value::from("x").kind(), Primitive::Str);
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::from(4).as_int(), Some(4));
        assert_eq!(Value::from(4).as_float(), Some(4.0));
        assert_eq!(Value::from(2.5).as_float(), Some(2.5));
        assert_eq!(Value::from(2.5).as_int(), None);
        assert_eq!(Value::from("hi").as_str(), Some("hi"));
        assert_eq!(Value::from(false).as_bool(), Some(false));
    }

    #[test]
    fn test_value_display_is_canonical() {
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from(-1.5).to_string(), "-1.5");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from("baz").to_string(), "baz");
    }

    #[test]
    fn test_bag_insert_and_get() {
        let mut bag = Bag::new();
        bag.insert("y", 4).insert("name", "test");

        assert_eq!(bag.len(), 2);
        assert_eq!(bag.get("y"), Some(&Value::Int(4)));
        assert_eq!(bag.get("name"), Some(&Value::Str("test".into())));
        assert_eq!(bag.get("missing"), None);
    }

    #[test]
    fn test_bag_macro() {
        let bag = bag! { y: 4, ratio: 0.5, on: true, label: "hi" };
        assert_eq!(bag.get("y"), Some(&Value::Int(4)));
        assert_eq!(bag.get("ratio"), Some(&Value::Float(0.5)));
        assert_eq!(bag.get("on"), Some(&Value::Bool(true)));
        assert_eq!(bag.get("label"), Some(&Value::Str("hi".into())));

        let empty = bag! {};
        assert!(empty.is_empty());
    }

    #[test]
    fn test_bag_from_iterator() {
        let bag: Bag = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(bag.get("a"), Some(&Value::Int(1)));
        assert_eq!(bag.get("b"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_bag_json_round_trip() {
        let bag = bag! { y: 4, label: "hi", ratio: 0.5 };
        let json = serde_json::to_value(&bag).unwrap();
        assert_eq!(json["y"], serde_json::json!(4));
        assert_eq!(json["label"], serde_json::json!("hi"));

        let back: Bag = serde_json::from_value(json).unwrap();
        assert_eq!(back, bag);
    }
}
