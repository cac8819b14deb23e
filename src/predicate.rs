//! The predicate data model.
//!
//! A [`Predicate`] is a small recursive sum type. Combinators (`$all`, `$any`,
//! `$not`) and value operators (`$exists`, `$in`, `$contains`) are explicit
//! variants, so a mapping that mixes a `$all` key with ordinary property keys
//! has no representation at all. Every type serializes back to exactly the
//! JSON shape it was decoded from, and deserializes through the validating
//! [`Decoder`](crate::decode::Decoder).

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::decode::{DecodeError, Decoder, KeyPath};

pub const ALL: &str = "$all";
pub const ANY: &str = "$any";
pub const NOT: &str = "$not";
pub const EXISTS: &str = "$exists";
pub const IN: &str = "$in";
pub const CONTAINS: &str = "$contains";

/// Keys starting with this character are reserved for operators.
pub const OPERATOR_PREFIX: char = '$';

pub fn is_operator(key: &str) -> bool {
    key.starts_with(OPERATOR_PREFIX)
}

// ------------- Primitive -------------
/// A bare string, number or boolean.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicatePrimitive {
    String(String),
    Number(Number),
    Bool(bool),
}

impl PredicatePrimitive {
    /// Returns `None` for anything that is not a string, number or boolean.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::Bool(b) => Some(Self::Bool(*b)),
            _ => None,
        }
    }
    pub fn to_value(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Bool(b) => Value::Bool(*b),
        }
    }
}

impl From<&str> for PredicatePrimitive {
    fn from(s: &str) -> Self { Self::String(s.to_string()) }
}
impl From<String> for PredicatePrimitive {
    fn from(s: String) -> Self { Self::String(s) }
}
impl From<bool> for PredicatePrimitive {
    fn from(b: bool) -> Self { Self::Bool(b) }
}
impl From<i64> for PredicatePrimitive {
    fn from(n: i64) -> Self { Self::Number(n.into()) }
}

// ------------- Value -------------
/// The right-hand side of a property match inside a [`PredicateExpression`].
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateValue {
    Primitive(PredicatePrimitive),
    /// `{ $exists: bool }`
    Exists(bool),
    /// `{ $in: [primitive, ...] }`
    In(Vec<PredicatePrimitive>),
    /// `{ $contains: predicate }`
    Contains(Box<Predicate>),
}

impl PredicateValue {
    pub fn to_value(&self) -> Value {
        match self {
            Self::Primitive(p) => p.to_value(),
            Self::Exists(b) => operator(EXISTS, Value::Bool(*b)),
            Self::In(items) => operator(
                IN,
                Value::Array(items.iter().map(PredicatePrimitive::to_value).collect()),
            ),
            Self::Contains(p) => operator(CONTAINS, p.to_value()),
        }
    }
}

impl From<PredicatePrimitive> for PredicateValue {
    fn from(p: PredicatePrimitive) -> Self { Self::Primitive(p) }
}
impl From<&str> for PredicateValue {
    fn from(s: &str) -> Self { Self::Primitive(s.into()) }
}
impl From<String> for PredicateValue {
    fn from(s: String) -> Self { Self::Primitive(s.into()) }
}
impl From<bool> for PredicateValue {
    fn from(b: bool) -> Self { Self::Primitive(b.into()) }
}
impl From<i64> for PredicateValue {
    fn from(n: i64) -> Self { Self::Primitive(n.into()) }
}

// ------------- Expression -------------
/// Property matches keyed by (possibly dotted) property path.
///
/// No key may start with `$`; [`PredicateExpression::insert`] refuses them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PredicateExpression {
    properties: BTreeMap<String, PredicateValue>,
}

impl PredicateExpression {
    pub fn new() -> Self {
        Self::default()
    }
    /// Keys are checked by the decoder before they get here.
    pub(crate) fn from_checked(properties: BTreeMap<String, PredicateValue>) -> Self {
        Self { properties }
    }
    /// Adds a property match, returning the value it replaced.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PredicateValue>,
    ) -> Result<Option<PredicateValue>, DecodeError> {
        let key = key.into();
        if is_operator(&key) {
            return Err(DecodeError::new(
                &KeyPath::root().join_key(&key),
                format!("property keys must not start with '{OPERATOR_PREFIX}'"),
            ));
        }
        Ok(self.properties.insert(key, value.into()))
    }
    pub fn get(&self, key: &str) -> Option<&PredicateValue> {
        self.properties.get(key)
    }
    pub fn iter(&self) -> btree_map::Iter<'_, String, PredicateValue> {
        self.properties.iter()
    }
    pub fn len(&self) -> usize {
        self.properties.len()
    }
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.properties
                .iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect::<Map<String, Value>>(),
        )
    }
}

impl<'a> IntoIterator for &'a PredicateExpression {
    type Item = (&'a String, &'a PredicateValue);
    type IntoIter = btree_map::Iter<'a, String, PredicateValue>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ------------- Predicate -------------
/// A boolean-matching expression tree over object properties.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Expression(PredicateExpression),
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
    Not(Box<Predicate>),
    Primitive(PredicatePrimitive),
}

impl Predicate {
    pub fn not(inner: Predicate) -> Self {
        Self::Not(Box::new(inner))
    }
    /// Short name of the variant, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Expression(_) => "expression",
            Self::All(_) => ALL,
            Self::Any(_) => ANY,
            Self::Not(_) => NOT,
            Self::Primitive(_) => "primitive",
        }
    }
    /// The JSON shape this predicate was (or would be) read from.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Expression(e) => e.to_value(),
            Self::All(items) => operator(ALL, Value::Array(items.iter().map(Self::to_value).collect())),
            Self::Any(items) => operator(ANY, Value::Array(items.iter().map(Self::to_value).collect())),
            Self::Not(inner) => operator(NOT, inner.to_value()),
            Self::Primitive(p) => p.to_value(),
        }
    }
}

impl From<PredicateExpression> for Predicate {
    fn from(e: PredicateExpression) -> Self { Self::Expression(e) }
}
impl From<PredicatePrimitive> for Predicate {
    fn from(p: PredicatePrimitive) -> Self { Self::Primitive(p) }
}

impl TryFrom<&Value> for Predicate {
    type Error = DecodeError;
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Decoder::new().predicate(value)
    }
}
impl TryFrom<Value> for Predicate {
    type Error = DecodeError;
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Decoder::new().predicate(&value)
    }
}

fn operator(key: &str, operand: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), operand);
    Value::Object(map)
}

// ------------- serde -------------
macro_rules! json_shaped {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                self.to_value().serialize(serializer)
            }
        }
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_value())
            }
        }
    };
}

json_shaped!(Predicate);
json_shaped!(PredicateValue);
json_shaped!(PredicateExpression);
json_shaped!(PredicatePrimitive);

impl<'de> Deserialize<'de> for Predicate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Decoder::new().predicate(&raw).map_err(D::Error::custom)
    }
}

impl<'de> Deserialize<'de> for PredicateValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Decoder::new().predicate_value(&raw).map_err(D::Error::custom)
    }
}
