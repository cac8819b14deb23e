//! Recursive-descent validation of raw configuration values into predicates.
//!
//! The decoder walks an untyped [`serde_json::Value`] and either returns the
//! typed [`Predicate`] or the first violation it finds, together with the key
//! path leading to it (`$any[1].kind`). Input is never modified.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::predicate::{
    ALL, ANY, CONTAINS, EXISTS, IN, NOT, Predicate, PredicateExpression, PredicatePrimitive,
    PredicateValue, is_operator,
};

/// Nesting limit applied unless the caller picks another one.
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Location of a node inside a predicate, relative to the predicate root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPath(Vec<Segment>);

impl KeyPath {
    pub fn root() -> Self {
        Self::default()
    }
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
    pub fn join_key(&self, key: &str) -> Self {
        let mut path = self.clone();
        path.0.push(Segment::Key(key.to_string()));
        path
    }
    pub fn join_index(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.0.push(Segment::Index(index));
        path
    }
    // Runs `f` with `segment` appended, restoring the path afterwards.
    fn scoped<T>(
        &mut self,
        segment: Segment,
        f: impl FnOnce(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<T, DecodeError> {
        self.0.push(segment);
        let result = f(self);
        self.0.pop();
        result
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Key(key) if key.is_empty() || key.contains(['.', '[', ']', '"']) => {
                    write!(f, "[{key:?}]")?
                }
                Segment::Key(key) if i == 0 => write!(f, "{key}")?,
                Segment::Key(key) => write!(f, ".{key}")?,
            }
        }
        Ok(())
    }
}

/// The first structural violation found in a predicate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason} at {path}")]
pub struct DecodeError {
    pub path: KeyPath,
    pub reason: String,
}

impl DecodeError {
    pub fn new(path: &KeyPath, reason: impl Into<String>) -> Self {
        Self { path: path.clone(), reason: reason.into() }
    }
}

/// Validating decoder for [`Predicate`] and [`PredicateValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoder {
    max_depth: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn predicate(&self, value: &Value) -> Result<Predicate, DecodeError> {
        self.read_predicate(value, &mut KeyPath::root(), 0)
    }

    pub fn predicate_value(&self, value: &Value) -> Result<PredicateValue, DecodeError> {
        self.read_value(value, &mut KeyPath::root(), 0)
    }

    fn check_depth(&self, path: &KeyPath, depth: usize) -> Result<(), DecodeError> {
        if depth > self.max_depth {
            return Err(DecodeError::new(
                path,
                format!("predicate nesting exceeds the maximum depth of {}", self.max_depth),
            ));
        }
        Ok(())
    }

    fn read_predicate(
        &self,
        value: &Value,
        path: &mut KeyPath,
        depth: usize,
    ) -> Result<Predicate, DecodeError> {
        self.check_depth(path, depth)?;
        if let Some(primitive) = PredicatePrimitive::from_value(value) {
            return Ok(Predicate::Primitive(primitive));
        }
        let Value::Object(map) = value else {
            return Err(DecodeError::new(
                path,
                format!("expected a string, number, boolean or object, got {}", type_name(value)),
            ));
        };
        if !map.keys().any(|key| is_operator(key)) {
            return self.read_expression(map, path, depth).map(Predicate::Expression);
        }

        let (op, operand) = single_operator(map, path)?;
        path.scoped(Segment::Key(op.to_string()), |path| match op {
            ALL | ANY => {
                let items = self.read_list(operand, path, depth)?;
                Ok(if op == ALL { Predicate::All(items) } else { Predicate::Any(items) })
            }
            NOT => Ok(Predicate::not(self.read_predicate(operand, path, depth + 1)?)),
            EXISTS | IN | CONTAINS => Err(DecodeError::new(
                path,
                format!("'{op}' is only allowed as a property value"),
            )),
            _ => Err(DecodeError::new(path, format!("unknown operator '{op}'"))),
        })
    }

    fn read_list(
        &self,
        operand: &Value,
        path: &mut KeyPath,
        depth: usize,
    ) -> Result<Vec<Predicate>, DecodeError> {
        let Value::Array(items) = operand else {
            return Err(DecodeError::new(
                path,
                format!("expected an array of predicates, got {}", type_name(operand)),
            ));
        };
        let mut predicates = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let predicate =
                path.scoped(Segment::Index(index), |path| self.read_predicate(item, path, depth + 1))?;
            predicates.push(predicate);
        }
        Ok(predicates)
    }

    fn read_expression(
        &self,
        map: &Map<String, Value>,
        path: &mut KeyPath,
        depth: usize,
    ) -> Result<PredicateExpression, DecodeError> {
        let mut properties = BTreeMap::new();
        for (key, raw) in map {
            let value =
                path.scoped(Segment::Key(key.clone()), |path| self.read_value(raw, path, depth + 1))?;
            properties.insert(key.clone(), value);
        }
        Ok(PredicateExpression::from_checked(properties))
    }

    fn read_value(
        &self,
        value: &Value,
        path: &mut KeyPath,
        depth: usize,
    ) -> Result<PredicateValue, DecodeError> {
        self.check_depth(path, depth)?;
        if let Some(primitive) = PredicatePrimitive::from_value(value) {
            return Ok(PredicateValue::Primitive(primitive));
        }
        let map = match value {
            Value::Object(map) if map.keys().any(|key| is_operator(key)) => map,
            Value::Object(_) => {
                return Err(DecodeError::new(
                    path,
                    format!("nested objects must use one of {EXISTS}, {IN} or {CONTAINS}"),
                ));
            }
            other => {
                return Err(DecodeError::new(
                    path,
                    format!("expected a string, number, boolean or operator, got {}", type_name(other)),
                ));
            }
        };

        let (op, operand) = single_operator(map, path)?;
        path.scoped(Segment::Key(op.to_string()), |path| match op {
            EXISTS => match operand {
                Value::Bool(b) => Ok(PredicateValue::Exists(*b)),
                other => Err(DecodeError::new(
                    path,
                    format!("expected a boolean, got {}", type_name(other)),
                )),
            },
            IN => {
                let Value::Array(items) = operand else {
                    return Err(DecodeError::new(
                        path,
                        format!("expected an array of primitives, got {}", type_name(operand)),
                    ));
                };
                let mut primitives = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let primitive = PredicatePrimitive::from_value(item).ok_or_else(|| {
                        DecodeError::new(
                            &path.join_index(index),
                            format!("expected a string, number or boolean, got {}", type_name(item)),
                        )
                    })?;
                    primitives.push(primitive);
                }
                Ok(PredicateValue::In(primitives))
            }
            CONTAINS => Ok(PredicateValue::Contains(Box::new(
                self.read_predicate(operand, path, depth + 1)?,
            ))),
            ALL | ANY | NOT => Err(DecodeError::new(
                path,
                format!("'{op}' is not allowed as a property value, wrap it in {CONTAINS}"),
            )),
            _ => Err(DecodeError::new(path, format!("unknown operator '{op}'"))),
        })
    }
}

/// Decodes with the default depth limit.
pub fn decode_predicate(value: &Value) -> Result<Predicate, DecodeError> {
    Decoder::new().predicate(value)
}

// An operator object holds exactly one `$` key and nothing else.
fn single_operator<'v>(
    map: &'v Map<String, Value>,
    path: &KeyPath,
) -> Result<(&'v str, &'v Value), DecodeError> {
    let mut entries = map.iter();
    match (entries.next(), entries.next()) {
        (Some((key, operand)), None) => Ok((key.as_str(), operand)),
        _ => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            Err(DecodeError::new(
                path,
                format!("an operator must be the only key in its object, found [{}]", keys.join(", ")),
            ))
        }
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
