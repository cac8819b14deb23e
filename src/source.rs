//! Configuration sources a predicate can be read from.
//!
//! The reader only needs two capabilities from a configuration tree: the raw
//! value of a node, and the raw value at a dotted key path beneath it.
//! [`ConfigNode`] captures exactly that, and is implemented for an in-memory
//! [`serde_json::Value`] tree as well as for a layered [`config::Config`].

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::decode::type_name;
use crate::error::{PredicateError, Result};

lazy_static! {
    // one segment of a dotted config key, e.g. `catalog` or `entity-filter`
    static ref KEY_SEGMENT: Regex =
        Regex::new(r"(?i)^[a-z][a-z0-9]*(?:[-_][a-z][a-z0-9]*)*$").expect("valid key regex");
}

pub trait ConfigNode {
    /// Raw value of this node, `None` when it holds nothing.
    fn value(&self) -> Result<Option<Value>>;
    /// Raw value at a dotted key path beneath this node, `None` when absent.
    fn value_at(&self, key: &str) -> Result<Option<Value>>;
}

/// Splits a dotted key into its segments, rejecting malformed keys.
pub fn split_key(key: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = key.split('.').collect();
    if segments.iter().all(|segment| KEY_SEGMENT.is_match(segment)) {
        Ok(segments)
    } else {
        Err(PredicateError::Config(format!("Invalid config key '{key}'")))
    }
}

// An explicit null counts as no value.
fn present(value: Value) -> Option<Value> {
    if value.is_null() { None } else { Some(value) }
}

impl ConfigNode for Value {
    fn value(&self) -> Result<Option<Value>> {
        Ok(present(self.clone()))
    }

    fn value_at(&self, key: &str) -> Result<Option<Value>> {
        let segments = split_key(key)?;
        let mut node = self;
        for (i, segment) in segments.iter().enumerate() {
            node = match node {
                Value::Object(map) => match map.get(*segment) {
                    Some(child) => child,
                    None => return Ok(None),
                },
                Value::Null => return Ok(None),
                other => {
                    let parent = if i == 0 { "<root>".to_string() } else { segments[..i].join(".") };
                    return Err(PredicateError::Config(format!(
                        "Invalid type in config for key '{parent}', got {}, wanted object",
                        type_name(other)
                    )));
                }
            };
        }
        Ok(present(node.clone()))
    }
}

impl ConfigNode for config::Config {
    fn value(&self) -> Result<Option<Value>> {
        let root: Value = self.clone().try_deserialize()?;
        Ok(present(root))
    }

    fn value_at(&self, key: &str) -> Result<Option<Value>> {
        split_key(key)?;
        match self.get::<Value>(key) {
            Ok(value) => Ok(present(value)),
            Err(config::ConfigError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl<T: ConfigNode + ?Sized> ConfigNode for &T {
    fn value(&self) -> Result<Option<Value>> {
        (**self).value()
    }
    fn value_at(&self, key: &str) -> Result<Option<Value>> {
        (**self).value_at(key)
    }
}
