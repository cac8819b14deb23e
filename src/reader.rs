//! Entry points for reading a predicate out of configuration.

use tracing::{debug, trace};

use crate::decode::{DEFAULT_MAX_DEPTH, Decoder};
use crate::error::{PredicateError, Result};
use crate::predicate::Predicate;
use crate::source::ConfigNode;

/// Where to find the predicate, and how deep it may nest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Dotted key path beneath the node. `None` reads the node itself.
    pub key: Option<String>,
    pub max_depth: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self { key: None, max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
    fn location(&self) -> &str {
        self.key.as_deref().unwrap_or("<root>")
    }
}

/// Reads a predicate that must be present.
///
/// Fails with [`PredicateError::MissingKey`] when nothing is configured at the
/// requested key, and with [`PredicateError::InvalidPredicate`] when the value
/// does not have the shape of a predicate.
pub fn read_predicate_from_config<N>(node: &N, options: &ReadOptions) -> Result<Predicate>
where
    N: ConfigNode + ?Sized,
{
    read_optional_predicate_from_config(node, options)?.ok_or_else(|| PredicateError::MissingKey {
        key: options.location().to_string(),
    })
}

/// Reads a predicate if one is configured. Absence is fine, a malformed value is not.
pub fn read_optional_predicate_from_config<N>(
    node: &N,
    options: &ReadOptions,
) -> Result<Option<Predicate>>
where
    N: ConfigNode + ?Sized,
{
    let raw = match options.key.as_deref() {
        Some(key) => node.value_at(key)?,
        None => node.value()?,
    };
    let Some(raw) = raw else {
        trace!(key = options.location(), "no predicate configured");
        return Ok(None);
    };

    let predicate = Decoder::new()
        .with_max_depth(options.max_depth)
        .predicate(&raw)
        .map_err(|e| PredicateError::InvalidPredicate {
            key: options.location().to_string(),
            path: e.path.to_string(),
            reason: e.reason,
        })?;
    debug!(key = options.location(), kind = predicate.kind(), "read predicate from config");
    Ok(Some(predicate))
}
