//! Catalog predicates – reading declarative match expressions out of configuration.
//!
//! A *predicate* is a small boolean-matching expression tree over the
//! properties of a catalog entity:
//! * An expression `{ kind: 'component', 'spec.type': 'service' }` matches each
//!   property against a [`predicate::PredicateValue`].
//! * The combinators `$all`, `$any` and `$not` compose sub-predicates.
//! * Property values are primitives or one of `$exists`, `$in`, `$contains`.
//! * A bare string, number or boolean is itself a predicate.
//!
//! This crate only reads and validates predicates; matching them against data
//! is left to consumers.
//!
//! ## Modules
//! * [`predicate`] – The typed model, serializing back to its input shape.
//! * [`decode`] – Recursive-descent validation with key-path diagnostics.
//! * [`source`] – The [`source::ConfigNode`] contract, implemented for
//!   `serde_json::Value` and `config::Config`.
//! * [`reader`] – The two entry points, required and optional.
//! * [`catalog`] – Entity glue (label presence).
//!
//! ## Quick Start
//! ```
//! use catalog_predicates::{read_predicate_from_config, ReadOptions};
//! use serde_json::json;
//! let config = json!({ "filter": { "$any": [{ "kind": "component" }, { "kind": "api" }] } });
//! let predicate = read_predicate_from_config(&config, &ReadOptions::new().with_key("filter")).unwrap();
//! assert_eq!(predicate.to_value(), config["filter"]);
//! ```

pub mod catalog;
pub mod decode;
pub mod error;
pub mod predicate;
pub mod reader;
pub mod source;

pub use catalog::{Entity, EntityMetadata, has_labels};
pub use decode::{DEFAULT_MAX_DEPTH, DecodeError, Decoder, KeyPath, decode_predicate};
pub use error::{PredicateError, Result};
pub use predicate::{Predicate, PredicateExpression, PredicatePrimitive, PredicateValue};
pub use reader::{ReadOptions, read_optional_predicate_from_config, read_predicate_from_config};
pub use source::ConfigNode;
