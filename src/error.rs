use thiserror::Error;

/// Errors raised while reading a predicate out of configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PredicateError {
    #[error("Missing required predicate in config at '{key}'")]
    MissingKey { key: String },
    #[error("Invalid predicate in config at '{key}': {reason} (at {path})")]
    InvalidPredicate { key: String, path: String, reason: String },
    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PredicateError>;

// Helper conversions
impl From<config::ConfigError> for PredicateError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
