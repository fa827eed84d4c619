//! Error types for the rule engine.
//!
//! Two classes of failure exist:
//!
//! - **Configuration errors** — a rule references a property path that does
//!   not resolve against the domain model, or an accessor cannot be built
//!   for a `(type, property)` pair. These indicate a programming error in
//!   the rule declarations or the model and are never retried.
//! - **Recursion limit exceeded** — the cascade went deeper than the
//!   configured limit, which almost always means a circular rule
//!   dependency. The in-flight call is aborted; writes already applied by
//!   earlier cascade levels are kept (no rollback).

use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A property path selector could not be parsed
    #[error("invalid property path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A type does not expose the requested property
    #[error("type '{type_name}' has no property '{property}'")]
    UnknownProperty {
        type_name: String,
        property: String,
    },

    /// A path segment addressed as a composite is a scalar or absent
    #[error("property '{property}' of type '{type_name}' is not a composite")]
    NotComposite {
        type_name: String,
        property: String,
    },

    /// A value of the wrong kind was written to a property
    #[error("cannot assign {actual} value to property '{property}' of type '{type_name}' (expected {expected})")]
    TypeMismatch {
        type_name: String,
        property: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A rule declaration was finished without a value computer
    #[error("rule targeting '{target}' has no value computer")]
    IncompleteRule { target: String },

    /// The cascade exceeded the configured recursion limit
    #[error("recursion limit {limit} exceeded at depth {depth} while cascading '{trigger}': probable circular dependency")]
    RecursionLimitExceeded {
        limit: u32,
        depth: u32,
        trigger: String,
    },

    /// A configuration file could not be read
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed
    #[error("invalid config file: {0}")]
    InvalidConfig(#[from] serde_yaml::Error),
}

impl EngineError {
    /// True for errors caused by rule declarations or the domain model
    /// rather than by runtime data.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidPath { .. }
                | EngineError::UnknownProperty { .. }
                | EngineError::NotComposite { .. }
                | EngineError::TypeMismatch { .. }
                | EngineError::IncompleteRule { .. }
        )
    }
}
