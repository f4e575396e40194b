//! Error types for the Protoform core library
//!
//! Two kinds of failure exist in this crate and they never mix:
//!
//! - **Data errors** (missing fields, bad conversions, rule violations,
//!   cross-field rejections) are captured into a [`FieldError`] tree and
//!   reported through `Ok(false)` results and the protocol's error view.
//! - **Crate errors** ([`Error`]) signal that the caller handed over something
//!   that is not a mapping, or that the schema itself is broken.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Main error type for Protoform operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Protocol input was not a mapping
    #[error("Data must be a mapping, found {found}")]
    NotAMapping { found: &'static str },

    /// Malformed schema or validator configuration, detected at construction
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A validator hit a value it cannot handle; the schema is broken, not the data
    #[error("Validator defect in {validator}: {message}")]
    Defect { validator: String, message: String },
}

impl Error {
    /// Shorthand for a configuration error
    pub fn configuration<M: Into<String>>(message: M) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error tree keyed by canonical field name
pub type ErrorTree = BTreeMap<String, FieldError>;

/// The recorded failure of a single field
///
/// Scalar fields carry a plain reason. List fields locate the failing element
/// with its index, nested-schema fields carry the child protocol's whole tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldError {
    /// Human-readable failure reason
    Reason(String),
    /// Failure of the element at the given index
    Indexed(usize, Box<FieldError>),
    /// Failures of a nested schema
    Nested(ErrorTree),
}

impl FieldError {
    /// Create a plain reason
    pub fn reason<R: Into<String>>(reason: R) -> Self {
        FieldError::Reason(reason.into())
    }

    /// Wrap an element error with its index
    pub fn indexed(index: usize, error: FieldError) -> Self {
        FieldError::Indexed(index, Box::new(error))
    }

    /// Whether this error carries any information
    ///
    /// A nested tree with no entries is how a child protocol reports "no error".
    pub fn is_empty(&self) -> bool {
        match self {
            FieldError::Reason(reason) => reason.is_empty(),
            FieldError::Indexed(..) => false,
            FieldError::Nested(tree) => tree.is_empty(),
        }
    }

    /// The innermost reason, following indices and the first nested entry
    pub fn root_reason(&self) -> Option<&str> {
        match self {
            FieldError::Reason(reason) => Some(reason),
            FieldError::Indexed(_, inner) => inner.root_reason(),
            FieldError::Nested(tree) => tree.values().next().and_then(FieldError::root_reason),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Reason(reason) => write!(f, "{}", reason),
            FieldError::Indexed(index, inner) => write!(f, "[{}] {}", index, inner),
            FieldError::Nested(tree) => {
                write!(f, "{{")?;
                for (i, (name, error)) in tree.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, error)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for FieldError {
    fn from(reason: &str) -> Self {
        FieldError::Reason(reason.to_string())
    }
}

impl From<String> for FieldError {
    fn from(reason: String) -> Self {
        FieldError::Reason(reason)
    }
}
