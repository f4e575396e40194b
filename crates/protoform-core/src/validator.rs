//! The Validator contract and validator chains
//!
//! A validator is a stateless predicate over an already-converted value. It
//! either passes, rejects the value with a reason ([`ValidatorError::Invalid`]),
//! or reports that it was handed a value it cannot judge at all
//! ([`ValidatorError::Unsupported`]). The latter is a schema defect: fields
//! turn it into [`Error::Defect`] instead of recording it as a data error.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::value::{FieldValue, ValueKind};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Outcome of a failed validator check
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidatorError {
    /// The value was understood and rejected
    #[error("{0}")]
    Invalid(String),

    /// The validator cannot judge values of this kind
    #[error("{validator} cannot check a {found} value")]
    Unsupported {
        validator: &'static str,
        found: ValueKind,
    },
}

impl ValidatorError {
    /// Shorthand for a rejection
    pub fn invalid<R: Into<String>>(reason: R) -> Self {
        ValidatorError::Invalid(reason.into())
    }
}

/// A single reusable rule attached to a field
///
/// Implementations hold only construction-time parameters, so a single
/// instance is shared by every field instantiated from the same template.
pub trait Validator: fmt::Debug + Send + Sync {
    /// Check a converted value
    fn validate(&self, value: &FieldValue) -> std::result::Result<(), ValidatorError>;

    /// Short name used in defect reports
    fn name(&self) -> &'static str;
}

/// Ordered validator chain of a field
///
/// Cloning a chain shares the validators themselves.
#[derive(Debug, Clone, Default)]
pub struct ValidatorChain {
    validators: Vec<Arc<dyn Validator>>,
}

impl ValidatorChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validator
    pub fn push(&mut self, validator: Arc<dyn Validator>) {
        self.validators.push(validator);
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Run the chain in order
    ///
    /// Returns `Ok(None)` when every validator passes, `Ok(Some(reason))` for the
    /// first rejection, and `Err(Error::Defect)` when a validator cannot handle
    /// the value.
    pub fn check(&self, value: &FieldValue) -> Result<Option<String>> {
        for validator in &self.validators {
            match validator.validate(value) {
                Ok(()) => continue,
                Err(ValidatorError::Invalid(reason)) => return Ok(Some(reason)),
                Err(err @ ValidatorError::Unsupported { .. }) => {
                    log::warn!("Validator '{}' is misconfigured for its field: {}", validator.name(), err);
                    return Err(Error::Defect {
                        validator: validator.name().to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }
        Ok(None)
    }
}

impl<V: Validator + 'static> From<V> for ValidatorChain {
    fn from(validator: V) -> Self {
        let mut chain = ValidatorChain::new();
        chain.push(Arc::new(validator));
        chain
    }
}
