//! Requirement rules: nested schema conformance and non-zero data
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use protoform_core::{Error, FieldError, FieldValue, Protocol, Schema, Validator, ValidatorError};
use std::sync::Arc;

/// Value must validate against a schema
///
/// Every check builds a fresh [`Protocol`] from the value's JSON form, so one
/// rule can be shared by any number of fields and threads.
#[derive(Debug, Clone)]
pub struct ProtoRequired {
    schema: Arc<Schema>,
}

impl ProtoRequired {
    pub fn new(schema: &Arc<Schema>) -> Self {
        Self {
            schema: Arc::clone(schema),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn rejected(&self, error: FieldError) -> ValidatorError {
        ValidatorError::invalid(format!(
            "Must be a valid value of {}: {}",
            self.schema.name(),
            error
        ))
    }
}

impl Validator for ProtoRequired {
    fn validate(&self, value: &FieldValue) -> std::result::Result<(), ValidatorError> {
        let mut protocol = match Protocol::new(&self.schema, &value.to_json()) {
            Ok(protocol) => protocol,
            Err(Error::NotAMapping { .. }) => {
                return Err(self.rejected(FieldError::reason("Not a valid dict value")))
            }
            Err(err) => {
                log::warn!("Schema '{}' could not be instantiated: {}", self.schema.name(), err);
                return Err(ValidatorError::Unsupported {
                    validator: self.name(),
                    found: value.kind(),
                });
            }
        };

        match protocol.validate() {
            Ok(true) => Ok(()),
            Ok(false) => Err(self.rejected(FieldError::Nested(protocol.error()))),
            Err(err) => {
                log::warn!("Schema '{}' is misconfigured: {}", self.schema.name(), err);
                Err(ValidatorError::Unsupported {
                    validator: self.name(),
                    found: value.kind(),
                })
            }
        }
    }

    fn name(&self) -> &'static str {
        "ProtoRequired"
    }
}

/// Value must not be a zero value
///
/// Null, `false`, `0`, `0.0` and empty text, lists or maps are rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataRequired;

impl Validator for DataRequired {
    fn validate(&self, value: &FieldValue) -> std::result::Result<(), ValidatorError> {
        if value.is_zero() {
            Err(ValidatorError::invalid("The value is required"))
        } else {
            Ok(())
        }
    }

    fn name(&self) -> &'static str {
        "DataRequired"
    }
}
