//! Field hierarchy: conversion plus validation of a single schema slot
//!
//! Every field follows the same two-phase pipeline:
//!
//! 1. `process(raw)` converts the raw JSON value into a typed [`FieldValue`].
//!    Bad input records a fixed reason and returns `false`.
//! 2. `validate()` runs the validator chain against the converted value. The
//!    first rejection wins and becomes the field's error.
//!
//! Fields declared on a [`Schema`](crate::Schema) are templates. A protocol
//! never mutates a template; it calls [`Field::instantiate`] to get a fresh,
//! unprocessed deep copy first.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod list;
pub mod nested;
pub mod place;
pub mod scalar;

pub use list::{DedupOrder, FieldList, UniqueFieldList};
pub use nested::ProtocolField;
pub use place::{Handler, PlaceField};
pub use scalar::{
    AsBoolean, AsDateTime, AsFloat, AsInteger, AsLimitedText, AsString, AsText, BooleanField,
    Conversion, DateTimeField, FloatField, IntegerField, LengthLimitTextField, ScalarField,
    StringField, TextField,
};

use crate::error::{FieldError, Result};
use crate::validator::{Validator, ValidatorChain};
use crate::value::FieldValue;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Reason recorded by a protocol when a required field is missing
pub const REQUIRED_REASON: &str = "The field is required";

/// Construction parameters shared by every field variant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOptions {
    /// Raw value processed in place of a missing input when the field is not nullable
    pub default: Option<Value>,
    /// Whether a missing or null input is acceptable
    pub nullable: bool,
    /// With `nullable`, drop a missing input from the output instead of keeping `null`
    pub discard: bool,
}

impl FieldOptions {
    /// The default value, if one is set and not null
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref().filter(|value| !value.is_null())
    }
}

/// A schema slot that converts and validates one raw value
pub trait Field: fmt::Debug + Send + Sync {
    /// Variant name, e.g. `"integer"` or `"list"`
    fn kind(&self) -> &'static str;

    /// Construction parameters
    fn options(&self) -> &FieldOptions;

    /// Convert a raw value, recording the reason on failure
    fn process(&mut self, raw: &Value) -> bool;

    /// Run the validator chain against the converted value
    ///
    /// `Ok(false)` means the data was rejected and [`Field::error`] says why.
    /// `Err` means a validator could not handle the value at all.
    fn validate(&mut self) -> Result<bool>;

    /// Current typed value; `Null` while unprocessed
    fn value(&self) -> FieldValue;

    /// Overwrite the current value
    fn set_value(&mut self, value: FieldValue);

    /// Current failure, if any
    fn error(&self) -> Option<FieldError>;

    /// Record a failure
    fn set_error(&mut self, error: FieldError);

    /// Independent unprocessed copy with the same construction parameters
    fn instantiate(&self) -> Box<dyn Field>;
}

/// Builder methods for [`FieldOptions`]
pub trait FieldBuilder: Sized {
    fn options_mut(&mut self) -> &mut FieldOptions;

    /// Accept a missing or null input
    fn nullable(mut self) -> Self {
        self.options_mut().nullable = true;
        self
    }

    /// Drop a missing input from the output; used together with [`FieldBuilder::nullable`]
    fn discard(mut self) -> Self {
        self.options_mut().discard = true;
        self
    }

    /// Raw value to process when the input is missing
    fn default_value<V: Into<Value>>(mut self, raw: V) -> Self {
        self.options_mut().default = Some(raw.into());
        self
    }
}

/// Builder methods for fields carrying a validator chain
pub trait ValidatedField: FieldBuilder {
    fn validators_mut(&mut self) -> &mut ValidatorChain;

    /// Append a validator to the chain
    fn validator<V: Validator + 'static>(self, validator: V) -> Self {
        self.shared_validator(Arc::new(validator))
    }

    /// Append a validator that is already shared with other fields
    fn shared_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validators_mut().push(validator);
        self
    }
}

/// Mutable per-instance state of a field
#[derive(Debug, Clone, Default)]
pub(crate) struct FieldState {
    pub(crate) value: Option<FieldValue>,
    pub(crate) error: Option<FieldError>,
}

impl FieldState {
    pub(crate) fn reset(&mut self) {
        self.value = None;
        self.error = None;
    }

    pub(crate) fn fail<E: Into<FieldError>>(&mut self, error: E) -> bool {
        self.error = Some(error.into());
        false
    }

    /// Run a chain over `value`, recording the first rejection
    pub(crate) fn check(&mut self, chain: &ValidatorChain, value: &FieldValue) -> Result<bool> {
        match chain.check(value)? {
            None => Ok(true),
            Some(reason) => Ok(self.fail(reason)),
        }
    }
}
