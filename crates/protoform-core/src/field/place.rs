//! Placeholder field: pre-transform a raw value, then hand it to another field
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::{Field, FieldBuilder, FieldOptions, FieldState, ValidatedField};
use crate::error::{FieldError, Result};
use crate::validator::ValidatorChain;
use crate::value::FieldValue;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

const HANDLER_FAILED: &str = "The value processed error";

/// Raw-value transform applied before delegation, e.g. decoding an embedded JSON string
pub type Handler = Arc<dyn Fn(&Value) -> anyhow::Result<Value> + Send + Sync>;

/// Applies an optional [`Handler`] and delegates to an optional inner field
///
/// Without an inner field the handler output itself becomes the value. With
/// one, value and error read through to it.
pub struct PlaceField {
    field: Option<Box<dyn Field>>,
    handler: Option<Handler>,
    options: FieldOptions,
    validators: ValidatorChain,
    state: FieldState,
}

impl PlaceField {
    pub fn new() -> Self {
        Self {
            field: None,
            handler: None,
            options: FieldOptions::default(),
            validators: ValidatorChain::new(),
            state: FieldState::default(),
        }
    }

    /// Delegate processing and validation to `field`
    pub fn field<F: Field + 'static>(mut self, field: F) -> Self {
        self.field = Some(Box::new(field));
        self
    }

    /// Transform the raw value first
    pub fn handler<H>(mut self, handler: H) -> Self
    where
        H: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// The inner field, if configured
    pub fn inner(&self) -> Option<&dyn Field> {
        self.field.as_deref()
    }
}

impl Default for PlaceField {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PlaceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaceField")
            .field("field", &self.field)
            .field("handler", &self.handler.as_ref().map(|_| "<fn>"))
            .field("options", &self.options)
            .field("validators", &self.validators)
            .field("state", &self.state)
            .finish()
    }
}

impl FieldBuilder for PlaceField {
    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }
}

impl ValidatedField for PlaceField {
    fn validators_mut(&mut self) -> &mut ValidatorChain {
        &mut self.validators
    }
}

impl Field for PlaceField {
    fn kind(&self) -> &'static str {
        "place"
    }

    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn process(&mut self, raw: &Value) -> bool {
        self.state.reset();

        let converted = match &self.handler {
            Some(handler) => match handler(raw) {
                Ok(converted) => converted,
                Err(err) => {
                    log::debug!("place field handler rejected input: {:#}", err);
                    return self.state.fail(HANDLER_FAILED);
                }
            },
            None => raw.clone(),
        };

        match self.field.as_mut() {
            Some(field) => {
                if field.process(&converted) {
                    true
                } else {
                    let cause = field.error().unwrap_or_else(|| FieldError::reason(""));
                    self.state.fail(cause)
                }
            }
            None => {
                self.state.value = Some(FieldValue::from(converted));
                true
            }
        }
    }

    fn validate(&mut self) -> Result<bool> {
        if let Some(field) = self.field.as_mut() {
            if !field.validate()? {
                let cause = field.error().unwrap_or_else(|| FieldError::reason(""));
                return Ok(self.state.fail(cause));
            }
        }
        let value = self.value();
        self.state.check(&self.validators, &value)
    }

    fn value(&self) -> FieldValue {
        match (&self.state.value, &self.field) {
            (Some(value), _) => value.clone(),
            (None, Some(field)) => field.value(),
            (None, None) => FieldValue::Null,
        }
    }

    fn set_value(&mut self, value: FieldValue) {
        self.state.value = Some(value);
    }

    fn error(&self) -> Option<FieldError> {
        self.state
            .error
            .clone()
            .or_else(|| self.field.as_ref().and_then(|field| field.error()))
    }

    fn set_error(&mut self, error: FieldError) {
        self.state.error = Some(error);
    }

    fn instantiate(&self) -> Box<dyn Field> {
        Box::new(Self {
            field: self.field.as_ref().map(|field| field.instantiate()),
            handler: self.handler.clone(),
            options: self.options.clone(),
            validators: self.validators.clone(),
            state: FieldState::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldList, IntegerField};
    use anyhow::Context;
    use serde_json::json;

    fn decode_json(raw: &Value) -> anyhow::Result<Value> {
        let text = raw.as_str().context("expected a JSON string")?;
        Ok(serde_json::from_str(text)?)
    }

    #[test]
    fn test_handler_output_becomes_value() {
        let mut field = PlaceField::new().handler(|raw: &Value| {
            let text = raw.as_str().context("not a string")?;
            Ok(Value::from(text.trim().parse::<i64>()?))
        });
        assert!(field.process(&json!("1")));
        assert!(field.validate().unwrap());
        assert_eq!(field.value(), FieldValue::Int(1));
    }

    #[test]
    fn test_handler_failure_is_a_data_error() {
        let mut field = PlaceField::new().handler(decode_json);
        assert!(!field.process(&json!("{not json")));
        assert_eq!(field.error(), Some(FieldError::reason("The value processed error")));
    }

    #[test]
    fn test_delegates_to_inner_field() {
        let mut field = PlaceField::new()
            .handler(decode_json)
            .field(FieldList::new(IntegerField::default()));
        assert!(field.process(&json!("[\"4\", 5]")));
        assert!(field.validate().unwrap());
        assert_eq!(field.value().to_json(), json!([4, 5]));
    }

    #[test]
    fn test_inner_field_error_reads_through() {
        let mut field = PlaceField::new()
            .handler(decode_json)
            .field(FieldList::new(IntegerField::default()));
        assert!(!field.process(&json!("[\"x\"]")));
        assert_eq!(
            field.error(),
            Some(FieldError::indexed(0, FieldError::reason("Not a valid int value")))
        );
    }

    #[test]
    fn test_without_handler_passes_raw_value() {
        let mut field = PlaceField::new();
        assert!(field.process(&json!({"k": [1, 2]})));
        assert_eq!(field.value().to_json(), json!({"k": [1, 2]}));
    }

    #[test]
    fn test_instantiate_copies_inner_field() {
        let template = PlaceField::new().field(IntegerField::default());
        let mut a = template.instantiate();
        let b = template.instantiate();
        assert!(a.process(&json!("3")));
        assert_eq!(a.value(), FieldValue::Int(3));
        assert_eq!(b.value(), FieldValue::Null);
        assert!(template.inner().is_some());
    }
}
