//! Nested-schema field: a mapping value validated by a whole child protocol
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::{Field, FieldBuilder, FieldOptions};
use crate::error::{FieldError, Result};
use crate::protocol::{Protocol, Schema};
use crate::value::FieldValue;
use serde_json::Value;
use std::sync::Arc;

const NOT_A_MAPPING: &str = "Not a valid dict value";

/// Delegates a mapping value to a child [`Protocol`] of `schema`
///
/// The exposed value is the child's cleaned data and the exposed error is the
/// child's error tree, unless an error was recorded on this field directly.
#[derive(Debug)]
pub struct ProtocolField {
    schema: Arc<Schema>,
    options: FieldOptions,
    protocol: Option<Protocol>,
    /// The child protocol's last validate pass returned `false`
    rejected: bool,
    assigned: Option<FieldValue>,
    error: Option<FieldError>,
}

impl ProtocolField {
    pub fn new(schema: &Arc<Schema>) -> Self {
        Self {
            schema: Arc::clone(schema),
            options: FieldOptions::default(),
            protocol: None,
            rejected: false,
            assigned: None,
            error: None,
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The child protocol built by the last successful `process`
    pub fn protocol(&self) -> Option<&Protocol> {
        self.protocol.as_ref()
    }
}

impl FieldBuilder for ProtocolField {
    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }
}

impl Field for ProtocolField {
    fn kind(&self) -> &'static str {
        "protocol"
    }

    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn process(&mut self, raw: &Value) -> bool {
        self.protocol = None;
        self.rejected = false;
        self.assigned = None;
        self.error = None;

        match Protocol::new(&self.schema, raw) {
            Ok(protocol) => {
                self.protocol = Some(protocol);
                true
            }
            Err(err) => {
                log::debug!("nested schema '{}' rejected input: {}", self.schema.name(), err);
                self.error = Some(FieldError::reason(NOT_A_MAPPING));
                false
            }
        }
    }

    fn validate(&mut self) -> Result<bool> {
        let valid = match self.protocol.as_mut() {
            Some(protocol) => protocol.validate()?,
            None => false,
        };
        self.rejected = !valid;
        Ok(valid)
    }

    fn value(&self) -> FieldValue {
        match (&self.assigned, &self.protocol) {
            (Some(value), _) => value.clone(),
            (None, Some(protocol)) => protocol.data(),
            (None, None) => FieldValue::empty_map(),
        }
    }

    fn set_value(&mut self, value: FieldValue) {
        self.assigned = Some(value);
    }

    fn error(&self) -> Option<FieldError> {
        if let Some(error) = self.error.as_ref().filter(|error| !error.is_empty()) {
            return Some(error.clone());
        }
        // a rejected child reports its tree even when a hook left it empty
        self.protocol
            .as_ref()
            .map(|protocol| protocol.error())
            .filter(|tree| self.rejected || !tree.is_empty())
            .map(FieldError::Nested)
    }

    fn set_error(&mut self, error: FieldError) {
        self.error = Some(error);
    }

    fn instantiate(&self) -> Box<dyn Field> {
        Box::new(Self {
            schema: Arc::clone(&self.schema),
            options: self.options.clone(),
            protocol: None,
            rejected: false,
            assigned: None,
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{IntegerField, StringField};
    use serde_json::json;

    fn person() -> Arc<Schema> {
        Schema::builder("Person")
            .field("name", StringField::default())
            .field("age", IntegerField::default())
            .build()
            .unwrap()
    }

    #[test]
    fn test_nested_value_is_child_data() {
        let mut field = ProtocolField::new(&person());
        assert!(field.process(&json!({"name": " test ", "age": "3"})));
        assert!(field.validate().unwrap());
        assert_eq!(field.value().to_json(), json!({"name": "test", "age": 3}));
        assert_eq!(field.error(), None);
    }

    #[test]
    fn test_non_mapping_is_rejected_before_child_processing() {
        let mut field = ProtocolField::new(&person());
        assert!(!field.process(&json!(["name", "age"])));
        assert!(field.protocol().is_none());
        assert_eq!(field.error(), Some(FieldError::reason("Not a valid dict value")));
        assert!(!field.validate().unwrap());
    }

    #[test]
    fn test_nested_error_is_child_tree() {
        let mut field = ProtocolField::new(&person());
        assert!(field.process(&json!({"name": "x", "age": "old"})));
        assert!(!field.validate().unwrap());

        let mut expected = crate::error::ErrorTree::new();
        expected.insert("age".to_string(), FieldError::reason("Not a valid int value"));
        assert_eq!(field.error(), Some(FieldError::Nested(expected)));
        assert_eq!(field.value(), FieldValue::empty_map());
    }

    #[test]
    fn test_instantiate_shares_schema_not_state() {
        let template = ProtocolField::new(&person());
        let mut a = template.instantiate();
        let b = template.instantiate();
        assert!(a.process(&json!({"name": "a", "age": 1})));
        assert!(a.validate().unwrap());
        assert_eq!(b.value(), FieldValue::empty_map());
        assert_eq!(b.error(), None);
        assert_eq!(template.schema().name(), "Person");
    }

    #[test]
    fn test_rejecting_hook_reports_empty_child_tree() {
        let strict = Schema::builder("Strict")
            .field("name", StringField::default())
            .post_validate(|_| false)
            .build()
            .unwrap();
        let mut field = ProtocolField::new(&strict);
        assert!(field.process(&json!({"name": "x"})));
        assert_eq!(field.error(), None);
        assert!(!field.validate().unwrap());
        assert_eq!(field.error(), Some(FieldError::Nested(crate::error::ErrorTree::new())));

        assert!(field.process(&json!({"name": "y"})));
        assert_eq!(field.error(), None);
    }
}
