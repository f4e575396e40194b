//! Membership rules: allowed values, forbidden values, kinds and keys
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use protoform_core::{Error, FieldValue, Result, Validator, ValidatorError, ValueKind};
use serde_json::Value;

fn render(values: &[FieldValue]) -> String {
    Value::Array(values.iter().map(FieldValue::to_json).collect()).to_string()
}

/// Equality with ints and floats compared by numeric value
fn same_value(a: &FieldValue, b: &FieldValue) -> bool {
    match (a, b) {
        (FieldValue::Int(x), FieldValue::Float(y)) | (FieldValue::Float(y), FieldValue::Int(x)) => {
            *x as f64 == *y
        }
        _ => a == b,
    }
}

fn contains(values: &[FieldValue], value: &FieldValue) -> bool {
    values.iter().any(|candidate| same_value(candidate, value))
}

fn non_empty<T>(rule: &str, values: Vec<T>) -> Result<Vec<T>> {
    if values.is_empty() {
        return Err(Error::configuration(format!(
            "{}: the values can not be empty",
            rule
        )));
    }
    Ok(values)
}

/// Value must equal one of the allowed values
///
/// Ints and floats match by numeric value, so `1` is allowed by `1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnyOf {
    values: Vec<FieldValue>,
}

impl AnyOf {
    pub fn new<I, V>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        Ok(Self {
            values: non_empty("AnyOf", values.into_iter().map(Into::into).collect())?,
        })
    }
}

impl Validator for AnyOf {
    fn validate(&self, value: &FieldValue) -> std::result::Result<(), ValidatorError> {
        if contains(&self.values, value) {
            Ok(())
        } else {
            Err(ValidatorError::invalid(format!(
                "Must be one of {}",
                render(&self.values)
            )))
        }
    }

    fn name(&self) -> &'static str {
        "AnyOf"
    }
}

/// Value must not equal any of the forbidden values
#[derive(Debug, Clone, PartialEq)]
pub struct NoneOf {
    values: Vec<FieldValue>,
}

impl NoneOf {
    pub fn new<I, V>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        Ok(Self {
            values: non_empty("NoneOf", values.into_iter().map(Into::into).collect())?,
        })
    }
}

impl Validator for NoneOf {
    fn validate(&self, value: &FieldValue) -> std::result::Result<(), ValidatorError> {
        if contains(&self.values, value) {
            Err(ValidatorError::invalid(format!(
                "Can not be one of {}",
                render(&self.values)
            )))
        } else {
            Ok(())
        }
    }

    fn name(&self) -> &'static str {
        "NoneOf"
    }
}

/// Value's kind must be one of the listed kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceOf {
    kinds: Vec<ValueKind>,
}

impl InstanceOf {
    pub fn new<I: IntoIterator<Item = ValueKind>>(kinds: I) -> Result<Self> {
        Ok(Self {
            kinds: non_empty("InstanceOf", kinds.into_iter().collect())?,
        })
    }
}

impl Validator for InstanceOf {
    fn validate(&self, value: &FieldValue) -> std::result::Result<(), ValidatorError> {
        if self.kinds.contains(&value.kind()) {
            return Ok(());
        }
        let kinds: Vec<&str> = self.kinds.iter().map(ValueKind::as_str).collect();
        Err(ValidatorError::invalid(format!(
            "Must be instance of [{}]",
            kinds.join(", ")
        )))
    }

    fn name(&self) -> &'static str {
        "InstanceOf"
    }
}

/// Map must contain every listed key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRequired {
    keys: Vec<String>,
}

impl KeyRequired {
    pub fn new<I, K>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Ok(Self {
            keys: non_empty("KeyRequired", keys.into_iter().map(Into::into).collect())?,
        })
    }
}

impl Validator for KeyRequired {
    fn validate(&self, value: &FieldValue) -> std::result::Result<(), ValidatorError> {
        let map = value.as_map().ok_or(ValidatorError::Unsupported {
            validator: self.name(),
            found: value.kind(),
        })?;
        match self.keys.iter().find(|key| !map.contains_key(key.as_str())) {
            Some(key) => Err(ValidatorError::invalid(format!("Must has key: {}", key))),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "KeyRequired"
    }
}
