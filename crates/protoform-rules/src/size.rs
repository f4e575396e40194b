//! Size rules: length, byte size and numeric range
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use protoform_core::{Error, FieldValue, Result, Validator, ValidatorError};
use std::fmt::Display;

/// Inclusive bounds with at least one side set
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds<T> {
    min: Option<T>,
    max: Option<T>,
}

impl<T: PartialOrd + Copy + Display> Bounds<T> {
    fn new(rule: &str, min: Option<T>, max: Option<T>) -> Result<Self> {
        match (min, max) {
            (None, None) => Err(Error::configuration(format!(
                "{}: the min and max must be set one at least",
                rule
            ))),
            (Some(min), Some(max)) if min > max => Err(Error::configuration(format!(
                "{}: the min {} can not be greater than the max {}",
                rule, min, max
            ))),
            _ => Ok(Self { min, max }),
        }
    }

    /// Reason for `actual` falling outside the bounds
    ///
    /// `between` may carry `{min}` and `{max}` placeholders.
    fn check(&self, actual: T, below: &str, above: &str, between: &str) -> Option<String> {
        match (self.min, self.max) {
            (None, Some(max)) if actual > max => Some(format!("{} {}", above, max)),
            (Some(min), None) if actual < min => Some(format!("{} {}", below, min)),
            (Some(min), Some(max)) if actual < min || actual > max => {
                Some(between.replace("{min}", &min.to_string()).replace("{max}", &max.to_string()))
            }
            _ => None,
        }
    }
}

/// Length of text (in characters), lists or maps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    bounds: Bounds<usize>,
}

impl Length {
    pub fn new(min: Option<usize>, max: Option<usize>) -> Result<Self> {
        Ok(Self {
            bounds: Bounds::new("Length", min, max)?,
        })
    }

    pub fn min(min: usize) -> Result<Self> {
        Self::new(Some(min), None)
    }

    pub fn max(max: usize) -> Result<Self> {
        Self::new(None, Some(max))
    }

    pub fn between(min: usize, max: usize) -> Result<Self> {
        Self::new(Some(min), Some(max))
    }
}

impl Validator for Length {
    fn validate(&self, value: &FieldValue) -> std::result::Result<(), ValidatorError> {
        let length = match value {
            FieldValue::Text(text) => text.chars().count(),
            FieldValue::List(items) => items.len(),
            FieldValue::Map(map) => map.len(),
            other => {
                return Err(ValidatorError::Unsupported {
                    validator: self.name(),
                    found: other.kind(),
                })
            }
        };
        match self.bounds.check(
            length,
            "Can not shorter then",
            "Can not longer then",
            "Must between {min} and {max} chars length",
        ) {
            Some(reason) => Err(ValidatorError::Invalid(reason)),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "Length"
    }
}

/// Upper bound on a value's byte size
///
/// Text is measured as UTF-8; any other value by its serialized JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSize {
    max: usize,
}

impl ByteSize {
    pub fn new(max: usize) -> Result<Self> {
        if max == 0 {
            return Err(Error::configuration("ByteSize: the max must be a positive value"));
        }
        Ok(Self { max })
    }
}

impl Validator for ByteSize {
    fn validate(&self, value: &FieldValue) -> std::result::Result<(), ValidatorError> {
        let size = match value {
            FieldValue::Text(text) => text.len(),
            other => other.to_json().to_string().len(),
        };
        if size > self.max {
            Err(ValidatorError::invalid(format!(
                "Can not greater then {} bytes size",
                self.max
            )))
        } else {
            Ok(())
        }
    }

    fn name(&self) -> &'static str {
        "ByteSize"
    }
}

/// Inclusive range for ints and floats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberRange {
    bounds: Bounds<f64>,
}

impl NumberRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Result<Self> {
        if min.into_iter().chain(max).any(|bound| !bound.is_finite()) {
            return Err(Error::configuration("NumberRange: bounds must be finite numbers"));
        }
        Ok(Self {
            bounds: Bounds::new("NumberRange", min, max)?,
        })
    }

    pub fn min(min: f64) -> Result<Self> {
        Self::new(Some(min), None)
    }

    pub fn max(max: f64) -> Result<Self> {
        Self::new(None, Some(max))
    }

    pub fn between(min: f64, max: f64) -> Result<Self> {
        Self::new(Some(min), Some(max))
    }
}

impl Validator for NumberRange {
    fn validate(&self, value: &FieldValue) -> std::result::Result<(), ValidatorError> {
        let number = value.as_f64().ok_or(ValidatorError::Unsupported {
            validator: self.name(),
            found: value.kind(),
        })?;
        if number.is_nan() {
            return Err(ValidatorError::invalid("Not a number"));
        }
        match self.bounds.check(
            number,
            "Can not less than",
            "Can not greater then",
            "Must between {min} and {max}",
        ) {
            Some(reason) => Err(ValidatorError::Invalid(reason)),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "NumberRange"
    }
}
