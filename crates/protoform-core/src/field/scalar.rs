//! Scalar fields: one conversion routine plus a validator chain
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::{Field, FieldBuilder, FieldOptions, FieldState, ValidatedField};
use crate::error::{FieldError, Result};
use crate::validator::ValidatorChain;
use crate::value::FieldValue;
use chrono::NaiveDateTime;
use serde_json::Value;
use std::fmt;

/// Converts a raw JSON value into a typed scalar
pub trait Conversion: fmt::Debug + Clone + Send + Sync + 'static {
    /// Variant name reported by [`Field::kind`]
    const KIND: &'static str;

    /// Fixed reason recorded when conversion fails
    const INVALID: &'static str;

    /// Convert, or `None` when the raw value cannot be coerced
    fn convert(&self, raw: &Value) -> Option<FieldValue>;
}

/// Trimmed string
#[derive(Debug, Clone, Copy, Default)]
pub struct AsString;

/// Trimmed string with `\r\n` normalized to `\n`
#[derive(Debug, Clone, Copy, Default)]
pub struct AsText;

/// Text cut to at most `limit` characters
#[derive(Debug, Clone, Copy)]
pub struct AsLimitedText {
    limit: usize,
}

/// 64-bit signed integer
#[derive(Debug, Clone, Copy, Default)]
pub struct AsInteger;

/// Float rounded to `precision` decimal places
#[derive(Debug, Clone, Copy)]
pub struct AsFloat {
    precision: u32,
}

/// Truthiness
#[derive(Debug, Clone, Copy, Default)]
pub struct AsBoolean;

/// Datetime parsed with a chrono format string
#[derive(Debug, Clone)]
pub struct AsDateTime {
    format: String,
}

impl AsLimitedText {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl AsFloat {
    pub fn new(precision: u32) -> Self {
        Self { precision }
    }
}

impl Default for AsFloat {
    fn default() -> Self {
        Self { precision: 2 }
    }
}

impl AsDateTime {
    pub const DEFAULT_FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";

    pub fn new<F: Into<String>>(format: F) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl Default for AsDateTime {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FORMAT)
    }
}

fn stringify(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn normalize_newlines(text: String) -> String {
    if text.contains("\r\n") {
        text.replace("\r\n", "\n")
    } else {
        text
    }
}

impl Conversion for AsString {
    const KIND: &'static str = "string";
    const INVALID: &'static str = "Not a valid str value";

    fn convert(&self, raw: &Value) -> Option<FieldValue> {
        stringify(raw).map(|s| FieldValue::Text(s.trim().to_string()))
    }
}

impl Conversion for AsText {
    const KIND: &'static str = "text";
    const INVALID: &'static str = "Not a valid str value";

    fn convert(&self, raw: &Value) -> Option<FieldValue> {
        stringify(raw).map(|s| FieldValue::Text(normalize_newlines(s.trim().to_string())))
    }
}

impl Conversion for AsLimitedText {
    const KIND: &'static str = "limited_text";
    const INVALID: &'static str = "Not a valid str value";

    fn convert(&self, raw: &Value) -> Option<FieldValue> {
        let text = normalize_newlines(stringify(raw)?.trim().to_string());
        match text.char_indices().nth(self.limit) {
            Some((cut, _)) => Some(FieldValue::Text(text[..cut].to_string())),
            None => Some(FieldValue::Text(text)),
        }
    }
}

impl Conversion for AsInteger {
    const KIND: &'static str = "integer";
    const INVALID: &'static str = "Not a valid int value";

    fn convert(&self, raw: &Value) -> Option<FieldValue> {
        let n = match raw {
            Value::Number(n) => match n.as_i64() {
                Some(i) => i,
                None => {
                    let x = n.as_f64()?.trunc();
                    if !x.is_finite() || x < i64::MIN as f64 || x >= i64::MAX as f64 {
                        return None;
                    }
                    x as i64
                }
            },
            Value::Bool(b) => i64::from(*b),
            Value::String(s) => s.trim().parse::<i64>().ok()?,
            _ => return None,
        };
        Some(FieldValue::Int(n))
    }
}

impl Conversion for AsFloat {
    const KIND: &'static str = "float";
    const INVALID: &'static str = "Not a valid float value";

    fn convert(&self, raw: &Value) -> Option<FieldValue> {
        let x = match raw {
            Value::Number(n) => n.as_f64()?,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        Some(FieldValue::Float(round_to(x, self.precision)))
    }
}

fn round_to(x: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision.min(i32::MAX as u32) as i32);
    let rounded = (x * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        x
    }
}

impl Conversion for AsBoolean {
    const KIND: &'static str = "boolean";
    const INVALID: &'static str = "Not a valid bool value";

    fn convert(&self, raw: &Value) -> Option<FieldValue> {
        let b = match raw {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().map_or(false, |x| x != 0.0),
            Value::String(s) => {
                let s = s.trim();
                !(s.is_empty()
                    || ["false", "0", "no", "off"]
                        .iter()
                        .any(|word| s.eq_ignore_ascii_case(word)))
            }
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
        };
        Some(FieldValue::Bool(b))
    }
}

impl Conversion for AsDateTime {
    const KIND: &'static str = "datetime";
    const INVALID: &'static str = "Not a valid datetime value";

    fn convert(&self, raw: &Value) -> Option<FieldValue> {
        let s = raw.as_str()?;
        NaiveDateTime::parse_from_str(s, &self.format)
            .ok()
            .map(FieldValue::DateTime)
    }
}

/// A field backed by a single [`Conversion`]
#[derive(Debug, Clone)]
pub struct ScalarField<C> {
    conversion: C,
    options: FieldOptions,
    validators: ValidatorChain,
    state: FieldState,
}

pub type StringField = ScalarField<AsString>;
pub type TextField = ScalarField<AsText>;
pub type LengthLimitTextField = ScalarField<AsLimitedText>;
pub type IntegerField = ScalarField<AsInteger>;
pub type FloatField = ScalarField<AsFloat>;
pub type BooleanField = ScalarField<AsBoolean>;
pub type DateTimeField = ScalarField<AsDateTime>;

impl<C: Conversion> ScalarField<C> {
    pub fn new(conversion: C) -> Self {
        Self {
            conversion,
            options: FieldOptions::default(),
            validators: ValidatorChain::new(),
            state: FieldState::default(),
        }
    }

    pub fn conversion(&self) -> &C {
        &self.conversion
    }
}

impl<C: Conversion + Default> Default for ScalarField<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl ScalarField<AsLimitedText> {
    /// Text field cut to `limit` characters
    pub fn with_limit(limit: usize) -> Self {
        Self::new(AsLimitedText::new(limit))
    }
}

impl ScalarField<AsFloat> {
    /// Float field rounded to `precision` decimal places
    pub fn with_precision(precision: u32) -> Self {
        Self::new(AsFloat::new(precision))
    }
}

impl ScalarField<AsDateTime> {
    /// Datetime field parsed with a custom chrono format
    pub fn with_format<F: Into<String>>(format: F) -> Self {
        Self::new(AsDateTime::new(format))
    }
}

impl<C: Conversion> FieldBuilder for ScalarField<C> {
    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }
}

impl<C: Conversion> ValidatedField for ScalarField<C> {
    fn validators_mut(&mut self) -> &mut ValidatorChain {
        &mut self.validators
    }
}

impl<C: Conversion> Field for ScalarField<C> {
    fn kind(&self) -> &'static str {
        C::KIND
    }

    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn process(&mut self, raw: &Value) -> bool {
        self.state.reset();
        match self.conversion.convert(raw) {
            Some(value) => {
                self.state.value = Some(value);
                true
            }
            None => self.state.fail(C::INVALID),
        }
    }

    fn validate(&mut self) -> Result<bool> {
        let value = self.value();
        self.state.check(&self.validators, &value)
    }

    fn value(&self) -> FieldValue {
        self.state.value.clone().unwrap_or(FieldValue::Null)
    }

    fn set_value(&mut self, value: FieldValue) {
        self.state.value = Some(value);
    }

    fn error(&self) -> Option<FieldError> {
        self.state.error.clone()
    }

    fn set_error(&mut self, error: FieldError) {
        self.state.error = Some(error);
    }

    fn instantiate(&self) -> Box<dyn Field> {
        Box::new(Self {
            conversion: self.conversion.clone(),
            options: self.options.clone(),
            validators: self.validators.clone(),
            state: FieldState::default(),
        })
    }
}
