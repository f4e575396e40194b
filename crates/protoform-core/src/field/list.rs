//! Collection fields: every element is handled by its own copy of an element field
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::{Field, FieldBuilder, FieldOptions, ValidatedField};
use crate::error::{FieldError, Result};
use crate::validator::ValidatorChain;
use crate::value::FieldValue;
use serde_json::{Number, Value};
use std::collections::HashSet;

const NOT_A_LIST: &str = "Not a valid list value";
const NOT_ONE_DIMENSIONAL: &str = "Not a valid one-dimensional list value";

/// Homogeneous list of values, each converted by a fresh copy of the element field
#[derive(Debug)]
pub struct FieldList {
    element: Box<dyn Field>,
    options: FieldOptions,
    validators: ValidatorChain,
    entries: Vec<Box<dyn Field>>,
    assigned: Option<FieldValue>,
    error: Option<FieldError>,
}

impl FieldList {
    pub fn new<F: Field + 'static>(element: F) -> Self {
        Self::from_boxed(Box::new(element))
    }

    pub fn from_boxed(element: Box<dyn Field>) -> Self {
        Self {
            element,
            options: FieldOptions::default(),
            validators: ValidatorChain::new(),
            entries: Vec::new(),
            assigned: None,
            error: None,
        }
    }

    /// The element template
    pub fn element(&self) -> &dyn Field {
        self.element.as_ref()
    }

    /// Processed element fields, in input order
    pub fn entries(&self) -> &[Box<dyn Field>] {
        &self.entries
    }

    fn reset(&mut self) {
        self.entries.clear();
        self.assigned = None;
        self.error = None;
    }

    /// Process already-checked items, stopping at the first failing element
    fn process_items<'a, I>(&mut self, items: I) -> bool
    where
        I: IntoIterator<Item = &'a Value>,
    {
        for (index, item) in items.into_iter().enumerate() {
            let mut entry = self.element.instantiate();
            if !entry.process(item) {
                let cause = entry.error().unwrap_or_else(|| FieldError::reason(""));
                log::debug!("list element {} failed processing: {}", index, cause);
                self.error = Some(FieldError::indexed(index, cause));
                return false;
            }
            self.entries.push(entry);
        }
        true
    }
}

impl FieldBuilder for FieldList {
    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }
}

impl ValidatedField for FieldList {
    fn validators_mut(&mut self) -> &mut ValidatorChain {
        &mut self.validators
    }
}

impl Field for FieldList {
    fn kind(&self) -> &'static str {
        "list"
    }

    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn process(&mut self, raw: &Value) -> bool {
        self.reset();
        match raw {
            Value::Array(items) => self.process_items(items),
            _ => {
                self.error = Some(FieldError::reason(NOT_A_LIST));
                false
            }
        }
    }

    fn validate(&mut self) -> Result<bool> {
        for (index, entry) in self.entries.iter_mut().enumerate() {
            if !entry.validate()? {
                let cause = entry.error().unwrap_or_else(|| FieldError::reason(""));
                self.error = Some(FieldError::indexed(index, cause));
                return Ok(false);
            }
        }

        let value = self.value();
        match self.validators.check(&value)? {
            None => Ok(true),
            Some(reason) => {
                self.error = Some(FieldError::Reason(reason));
                Ok(false)
            }
        }
    }

    fn value(&self) -> FieldValue {
        match &self.assigned {
            Some(value) => value.clone(),
            None => FieldValue::List(self.entries.iter().map(|entry| entry.value()).collect()),
        }
    }

    fn set_value(&mut self, value: FieldValue) {
        self.assigned = Some(value);
    }

    fn error(&self) -> Option<FieldError> {
        self.error.clone()
    }

    fn set_error(&mut self, error: FieldError) {
        self.error = Some(error);
    }

    fn instantiate(&self) -> Box<dyn Field> {
        Box::new(Self {
            element: self.element.instantiate(),
            options: self.options.clone(),
            validators: self.validators.clone(),
            entries: Vec::new(),
            assigned: None,
            error: None,
        })
    }
}

/// Order of a [`UniqueFieldList`] after deduplication
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DedupOrder {
    /// Keep the first occurrence of each value where it appeared
    #[default]
    FirstOccurrence,
    /// Sort the distinct values by their canonical JSON text
    Sorted,
}

/// Hashable identity of a scalar raw element
///
/// Numbers compare by value, so `1`, `1.0` and `1e0` share a key. Strings,
/// booleans and numbers never share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ScalarKey<'a> {
    Null,
    Bool(bool),
    Signed(i64),
    Unsigned(u64),
    Float(u64),
    Text(&'a str),
}

impl<'a> ScalarKey<'a> {
    /// `None` for arrays and objects
    fn of(raw: &'a Value) -> Option<Self> {
        let key = match raw {
            Value::Null => ScalarKey::Null,
            Value::Bool(b) => ScalarKey::Bool(*b),
            Value::Number(n) => Self::number(n),
            Value::String(s) => ScalarKey::Text(s),
            Value::Array(_) | Value::Object(_) => return None,
        };
        Some(key)
    }

    fn number(n: &Number) -> Self {
        if let Some(i) = n.as_i64() {
            return ScalarKey::Signed(i);
        }
        if let Some(u) = n.as_u64() {
            return ScalarKey::Unsigned(u);
        }
        let x = n.as_f64().unwrap_or(f64::NAN);
        if x.fract() == 0.0 {
            if x >= i64::MIN as f64 && x < i64::MAX as f64 {
                return ScalarKey::Signed(x as i64);
            }
            if x >= 0.0 && x < u64::MAX as f64 {
                return ScalarKey::Unsigned(x as u64);
            }
        }
        ScalarKey::Float(x.to_bits())
    }
}

/// [`FieldList`] that drops repeated raw values before processing
///
/// Numbers are compared by value, so `1` and `1.0` are one element, while
/// `"1"` and `1` stay distinct. Elements must be scalars; nested arrays or
/// objects are rejected.
#[derive(Debug)]
pub struct UniqueFieldList {
    list: FieldList,
    order: DedupOrder,
}

impl UniqueFieldList {
    pub fn new<F: Field + 'static>(element: F) -> Self {
        Self {
            list: FieldList::new(element),
            order: DedupOrder::default(),
        }
    }

    /// Choose the output order of the distinct values
    pub fn order(mut self, order: DedupOrder) -> Self {
        self.order = order;
        self
    }

    pub fn entries(&self) -> &[Box<dyn Field>] {
        self.list.entries()
    }
}

impl FieldBuilder for UniqueFieldList {
    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.list.options
    }
}

impl ValidatedField for UniqueFieldList {
    fn validators_mut(&mut self) -> &mut ValidatorChain {
        &mut self.list.validators
    }
}

impl Field for UniqueFieldList {
    fn kind(&self) -> &'static str {
        "unique_list"
    }

    fn options(&self) -> &FieldOptions {
        self.list.options()
    }

    fn process(&mut self, raw: &Value) -> bool {
        self.list.reset();
        let items = match raw {
            Value::Array(items) => items,
            _ => {
                self.list.error = Some(FieldError::reason(NOT_A_LIST));
                return false;
            }
        };

        let mut seen = HashSet::with_capacity(items.len());
        let mut distinct: Vec<&Value> = Vec::with_capacity(items.len());
        for item in items {
            match ScalarKey::of(item) {
                Some(key) => {
                    if seen.insert(key) {
                        distinct.push(item);
                    }
                }
                None => {
                    self.list.error = Some(FieldError::reason(NOT_ONE_DIMENSIONAL));
                    return false;
                }
            }
        }
        if self.order == DedupOrder::Sorted {
            distinct.sort_by_cached_key(|item| item.to_string());
        }

        self.list.process_items(distinct)
    }

    fn validate(&mut self) -> Result<bool> {
        self.list.validate()
    }

    fn value(&self) -> FieldValue {
        self.list.value()
    }

    fn set_value(&mut self, value: FieldValue) {
        self.list.set_value(value);
    }

    fn error(&self) -> Option<FieldError> {
        self.list.error()
    }

    fn set_error(&mut self, error: FieldError) {
        self.list.set_error(error);
    }

    fn instantiate(&self) -> Box<dyn Field> {
        Box::new(Self {
            list: FieldList {
                element: self.list.element.instantiate(),
                options: self.list.options.clone(),
                validators: self.list.validators.clone(),
                entries: Vec::new(),
                assigned: None,
                error: None,
            },
            order: self.order,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{IntegerField, StringField};
    use crate::validator::{Validator, ValidatorError};
    use serde_json::json;

    #[derive(Debug)]
    struct AtMost(i64);

    impl Validator for AtMost {
        fn validate(&self, value: &FieldValue) -> std::result::Result<(), ValidatorError> {
            match value.as_i64() {
                Some(n) if n <= self.0 => Ok(()),
                Some(_) => Err(ValidatorError::invalid(format!("Can not greater then {}", self.0))),
                None => Err(ValidatorError::Unsupported {
                    validator: self.name(),
                    found: value.kind(),
                }),
            }
        }

        fn name(&self) -> &'static str {
            "AtMost"
        }
    }

    #[derive(Debug)]
    struct NonEmptyList;

    impl Validator for NonEmptyList {
        fn validate(&self, value: &FieldValue) -> std::result::Result<(), ValidatorError> {
            match value.as_list() {
                Some(items) if !items.is_empty() => Ok(()),
                Some(_) => Err(ValidatorError::invalid("The value is required")),
                None => Err(ValidatorError::Unsupported {
                    validator: self.name(),
                    found: value.kind(),
                }),
            }
        }

        fn name(&self) -> &'static str {
            "NonEmptyList"
        }
    }

    fn ints(values: &[i64]) -> FieldValue {
        FieldValue::List(values.iter().copied().map(FieldValue::Int).collect())
    }

    #[test]
    fn test_list_converts_in_order() {
        let mut field = FieldList::new(IntegerField::default());
        assert!(field.process(&json!(["1", "2", "3"])));
        assert!(field.validate().unwrap());
        assert_eq!(field.value(), ints(&[1, 2, 3]));
        assert_eq!(field.entries().len(), 3);
    }

    #[test]
    fn test_list_rejects_non_arrays() {
        let mut field = FieldList::new(IntegerField::default());
        assert!(!field.process(&json!({"a": 1})));
        assert_eq!(field.error(), Some(FieldError::reason("Not a valid list value")));
    }

    #[test]
    fn test_list_stops_at_first_bad_element() {
        let mut field = FieldList::new(IntegerField::default());
        assert!(!field.process(&json!(["1", "x", "y"])));
        assert_eq!(
            field.error(),
            Some(FieldError::indexed(1, FieldError::reason("Not a valid int value")))
        );
        assert_eq!(field.entries().len(), 1);
    }

    #[test]
    fn test_list_validate_reports_failing_index() {
        let mut field = FieldList::new(IntegerField::default().validator(AtMost(5)));
        assert!(field.process(&json!([1, 9, 12])));
        assert!(!field.validate().unwrap());
        assert_eq!(
            field.error(),
            Some(FieldError::indexed(1, FieldError::reason("Can not greater then 5")))
        );
    }

    #[test]
    fn test_list_runs_own_chain_after_elements() {
        let mut field = FieldList::new(IntegerField::default()).validator(NonEmptyList);
        assert!(field.process(&json!([])));
        assert!(!field.validate().unwrap());
        assert_eq!(field.error(), Some(FieldError::reason("The value is required")));
    }

    #[test]
    fn test_list_reprocessing_does_not_accumulate() {
        let mut field = FieldList::new(IntegerField::default());
        assert!(field.process(&json!([1, 2])));
        assert!(field.process(&json!([1, 2])));
        assert_eq!(field.value(), ints(&[1, 2]));
    }

    #[test]
    fn test_nested_lists() {
        let mut field = FieldList::new(FieldList::new(StringField::default()));
        assert!(field.process(&json!([[" a "], ["b", "c"]])));
        assert!(field.validate().unwrap());
        assert_eq!(field.value().to_json(), json!([["a"], ["b", "c"]]));
    }

    #[test]
    fn test_unique_list_dedups_first_occurrence() {
        let mut field = UniqueFieldList::new(IntegerField::default());
        assert!(field.process(&json!(["2", "1", "2", "1"])));
        assert!(field.validate().unwrap());
        assert_eq!(field.value(), ints(&[2, 1]));
    }

    #[test]
    fn test_unique_list_sorted_order() {
        let mut field = UniqueFieldList::new(StringField::default()).order(DedupOrder::Sorted);
        assert!(field.process(&json!(["b", "a", "b", "c"])));
        assert_eq!(field.value().to_json(), json!(["a", "b", "c"]));
    }

    #[test]
    fn test_unique_list_compares_numbers_by_value() {
        let mut field = UniqueFieldList::new(IntegerField::default());
        assert!(field.process(&json!([1, 1.0, 2, 2e0, "1"])));
        assert!(field.validate().unwrap());
        assert_eq!(field.value(), ints(&[1, 2, 1]));

        let mut field = UniqueFieldList::new(StringField::default());
        assert!(field.process(&json!([0.5, 0.5, 1.5, true, 1])));
        assert_eq!(field.value().to_json(), json!(["0.5", "1.5", "true", "1"]));
    }

    #[test]
    fn test_unique_list_handles_long_inputs() {
        let raw: Vec<Value> = (0..50_000i64).chain(0..50_000).map(Value::from).collect();
        let mut field = UniqueFieldList::new(IntegerField::default());
        assert!(field.process(&Value::Array(raw)));
        assert_eq!(field.entries().len(), 50_000);
        assert_eq!(
            field.value().as_list().and_then(|items| items.last().cloned()),
            Some(FieldValue::Int(49_999))
        );
    }

    #[test]
    fn test_unique_list_rejects_nested_elements() {
        let mut field = UniqueFieldList::new(IntegerField::default());
        assert!(!field.process(&json!([[1], [1]])));
        assert_eq!(
            field.error(),
            Some(FieldError::reason("Not a valid one-dimensional list value"))
        );
    }

    #[test]
    fn test_instantiate_copies_element_template() {
        let template = FieldList::new(IntegerField::default());
        let mut a = template.instantiate();
        let b = template.instantiate();
        assert!(a.process(&json!([1, 2])));
        assert_eq!(a.value(), ints(&[1, 2]));
        assert_eq!(b.value(), ints(&[]));
        assert_eq!(b.kind(), "list");
    }
}
