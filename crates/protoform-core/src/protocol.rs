//! Schema declaration and the per-input Protocol engine
//!
//! A [`Schema`] is an immutable, shareable list of named field templates plus
//! two optional strategies:
//!
//! - **post-data**: reshapes the cleaned data map before it is handed out
//! - **post-validate**: cross-field checks over all resolved fields
//!
//! A [`Protocol`] is one run of a schema against one input mapping. It
//! instantiates every template, processes the input (stopping at the first
//! structural error), and on request validates the processed fields (stopping
//! at the first failing field). The result is read through [`Protocol::data`]
//! or [`Protocol::error`].
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, ErrorTree, FieldError, Result};
use crate::field::{Field, REQUIRED_REASON};
use crate::value::{json_kind, FieldValue};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Reshapes the cleaned data of a validated protocol
pub type PostData = Arc<dyn Fn(BTreeMap<String, FieldValue>) -> FieldValue + Send + Sync>;

/// Cross-field validation over every resolved field; `false` fails the protocol
pub type PostValidate = Arc<dyn Fn(&mut ValidFields<'_>) -> bool + Send + Sync>;

/// Immutable schema: named field templates in declaration order
pub struct Schema {
    name: String,
    fields: Vec<(String, Box<dyn Field>)>,
    post_data: Option<PostData>,
    post_validate: Option<PostValidate>,
}

impl Schema {
    /// Start declaring a schema
    pub fn builder<N: Into<String>>(name: N) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// The template declared under `name`
    pub fn template(&self, name: &str) -> Option<&dyn Field> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, field)| field.as_ref())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Run this schema against `data`
    pub fn protocol(self: &Arc<Self>, data: &Value) -> Result<Protocol> {
        Protocol::new(self, data)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .field("post_data", &self.post_data.is_some())
            .field("post_validate", &self.post_validate.is_some())
            .finish()
    }
}

/// Builder for [`Schema`]
pub struct SchemaBuilder {
    name: String,
    prefix: Option<String>,
    slots: Vec<(String, Box<dyn Field>)>,
    post_data: Option<PostData>,
    post_validate: Option<PostValidate>,
}

impl SchemaBuilder {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            prefix: None,
            slots: Vec::new(),
            post_data: None,
            post_validate: None,
        }
    }

    /// Require every declared slot name to carry `prefix`; it is stripped off
    /// to form the canonical field name
    pub fn prefix<P: Into<String>>(mut self, prefix: P) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Declare a field slot
    pub fn field<N: Into<String>, F: Field + 'static>(self, name: N, field: F) -> Self {
        self.boxed_field(name, Box::new(field))
    }

    /// Declare a field slot from an already boxed template
    pub fn boxed_field<N: Into<String>>(mut self, name: N, field: Box<dyn Field>) -> Self {
        self.slots.push((name.into(), field));
        self
    }

    /// Reshape the cleaned data before it is returned from [`Protocol::data`]
    pub fn post_data<F>(mut self, hook: F) -> Self
    where
        F: Fn(BTreeMap<String, FieldValue>) -> FieldValue + Send + Sync + 'static,
    {
        self.post_data = Some(Arc::new(hook));
        self
    }

    /// Cross-field validation run after every field validated
    pub fn post_validate<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut ValidFields<'_>) -> bool + Send + Sync + 'static,
    {
        self.post_validate = Some(Arc::new(hook));
        self
    }

    /// Finish the declaration
    ///
    /// Fails on empty or duplicate canonical names and, with a prefix, on slot
    /// names lacking it.
    pub fn build(self) -> Result<Arc<Schema>> {
        let mut fields: Vec<(String, Box<dyn Field>)> = Vec::with_capacity(self.slots.len());

        for (slot, field) in self.slots {
            let name = match &self.prefix {
                Some(prefix) => match slot.strip_prefix(prefix.as_str()) {
                    Some(stripped) => stripped.to_string(),
                    None => {
                        return Err(Error::configuration(format!(
                            "schema '{}': slot '{}' does not carry the prefix '{}'",
                            self.name, slot, prefix
                        )))
                    }
                },
                None => slot,
            };

            if name.is_empty() {
                return Err(Error::configuration(format!(
                    "schema '{}': field name cannot be empty",
                    self.name
                )));
            }
            if fields.iter().any(|(existing, _)| *existing == name) {
                return Err(Error::configuration(format!(
                    "schema '{}': field '{}' is declared twice",
                    self.name, name
                )));
            }
            fields.push((name, field));
        }

        Ok(Arc::new(Schema {
            name: self.name,
            fields,
            post_data: self.post_data,
            post_validate: self.post_validate,
        }))
    }
}

/// Partition a field belongs to at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Pending,
    Valid,
    Discarded,
    Failed,
}

/// One run of a [`Schema`] against one input mapping
#[derive(Debug)]
pub struct Protocol {
    schema: Arc<Schema>,
    fields: Vec<(String, Box<dyn Field>)>,
    slots: Vec<Slot>,
    validated: bool,
}

impl Protocol {
    /// Instantiate the schema's fields and process `data`
    ///
    /// Fails only when `data` is not a mapping; every data problem after that
    /// is recorded in the error view.
    pub fn new(schema: &Arc<Schema>, data: &Value) -> Result<Self> {
        let map = match data {
            Value::Object(map) => map,
            other => {
                return Err(Error::NotAMapping {
                    found: json_kind(other),
                })
            }
        };

        log::trace!("instantiating {} fields of schema '{}'", schema.len(), schema.name());
        let fields: Vec<(String, Box<dyn Field>)> = schema
            .fields
            .iter()
            .map(|(name, template)| (name.clone(), template.instantiate()))
            .collect();

        let mut protocol = Self {
            schema: Arc::clone(schema),
            slots: vec![Slot::Pending; fields.len()],
            fields,
            validated: false,
        };
        protocol.process(map);
        Ok(protocol)
    }

    fn process(&mut self, data: &Map<String, Value>) {
        for (index, (name, field)) in self.fields.iter_mut().enumerate() {
            let raw = match data.get(name.as_str()).filter(|value| !value.is_null()) {
                Some(raw) => Cow::Borrowed(raw),
                None => {
                    let options = field.options();
                    if options.nullable && options.discard {
                        self.slots[index] = Slot::Discarded;
                        continue;
                    }
                    if options.nullable {
                        field.set_value(FieldValue::Null);
                        self.slots[index] = Slot::Valid;
                        continue;
                    }
                    match options.default_value() {
                        Some(default) => Cow::Owned(default.clone()),
                        None => {
                            log::debug!("schema '{}': required field '{}' is missing", self.schema.name, name);
                            field.set_error(FieldError::reason(REQUIRED_REASON));
                            self.slots[index] = Slot::Failed;
                            break;
                        }
                    }
                }
            };

            if !field.process(&raw) {
                log::debug!(
                    "schema '{}': field '{}' failed processing: {}",
                    self.schema.name,
                    name,
                    field.error().map(|e| e.to_string()).unwrap_or_default()
                );
                self.slots[index] = Slot::Failed;
                break;
            }
        }
    }

    /// Validate every processed field, then run the post-validate strategy
    ///
    /// Returns `Ok(false)` when the data is invalid and `Err` only when a
    /// validator reports a defect.
    pub fn validate(&mut self) -> Result<bool> {
        if self.has_errors() {
            return Ok(false);
        }

        for (index, (name, field)) in self.fields.iter_mut().enumerate() {
            if self.slots[index] != Slot::Pending {
                continue;
            }
            if !field.validate()? {
                log::debug!(
                    "schema '{}': field '{}' failed validation: {}",
                    self.schema.name,
                    name,
                    field.error().map(|e| e.to_string()).unwrap_or_default()
                );
                self.slots[index] = Slot::Failed;
                return Ok(false);
            }
            self.slots[index] = Slot::Valid;
        }

        if let Some(hook) = self.schema.post_validate.clone() {
            let passed = {
                let mut view = ValidFields::new(&mut self.fields, &self.slots);
                hook(&mut view)
            };
            if !passed {
                for (index, (_, field)) in self.fields.iter().enumerate() {
                    let rejected = field.error().map_or(false, |error| !error.is_empty());
                    if self.slots[index] == Slot::Valid && rejected {
                        self.slots[index] = Slot::Failed;
                    }
                }
                log::debug!("schema '{}': post-validate rejected the data", self.schema.name);
                return Ok(false);
            }
        }

        self.validated = true;
        Ok(true)
    }

    /// Cleaned data
    ///
    /// The empty map until a validate pass succeeds or while any error is
    /// recorded; otherwise every valid field's value, passed through the
    /// post-data strategy.
    pub fn data(&self) -> FieldValue {
        if !self.validated || self.has_errors() {
            return FieldValue::empty_map();
        }
        let data: BTreeMap<String, FieldValue> = self
            .entries(Slot::Valid)
            .map(|(name, field)| (name.to_string(), field.value()))
            .collect();
        if data.is_empty() {
            return FieldValue::empty_map();
        }
        match &self.schema.post_data {
            Some(hook) => hook(data),
            None => FieldValue::Map(data),
        }
    }

    /// Errors of every field in the error partition
    ///
    /// Every failed field has an entry; one that recorded no error of its own
    /// maps to an empty nested tree.
    pub fn error(&self) -> ErrorTree {
        self.entries(Slot::Failed)
            .map(|(name, field)| {
                let error = field
                    .error()
                    .unwrap_or_else(|| FieldError::Nested(ErrorTree::new()));
                (name.to_string(), error)
            })
            .collect()
    }

    /// Whether a validate pass succeeded and no error is recorded
    pub fn is_valid(&self) -> bool {
        self.validated && !self.has_errors()
    }

    /// Consume a validated protocol into its data or its error tree
    pub fn into_result(self) -> std::result::Result<FieldValue, ErrorTree> {
        if self.is_valid() {
            Ok(self.data())
        } else {
            Err(self.error())
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// This protocol's instance of the field `name`
    pub fn field(&self, name: &str) -> Option<&dyn Field> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, field)| field.as_ref())
    }

    /// Names of fields resolved as valid, in declaration order
    pub fn valid_fields(&self) -> Vec<&str> {
        self.entries(Slot::Valid).map(|(name, _)| name).collect()
    }

    /// Names of nullable fields dropped from the output
    pub fn discarded_fields(&self) -> Vec<&str> {
        self.entries(Slot::Discarded).map(|(name, _)| name).collect()
    }

    /// Names of fields in the error partition
    pub fn error_fields(&self) -> Vec<&str> {
        self.entries(Slot::Failed).map(|(name, _)| name).collect()
    }

    fn has_errors(&self) -> bool {
        self.slots.contains(&Slot::Failed)
    }

    fn entries(&self, slot: Slot) -> impl Iterator<Item = (&str, &dyn Field)> {
        self.fields
            .iter()
            .zip(self.slots.iter())
            .filter(move |(_, state)| **state == slot)
            .map(|((name, field), _)| (name.as_str(), field.as_ref()))
    }
}

/// Mutable view over the valid fields, handed to the post-validate strategy
pub struct ValidFields<'a> {
    entries: Vec<(&'a str, &'a mut Box<dyn Field>)>,
}

impl<'a> ValidFields<'a> {
    fn new(fields: &'a mut [(String, Box<dyn Field>)], slots: &[Slot]) -> Self {
        let entries = fields
            .iter_mut()
            .zip(slots.iter())
            .filter(|(_, slot)| **slot == Slot::Valid)
            .map(|((name, field), _)| (name.as_str(), field))
            .collect();
        Self { entries }
    }

    /// Names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(field_name, _)| *field_name == name)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Field> {
        self.entries
            .iter()
            .find(|(field_name, _)| *field_name == name)
            .map(|(_, field)| field.as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut dyn Field> {
        for (field_name, field) in self.entries.iter_mut() {
            if *field_name == name {
                return Some(field.as_mut());
            }
        }
        None
    }

    /// Value of a valid field
    pub fn value(&self, name: &str) -> Option<FieldValue> {
        self.get(name).map(|field| field.value())
    }

    /// Attach a cross-field error; returns `false` when `name` is not a valid field
    pub fn reject<E: Into<FieldError>>(&mut self, name: &str, error: E) -> bool {
        match self.get_mut(name) {
            Some(field) => {
                field.set_error(error.into());
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for ValidFields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
