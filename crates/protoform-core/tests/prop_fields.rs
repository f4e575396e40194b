//! Property-based tests for field instantiation and processing
//!
//! These tests verify that fields never share state across instances and that
//! processing the same raw value twice is stable.

use proptest::prelude::*;
use protoform_core::{
    BooleanField, Field, FieldList, FieldValue, FloatField, IntegerField, LengthLimitTextField, PlaceField,
    Protocol, ProtocolField, Schema, StringField, TextField, UniqueFieldList,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Strategy for generating random JSON values with controlled complexity
fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        (-1.0e6f64..1.0e6).prop_map(|x| json!(x)),
        "[a-zA-Z0-9 \r\n]{0,30}".prop_map(Value::String),
    ];

    leaf.prop_recursive(3, 16, 5, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            proptest::collection::hash_map("[a-z]{1,8}", inner, 0..5)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn inner_schema() -> Arc<Schema> {
    Schema::builder("Inner")
        .field("n", IntegerField::default())
        .build()
        .unwrap()
}

/// One template of every field variant
fn templates() -> Vec<Box<dyn Field>> {
    vec![
        Box::new(StringField::default()),
        Box::new(TextField::default()),
        Box::new(LengthLimitTextField::with_limit(4)),
        Box::new(IntegerField::default()),
        Box::new(FloatField::default()),
        Box::new(BooleanField::default()),
        Box::new(PlaceField::new().field(IntegerField::default())),
        Box::new(FieldList::new(IntegerField::default())),
        Box::new(UniqueFieldList::new(StringField::default())),
        Box::new(ProtocolField::new(&inner_schema())),
    ]
}

proptest! {
    /// Property: processing one instance never changes a sibling instance
    #[test]
    fn prop_instances_are_isolated(first in json_value_strategy(), second in json_value_strategy()) {
        for template in templates() {
            let mut a = template.instantiate();
            let mut b = template.instantiate();

            b.process(&second);
            let b_value = b.value().to_json();
            let b_error = b.error();

            a.process(&first);
            let _ = a.validate();

            prop_assert_eq!(b.value().to_json(), b_value, "{} instance leaked value", template.kind());
            prop_assert_eq!(b.error(), b_error, "{} instance leaked error", template.kind());
            prop_assert_eq!(template.error(), None);
        }
    }

    /// Property: re-processing the same raw value yields the same value and error
    #[test]
    fn prop_reprocessing_is_idempotent(raw in json_value_strategy()) {
        for template in templates() {
            let mut field = template.instantiate();
            let first_ok = field.process(&raw);
            let first_value = field.value().to_json();
            let first_error = field.error();

            let second_ok = field.process(&raw);
            prop_assert_eq!(first_ok, second_ok);
            prop_assert_eq!(field.error(), first_error);
            prop_assert_eq!(field.value().to_json(), first_value);
        }
    }

    /// Property: a protocol never panics and always reports either data or errors
    #[test]
    fn prop_protocol_never_panics(input in json_value_strategy()) {
        let schema = Schema::builder("Any")
            .field("name", StringField::default())
            .field("items", FieldList::new(IntegerField::default()))
            .field("inner", ProtocolField::new(&inner_schema()))
            .build()
            .unwrap();

        if let Ok(mut protocol) = Protocol::new(&schema, &input) {
            let valid = protocol.validate().unwrap();
            prop_assert_eq!(valid, protocol.error().is_empty() && protocol.is_valid());
            if !valid {
                prop_assert_eq!(protocol.data(), FieldValue::empty_map());
            }
        } else {
            prop_assert!(!input.is_object());
        }
    }

    /// Property: integer strings always convert to the integer they spell
    #[test]
    fn prop_integer_strings_convert(n in any::<i64>()) {
        let mut field = IntegerField::default();
        prop_assert!(field.process(&json!(n.to_string())));
        prop_assert_eq!(field.value().as_i64(), Some(n));
    }
}
