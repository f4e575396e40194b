//! Protoform Rules - reusable leaf validators for protoform fields
//!
//! Every rule validates its parameters when constructed and implements
//! [`protoform_core::Validator`], so it can be attached to any field that
//! carries a validator chain. Applying a rule to a kind of value it cannot
//! judge (for example [`Length`] on an integer) is reported as
//! [`protoform_core::ValidatorError::Unsupported`].
//!
//! # Example
//!
//! ```rust
//! use protoform_core::{IntegerField, Protocol, Schema, TextField, ValidatedField};
//! use protoform_rules::{Length, NumberRange};
//! use serde_json::json;
//!
//! let schema = Schema::builder("Person")
//!     .field("name", TextField::default().validator(Length::between(2, 20).unwrap()))
//!     .field("age", IntegerField::default().validator(NumberRange::between(0.0, 150.0).unwrap()))
//!     .build()
//!     .unwrap();
//!
//! let mut protocol = Protocol::new(&schema, &json!({"name": "A", "age": 30})).unwrap();
//! assert!(!protocol.validate().unwrap());
//! assert_eq!(
//!     serde_json::to_value(protocol.error()).unwrap(),
//!     json!({"name": "Must between 2 and 20 chars length"})
//! );
//! ```
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod membership;
pub mod pattern;
pub mod required;
pub mod size;

pub use membership::{AnyOf, InstanceOf, KeyRequired, NoneOf};
pub use pattern::Regular;
pub use required::{DataRequired, ProtoRequired};
pub use size::{ByteSize, Length, NumberRange};
