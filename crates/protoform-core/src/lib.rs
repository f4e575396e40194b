//! Protoform Core - convert and validate untyped nested data against declared schemas
//!
//! This crate turns JSON-like input (`serde_json::Value`) into typed, cleaned
//! data, or into a per-field error tree that mirrors the schema's shape.
//!
//! # Main Components
//!
//! - **Validator**: stateless single-rule predicate over a converted value
//! - **Field**: conversion plus validator chain for one schema slot, including
//!   composite lists, placeholders and nested schemas
//! - **Schema / Protocol**: immutable field templates, instantiated per input
//! - **Error Handling**: data errors as [`FieldError`] trees, schema defects as [`Error`]
//!
//! # Example
//!
//! ```rust
//! use protoform_core::{FieldBuilder, IntegerField, Protocol, Schema, TextField};
//! use serde_json::json;
//!
//! let schema = Schema::builder("Person")
//!     .field("name", TextField::default())
//!     .field("age", IntegerField::default())
//!     .field("nickname", TextField::default().nullable().discard())
//!     .build()
//!     .unwrap();
//!
//! let mut protocol = Protocol::new(&schema, &json!({"name": " Ann ", "age": "30"})).unwrap();
//! assert!(protocol.validate().unwrap());
//! assert_eq!(protocol.data().to_json(), json!({"name": "Ann", "age": 30}));
//!
//! let mut protocol = Protocol::new(&schema, &json!({"name": " Ann "})).unwrap();
//! assert!(!protocol.validate().unwrap());
//! assert_eq!(
//!     serde_json::to_value(protocol.error()).unwrap(),
//!     json!({"age": "The field is required"})
//! );
//! ```
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod batch;
pub mod error;
pub mod field;
pub mod protocol;
pub mod validator;
pub mod value;

// Re-export main types for convenience
pub use batch::{validate_batch, BatchConfig, BatchReport};
pub use error::{Error, ErrorTree, FieldError, Result};
pub use field::{
    BooleanField, DateTimeField, DedupOrder, Field, FieldBuilder, FieldList, FieldOptions,
    FloatField, IntegerField, LengthLimitTextField, PlaceField, ProtocolField, ScalarField,
    StringField, TextField, UniqueFieldList, ValidatedField,
};
pub use protocol::{Protocol, Schema, SchemaBuilder, ValidFields};
pub use validator::{Validator, ValidatorChain, ValidatorError};
pub use value::{FieldValue, ValueKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
