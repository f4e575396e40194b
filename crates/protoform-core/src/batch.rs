//! Batch validation of many documents against one schema
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, FieldError, Result};
use crate::protocol::{Protocol, Schema};
use crate::value::FieldValue;
use serde_json::Value;
use std::sync::Arc;

/// Batch validation configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchConfig {
    /// Stop after the first invalid document
    pub fail_fast: bool,
    /// Maximum number of invalid documents to collect (0 = unlimited)
    pub max_errors: usize,
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable fail-fast mode
    pub fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Set maximum number of invalid documents to collect
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }
}

/// Outcome of [`validate_batch`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Cleaned data of valid documents, by input index
    pub valid: Vec<(usize, FieldValue)>,
    /// Errors of invalid documents, by input index
    pub invalid: Vec<(usize, FieldError)>,
    /// Number of documents examined before the batch stopped
    pub examined: usize,
}

impl BatchReport {
    pub fn is_ok(&self) -> bool {
        self.invalid.is_empty()
    }

    /// Ok with the cleaned data if every examined document validated
    pub fn into_result(self) -> std::result::Result<Vec<(usize, FieldValue)>, Vec<(usize, FieldError)>> {
        if self.invalid.is_empty() {
            Ok(self.valid)
        } else {
            Err(self.invalid)
        }
    }
}

/// Validate every document with its own [`Protocol`]
///
/// A document that is not a mapping is recorded as an invalid entry rather
/// than aborting the batch. Validator defects abort it with `Err`.
pub fn validate_batch(schema: &Arc<Schema>, documents: &[Value], config: &BatchConfig) -> Result<BatchReport> {
    let mut report = BatchReport::default();

    for (index, document) in documents.iter().enumerate() {
        report.examined += 1;

        let error = match Protocol::new(schema, document) {
            Ok(mut protocol) => {
                if protocol.validate()? {
                    report.valid.push((index, protocol.data()));
                    continue;
                }
                FieldError::Nested(protocol.error())
            }
            Err(err @ Error::NotAMapping { .. }) => FieldError::reason(err.to_string()),
            Err(err) => return Err(err),
        };
        report.invalid.push((index, error));

        if config.fail_fast {
            break;
        }
        if config.max_errors > 0 && report.invalid.len() >= config.max_errors {
            break;
        }
    }

    log::debug!(
        "batch against '{}': {} valid, {} invalid, {} of {} examined",
        schema.name(),
        report.valid.len(),
        report.invalid.len(),
        report.examined,
        documents.len()
    );
    Ok(report)
}
