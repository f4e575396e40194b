//! Regular expression rule
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use protoform_core::{Error, FieldValue, Result, Validator, ValidatorError};
use regex::Regex;

/// Text must match a pattern at its start
///
/// The pattern is not implicitly anchored at the end, so `"ab"` accepts
/// `"abc"`. Add `$` to require a full match.
#[derive(Debug, Clone)]
pub struct Regular {
    pattern: String,
    regex: Regex,
}

impl Regular {
    pub fn new<P: Into<String>>(pattern: P) -> Result<Self> {
        let pattern = pattern.into();
        let regex = Regex::new(&pattern).map_err(|e| {
            Error::configuration(format!("Regular: invalid pattern '{}': {}", pattern, e))
        })?;
        Ok(Self { pattern, regex })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn matches_at_start(&self, text: &str) -> bool {
        // leftmost match, so any match at 0 is the one found
        self.regex.find(text).map_or(false, |m| m.start() == 0)
    }
}

impl Validator for Regular {
    fn validate(&self, value: &FieldValue) -> std::result::Result<(), ValidatorError> {
        let text = value.as_str().ok_or(ValidatorError::Unsupported {
            validator: self.name(),
            found: value.kind(),
        })?;
        if self.matches_at_start(text) {
            Ok(())
        } else {
            Err(ValidatorError::invalid(format!(
                "Not match the pattern: {}",
                self.pattern
            )))
        }
    }

    fn name(&self) -> &'static str {
        "Regular"
    }
}
