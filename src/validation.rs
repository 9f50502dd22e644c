//! Validation System - Mutually Exclusive Options
//!
//! Rules produce structured violations.
//! The validator turns any violation into a [`ConflictError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::{keys, Settings};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationViolation {
    pub rule: String,
    pub settings: [String; 2],
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self { valid: true, violations: vec![] }
    }

    pub fn failure(violations: Vec<ValidationViolation>) -> Self {
        Self { valid: false, violations }
    }
}

/// Mutually exclusive settings were both supplied. Fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}", describe(.violations))]
pub struct ConflictError {
    pub violations: Vec<ValidationViolation>,
}

fn describe(violations: &[ValidationViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validation rule trait - produces a violation or nothing
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, settings: &Settings) -> Option<ValidationViolation>;
}

// --- Concrete Rules ---

/// Two settings that may not both be non-empty.
pub struct MutuallyExclusive {
    name: &'static str,
    first: &'static str,
    second: &'static str,
}

impl MutuallyExclusive {
    pub const fn new(name: &'static str, first: &'static str, second: &'static str) -> Self {
        Self { name, first, second }
    }

    fn is_set(settings: &Settings, key: &str) -> bool {
        settings.value(key).is_some_and(|v| !v.is_empty())
    }
}

impl ValidationRule for MutuallyExclusive {
    fn name(&self) -> &'static str {
        self.name
    }

    fn validate(&self, settings: &Settings) -> Option<ValidationViolation> {
        if Self::is_set(settings, self.first) && Self::is_set(settings, self.second) {
            Some(ValidationViolation {
                rule: self.name().to_string(),
                settings: [self.first.to_string(), self.second.to_string()],
                message: format!("Cannot use both {} and {}", self.first, self.second),
            })
        } else {
            None
        }
    }
}

pub const CONTAINER_NAME_RULE: MutuallyExclusive = MutuallyExclusive::new(
    "container_name",
    keys::MATCH_CONTAINER_NAME,
    keys::SKIP_CONTAINER_NAMES,
);

pub const IMAGE_NAME_RULE: MutuallyExclusive = MutuallyExclusive::new(
    "image_name",
    keys::MATCH_IMAGE_NAME,
    keys::SKIP_IMAGE_NAMES,
);

pub const LINE_FILTER_RULE: MutuallyExclusive = MutuallyExclusive::new(
    "line_filter",
    keys::INCLUDE_LINE,
    keys::EXCLUDE_LINES,
);

/// Validator runs every rule in a fixed order
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(CONTAINER_NAME_RULE),
                Box::new(IMAGE_NAME_RULE),
                Box::new(LINE_FILTER_RULE),
            ],
        }
    }

    /// Report every violation without failing.
    pub fn check(&self, settings: &Settings) -> ValidationResult {
        let violations: Vec<_> = self
            .rules
            .iter()
            .filter_map(|rule| rule.validate(settings))
            .collect();

        if violations.is_empty() {
            ValidationResult::success()
        } else {
            ValidationResult::failure(violations)
        }
    }

    pub fn validate(&self, settings: &Settings) -> Result<(), ConflictError> {
        let result = self.check(settings);
        if result.valid {
            Ok(())
        } else {
            Err(ConflictError { violations: result.violations })
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
