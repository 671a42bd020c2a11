// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Submission sanitization and validation.
//!
//! - Whitespace trimming, angle bracket stripping and per-field truncation
//! - Required field presence (`to`, `subject`, `body`)
//! - Destination address shape

use crate::config::SanitizeConfig;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

lazy_static! {
    static ref EMAIL_SHAPE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles");
}

/// Contact form submission as received on the wire.
///
/// Missing fields deserialize to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub from_name: String,
    #[serde(default)]
    pub honeypot: Option<String>,
}

/// Submission after sanitization. The honeypot is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedSubmission {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub from_name: String,
    pub honeypot: String,
}

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid email address")]
    InvalidEmailFormat,
}

/// Result of validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Submission is valid
    Valid,
    /// Submission is invalid
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(e) => Some(e),
        }
    }
}

/// Trim, strip `<` and `>`, and keep at most `max_len` characters.
///
/// Whitespace exposed by stripping or truncation is trimmed again, so
/// applying this twice yields the same value as applying it once.
pub fn sanitize_field(input: &str, max_len: usize) -> String {
    let kept: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '<' | '>'))
        .take(max_len)
        .collect();
    kept.trim().to_string()
}

/// Submission validator.
pub struct SubmissionValidator {
    config: SanitizeConfig,
}

impl SubmissionValidator {
    /// Create a new validator with the given configuration.
    pub fn new(config: SanitizeConfig) -> Self {
        Self { config }
    }

    /// Sanitize every text field of a submission.
    pub fn sanitize(&self, raw: SubmissionRequest) -> SanitizedSubmission {
        let max = self.config.max_field_len;
        SanitizedSubmission {
            to: sanitize_field(&raw.to, max),
            subject: sanitize_field(&raw.subject, max),
            body: sanitize_field(&raw.body, max),
            from_name: sanitize_field(&raw.from_name, max),
            honeypot: raw.honeypot.unwrap_or_default(),
        }
    }

    /// Check that `to`, `subject` and `body` are present.
    ///
    /// Whitespace-only values count as missing.
    pub fn validate_required(&self, submission: &SanitizedSubmission) -> ValidationResult {
        let fields = [
            ("to", &submission.to),
            ("subject", &submission.subject),
            ("body", &submission.body),
        ];

        for (name, value) in fields {
            if value.trim().is_empty() {
                debug!(field = name, "Missing required field");
                return ValidationResult::Invalid(ValidationError::MissingField(name));
            }
        }

        ValidationResult::Valid
    }

    /// Check that the destination looks like `local@domain.tld`.
    pub fn validate_email(&self, address: &str) -> ValidationResult {
        if EMAIL_SHAPE.is_match(address) {
            ValidationResult::Valid
        } else {
            debug!(to = %address, "Destination address rejected");
            ValidationResult::Invalid(ValidationError::InvalidEmailFormat)
        }
    }

    /// Validate a sanitized submission: required fields first, then address shape.
    pub fn validate(&self, submission: &SanitizedSubmission) -> ValidationResult {
        let required = self.validate_required(submission);
        if !required.is_valid() {
            return required;
        }

        self.validate_email(&submission.to)
    }
}
