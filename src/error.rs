// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Gateway error types and their HTTP rendering.
//!
//! Every rejection is terminal for the request. Only provider failures carry
//! detail; the rest use fixed messages so the filter rules are not exposed.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::mailer::MailerError;
use crate::validator::ValidationError;

/// Request-terminating errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },

    #[error("Invalid request body")]
    InvalidPayload,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Missing required fields")]
    MissingField(&'static str),

    #[error("Invalid email address")]
    InvalidEmailFormat,

    #[error("Message flagged as spam")]
    SpamFlagged,

    #[error("Failed to send email")]
    ProviderDispatchFailure(#[source] MailerError),
}

/// Error response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::InvalidPayload
            | Self::MissingField(_)
            | Self::InvalidEmailFormat
            | Self::SpamFlagged => StatusCode::BAD_REQUEST,
            Self::ProviderDispatchFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metrics label for this rejection.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "method_not_allowed",
            Self::RateLimited { .. } => "rate_limited",
            Self::InvalidPayload
            | Self::PayloadTooLarge
            | Self::MissingField(_)
            | Self::InvalidEmailFormat => "invalid",
            Self::SpamFlagged => "spam",
            Self::ProviderDispatchFailure(_) => "provider_error",
        }
    }
}

impl From<ValidationError> for GatewayError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MissingField(field) => Self::MissingField(field),
            ValidationError::InvalidEmailFormat => Self::InvalidEmailFormat,
        }
    }
}

impl From<MailerError> for GatewayError {
    fn from(err: MailerError) -> Self {
        Self::ProviderDispatchFailure(err)
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
            retry_after: match &self {
                Self::RateLimited { retry_after_secs } => Some(*retry_after_secs),
                _ => None,
            },
            details: match &self {
                Self::ProviderDispatchFailure(err) => Some(err.to_string()),
                _ => None,
            },
        };

        match self {
            Self::RateLimited { retry_after_secs } => (
                status,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                Json(body),
            )
                .into_response(),
            _ => (status, Json(body)).into_response(),
        }
    }
}
