// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact relay.
//!
//! A submission passes through, in order: preflight, method check, client
//! identification, rate limiting, sanitization, honeypot, required fields,
//! address shape, content heuristics and finally dispatch. The first stage
//! that rejects ends the request.
//!
//! The body is buffered inside the pipeline, after rate limiting, so an
//! oversized request still counts against its client and gets a JSON error.

use crate::config::Config;
use crate::error::GatewayError;
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::mailer::{compose, EmailProvider};
use crate::metrics::Metrics;
use crate::spam::SpamDetector;
use crate::validator::{SubmissionRequest, SubmissionValidator, ValidationResult};
use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter,
    pub validator: SubmissionValidator,
    pub spam: SpamDetector,
    pub mailer: Arc<dyn EmailProvider>,
    pub metrics: Metrics,
    pub config: Config,
}

impl AppState {
    /// Assemble state from configuration and a delivery provider.
    pub fn new(config: Config, mailer: Arc<dyn EmailProvider>) -> prometheus::Result<Self> {
        Ok(Self {
            limiter: RateLimiter::new(config.rate_limit.clone()),
            validator: SubmissionValidator::new(config.sanitize.clone()),
            spam: SpamDetector::new(&config.sanitize),
            mailer,
            metrics: Metrics::new()?,
            config,
        })
    }
}

/// Successful submission response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub message_id: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

/// Build the service router with CORS headers on every response.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = &state.config.cors;
    let allow_origin =
        HeaderValue::from_str(&cors.allow_origin).unwrap_or_else(|_| HeaderValue::from_static("*"));
    let allow_headers = HeaderValue::from_str(&cors.allow_headers_value()).unwrap_or_else(|_| {
        HeaderValue::from_static("authorization, x-client-info, apikey, content-type")
    });

    let mut app = Router::new()
        .route("/", any(submit))
        .route("/send-email", any(submit))
        .route("/health", get(health))
        .route("/healthz", get(health));

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            allow_origin,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            allow_headers,
        ))
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contact-relay",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Contact form submission endpoint.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    match relay(&state, &method, &headers, body).await {
        Ok(message_id) => {
            state.metrics.record("sent");
            Json(SubmitResponse {
                success: true,
                message_id,
            })
            .into_response()
        }
        Err(err) => {
            state.metrics.record(err.outcome());
            err.into_response()
        }
    }
}

async fn relay(
    state: &AppState,
    method: &Method,
    headers: &HeaderMap,
    body: Body,
) -> Result<String, GatewayError> {
    if *method != Method::POST {
        return Err(GatewayError::MethodNotAllowed);
    }

    let ip = client_ip(headers);
    debug!(ip = %ip, "Processing submission");

    let rate = state.limiter.check(&ip).await;
    state
        .metrics
        .set_rate_limit_entries(state.limiter.tracked_keys().await);
    if let RateLimitResult::Limited { .. } = rate {
        let retry_after_secs = rate.retry_after_secs();
        info!(ip = %ip, retry_after_secs, "Rate limit exceeded");
        return Err(GatewayError::RateLimited { retry_after_secs });
    }

    let body = to_bytes(body, state.config.sanitize.max_body_bytes)
        .await
        .map_err(|e| {
            info!(ip = %ip, error = %e, "Submission body not buffered");
            GatewayError::PayloadTooLarge
        })?;

    let raw: SubmissionRequest = serde_json::from_slice(&body).map_err(|e| {
        debug!(ip = %ip, error = %e, "Unparseable submission body");
        GatewayError::InvalidPayload
    })?;
    let submission = state.validator.sanitize(raw);

    if let Some(signal) = state.spam.check_honeypot(&submission.honeypot) {
        info!(
            ip = %ip,
            %signal,
            subject = %submission.subject,
            from_name = %submission.from_name,
            "Spam detected"
        );
        return Err(GatewayError::SpamFlagged);
    }

    if let ValidationResult::Invalid(err) = state.validator.validate(&submission) {
        info!(ip = %ip, error = %err, "Validation failed");
        return Err(err.into());
    }

    if let Some(signal) = state.spam.detect(&submission) {
        info!(
            ip = %ip,
            %signal,
            subject = %submission.subject,
            from_name = %submission.from_name,
            "Spam detected"
        );
        return Err(GatewayError::SpamFlagged);
    }

    info!(
        ip = %ip,
        to = %submission.to,
        subject = %submission.subject,
        from_name = %submission.from_name,
        "Sending email"
    );

    let email = compose(&submission, &state.config.mailer.from_address);
    match state.mailer.send(&email).await {
        Ok(message_id) => {
            info!(ip = %ip, message_id = %message_id, "Email sent");
            Ok(message_id)
        }
        Err(err) => {
            error!(ip = %ip, error = %err, "Email dispatch failed");
            Err(err.into())
        }
    }
}

/// Derive the client IP from proxy headers.
///
/// Uses the first `X-Forwarded-For` entry, then `X-Real-IP`, then `"unknown"`.
pub fn client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .unwrap_or("unknown")
        .to_string()
}
