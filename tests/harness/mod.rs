// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for the contact relay.
//!
//! Provides an in-process email provider, a local stand-in for the Resend
//! API, payload generators and helpers for driving the router without a
//! network listener.

#![allow(dead_code)]

pub mod generators;
pub mod provider;

use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use contact_relay::{
    config::Config,
    handlers::{router, AppState},
};
use provider::RecordingMailer;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// A router wired to a recording provider.
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_mailer(RecordingMailer::new())
    }

    pub fn failing(message: &str) -> Self {
        Self::with_mailer(RecordingMailer::failing(message))
    }

    pub fn with_mailer(mailer: RecordingMailer) -> Self {
        Self::with_config(Config::default(), mailer)
    }

    pub fn with_config(config: Config, mailer: RecordingMailer) -> Self {
        let mailer = Arc::new(mailer);
        let state = Arc::new(AppState::new(config, mailer.clone()).unwrap());
        Self {
            router: router(state.clone()),
            state,
            mailer,
        }
    }

    /// POST a JSON payload from the given client IP.
    pub async fn post_json(&self, ip: &str, payload: &Value) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .header("x-forwarded-for", ip)
            .body(Body::from(payload.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// Read a response body as JSON.
pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
