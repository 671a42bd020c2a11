// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test email providers: an in-process recorder and a loopback stand-in
//! for the Resend HTTP API.

use async_trait::async_trait;
use axum::{
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use contact_relay::mailer::{EmailProvider, MailerError, OutgoingEmail};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use url::Url;

pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    failure: Option<String>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    /// A provider that rejects every message with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl EmailProvider for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, MailerError> {
        if let Some(message) = &self.failure {
            return Err(MailerError::Rejected {
                status: 422,
                message: message.clone(),
            });
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(email.clone());
        Ok(format!("msg-{}", sent.len()))
    }
}

/// What the stand-in Resend API last received.
#[derive(Debug, Default, Clone)]
pub struct CapturedRequest {
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

/// Serve `POST /emails` on a loopback port, answering every request with
/// `status` and `reply`. Returns the base URL to use as `api_url`.
pub async fn spawn_resend_stub(
    status: StatusCode,
    reply: &'static str,
) -> (Url, Arc<Mutex<CapturedRequest>>) {
    let captured = Arc::new(Mutex::new(CapturedRequest::default()));
    let sink = captured.clone();

    let app = Router::new().route(
        "/emails",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let sink = sink.clone();
            async move {
                {
                    let mut request = sink.lock().unwrap();
                    request.authorization = headers
                        .get(header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    request.body = Some(body);
                }
                (status, reply)
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let url = Url::parse(&format!("http://{}/", addr)).unwrap();
    (url, captured)
}
