// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outbound email delivery.
//!
//! The gateway only needs `send(email) -> message id`, so the provider sits
//! behind [`EmailProvider`]. [`ResendMailer`] talks to the Resend HTTP API.

use crate::config::MailerConfig;
use crate::validator::SanitizedSubmission;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Errors from the delivery provider.
#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Provider rejected message ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid provider endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// A fully built message ready for the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Anything that can deliver an [`OutgoingEmail`] and hand back an id.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, MailerError>;
}

/// Build the outgoing message for a validated submission.
pub fn compose(submission: &SanitizedSubmission, from_address: &str) -> OutgoingEmail {
    let from_name = submission.from_name.trim();
    let from = if from_name.is_empty() {
        from_address.to_string()
    } else {
        format!("{} <{}>", from_name, from_address)
    };

    OutgoingEmail {
        from,
        to: vec![submission.to.clone()],
        subject: submission.subject.clone(),
        html: render_html(&submission.body),
    }
}

/// Wrap plain-text content in the notification template.
pub fn render_html(body: &str) -> String {
    format!(
        r#"
<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #333;">Neue Kontaktanfrage</h2>
  <div style="background: #f5f5f5; padding: 20px; border-radius: 8px;">
    <pre style="white-space: pre-wrap; font-family: Arial, sans-serif;">{}</pre>
  </div>
  <p style="color: #666; font-size: 12px; margin-top: 20px;">
    Diese E-Mail wurde über das Kontaktformular der Website gesendet.
  </p>
</div>
"#,
        body
    )
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Resend API client.
pub struct ResendMailer {
    endpoint: Url,
    api_key: String,
    client: reqwest::Client,
}

impl ResendMailer {
    /// Create a client for the configured Resend endpoint.
    pub fn new(config: &MailerConfig) -> Result<Self, MailerError> {
        Ok(Self {
            endpoint: config.api_url.join("emails")?,
            api_key: config.api_key.clone(),
            client: reqwest::Client::new(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl EmailProvider for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, MailerError> {
        debug!(endpoint = %self.endpoint, to = ?email.to, "Posting message to provider");

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let sent: SendResponse = response.json().await?;
            Ok(sent.id)
        } else {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderErrorBody>(&text)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or(text);
            Err(MailerError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}
