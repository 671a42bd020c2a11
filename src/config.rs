// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact relay.
//!
//! Defaults match the contact form deployment: 3 submissions per IP per
//! minute, 5000 characters per field, Resend as the delivery provider.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },
}

/// Configuration for the contact relay service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub sanitize: SanitizeConfig,

    #[serde(default)]
    pub mailer: MailerConfig,

    #[serde(default)]
    pub cors: CorsConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Fixed-window rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum accepted requests per IP per window (default: 3)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds (default: 60)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

/// Input sanitization and spam thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizeConfig {
    /// Maximum characters kept per text field (default: 5000)
    #[serde(default = "default_max_field_len")]
    pub max_field_len: usize,

    /// Combined subject/body/name length above which a submission is spam (default: 10000)
    #[serde(default = "default_max_spam_text_len")]
    pub max_spam_text_len: usize,

    /// Largest request body buffered before fields are truncated (default: 16 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Email delivery provider configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    /// Provider API key (RESEND_API_KEY)
    #[serde(default)]
    pub api_key: String,

    /// Provider API base URL
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// Address used in the outgoing From header
    #[serde(default = "default_from_address")]
    pub from_address: String,
}

/// CORS headers attached to every response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allow_origin")]
    pub allow_origin: String,

    #[serde(default = "default_allow_headers")]
    pub allow_headers: Vec<String>,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_requests() -> u32 {
    3
}

fn default_window_secs() -> u64 {
    60
}

fn default_max_field_len() -> usize {
    5000
}

fn default_max_spam_text_len() -> usize {
    10_000
}

fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_api_url() -> Url {
    Url::parse("https://api.resend.com/").expect("static URL is valid")
}

fn default_from_address() -> String {
    "onboarding@resend.dev".to_string()
}

fn default_allow_origin() -> String {
    "*".to_string()
}

fn default_allow_headers() -> Vec<String> {
    ["authorization", "x-client-info", "apikey", "content-type"]
        .iter()
        .map(|h| h.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            sanitize: SanitizeConfig::default(),
            mailer: MailerConfig::default(),
            cors: CorsConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            max_field_len: default_max_field_len(),
            max_spam_text_len: default_max_spam_text_len(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: default_api_url(),
            from_address: default_from_address(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: default_allow_origin(),
            allow_headers: default_allow_headers(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

// Keeps the API key out of logs.
impl std::fmt::Debug for MailerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailerConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url.as_str())
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl CorsConfig {
    /// Allowed headers joined for the `Access-Control-Allow-Headers` value.
    pub fn allow_headers_value(&self) -> String {
        self.allow_headers.join(", ")
    }
}

impl Config {
    /// Load configuration from a `.env` file (if present) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("RESEND_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar("RESEND_API_KEY"))?;

        let api_url = match lookup("RESEND_API_URL") {
            Some(raw) => Url::parse(&raw).map_err(|e| ConfigError::InvalidValue {
                var: "RESEND_API_URL",
                reason: e.to_string(),
            })?,
            None => default_api_url(),
        };

        Ok(Config {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(default_bind_addr),
            rate_limit: RateLimitConfig {
                max_requests: lookup("RATE_LIMIT_MAX_REQUESTS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(default_max_requests),
                window_secs: lookup("RATE_LIMIT_WINDOW_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(default_window_secs),
            },
            sanitize: SanitizeConfig {
                max_body_bytes: lookup("MAX_BODY_BYTES")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(default_max_body_bytes),
                ..Default::default()
            },
            mailer: MailerConfig {
                api_key,
                api_url,
                from_address: lookup("MAIL_FROM_ADDRESS").unwrap_or_else(default_from_address),
            },
            metrics: MetricsConfig {
                enabled: lookup("METRICS_ENABLED")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(default_true),
                ..Default::default()
            },
            ..Default::default()
        })
    }
}
