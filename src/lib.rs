// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Relay
//!
//! This crate provides the submission gateway behind a website contact form.
//! Each POST is checked and, if it passes, relayed as an email notification:
//!
//! - Per-IP fixed-window rate limiting (3 per minute default)
//! - Angle bracket stripping and field truncation
//! - Required field and address shape validation
//! - Honeypot and content heuristics for spam
//! - Delivery through an email provider (Resend)

pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod mailer;
pub mod metrics;
pub mod spam;
pub mod validator;

pub use config::Config;
pub use error::GatewayError;
pub use limiter::{RateLimitResult, RateLimiter};
pub use mailer::{EmailProvider, OutgoingEmail, ResendMailer};
pub use spam::{SpamDetector, SpamSignal};
pub use validator::{SubmissionRequest, SubmissionValidator, ValidationResult};
