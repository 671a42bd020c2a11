// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for the gateway.
//!
//! Metrics live in a registry owned by the service rather than the global
//! default registry, so several instances (and tests) can coexist.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Submission outcome labels.
pub const OUTCOMES: &[&str] = &[
    "sent",
    "rate_limited",
    "invalid",
    "spam",
    "provider_error",
    "method_not_allowed",
];

/// Gateway metrics.
pub struct Metrics {
    registry: Registry,
    submissions: IntCounterVec,
    rate_limit_entries: IntGauge,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new(
                "contact_relay_submissions_total",
                "Contact form submissions by outcome",
            ),
            &["outcome"],
        )?;
        let rate_limit_entries = IntGauge::new(
            "contact_relay_rate_limit_entries",
            "Client IPs tracked by the rate limiter",
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(rate_limit_entries.clone()))?;

        // Pre-create every label so the series exist from startup
        for outcome in OUTCOMES.iter().copied() {
            submissions.with_label_values(&[outcome]);
        }

        Ok(Self {
            registry,
            submissions,
            rate_limit_entries,
        })
    }

    pub fn record(&self, outcome: &str) {
        self.submissions.with_label_values(&[outcome]).inc();
    }

    pub fn submissions(&self, outcome: &str) -> u64 {
        self.submissions.with_label_values(&[outcome]).get()
    }

    pub fn set_rate_limit_entries(&self, count: usize) {
        self.rate_limit_entries.set(count as i64);
    }

    /// Render all metrics in the text exposition format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
