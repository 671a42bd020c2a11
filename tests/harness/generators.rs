// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Payload generators for abuse simulation.

use serde_json::{json, Value};

/// A well-formed submission that passes every check.
pub fn valid_payload() -> Value {
    json!({
        "to": "test@example.com",
        "subject": "Hi",
        "body": "Hello",
        "fromName": "A"
    })
}

/// Generate a pool of distinct client IPs in 10.x.x.x.
pub fn generate_ips(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("10.{}.{}.{}", (i >> 16) & 0xFF, (i >> 8) & 0xFF, i & 0xFF))
        .collect()
}

/// Honeypot values a bot might fill in.
pub fn honeypot_values() -> Vec<&'static str> {
    vec!["x", "http://spam.example", "John", " ", "<script>", "0"]
}

/// Bodies each expected to trip one content heuristic.
pub fn spam_bodies() -> Vec<String> {
    vec![
        "A".repeat(20),
        "Buy cialis today".to_string(),
        "You are our lucky winner".to_string(),
        "Claim at http now".to_string(),
        "visit www shop".to_string(),
        "see example.com".to_string(),
        "price: 100 dollars".to_string(),
        "emoji \u{1F600}".to_string(),
        "offer ".repeat(11),
        "abc ".repeat(2600),
    ]
}

/// Destination values that must fail the address check.
pub fn malformed_addresses() -> Vec<&'static str> {
    vec![
        "x@y",
        "plainaddress",
        "@example.com",
        "user@",
        "user@@example.com",
        "user name@example.com",
        "user@example",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ips() {
        let ips = generate_ips(300);
        assert_eq!(ips.len(), 300);
        let unique: std::collections::HashSet<_> = ips.iter().collect();
        assert_eq!(unique.len(), 300);
    }
}
