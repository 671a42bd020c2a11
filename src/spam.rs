// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Heuristic spam detection for contact form submissions.
//!
//! The honeypot field is checked first on its raw value. The remaining
//! checks run in order over the lower-cased concatenation of subject, body
//! and sender name, and the first one that fires decides the verdict.
//! These are heuristics: false positives and negatives are expected.

use crate::config::SanitizeConfig;
use crate::validator::SanitizedSubmission;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

/// Runs of this many identical characters are treated as spam.
const REPEATED_CHAR_RUN: usize = 16;

/// Words shorter than or equal to this many characters are not counted.
const MIN_COUNTED_WORD_LEN: usize = 3;

/// A counted word may appear at most this many times.
const MAX_WORD_REPEATS: usize = 10;

lazy_static! {
    static ref SPAM_KEYWORDS: Regex =
        Regex::new(r"(viagra|cialis|casino|lottery|winner|congratulations)")
            .expect("keyword pattern compiles");
    static ref URL_MARKERS: Regex =
        Regex::new(r"\b(http|www|\.com|\.org|\.net)\b").expect("url pattern compiles");
    static ref UNUSUAL_CHARS: Regex =
        Regex::new(r"[^A-Za-z0-9_\s\-äöüÄÖÜß@.,!?()]").expect("charset pattern compiles");
}

/// Which heuristic flagged a submission. Only logged, never sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpamSignal {
    Honeypot,
    RepeatedCharacters,
    SpamKeyword,
    UrlMarker,
    UnusualCharacters,
    ExcessiveLength,
    RepeatedWords,
}

impl std::fmt::Display for SpamSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Honeypot => write!(f, "honeypot field filled"),
            Self::RepeatedCharacters => write!(f, "repeated characters"),
            Self::SpamKeyword => write!(f, "spam keyword"),
            Self::UrlMarker => write!(f, "url marker"),
            Self::UnusualCharacters => write!(f, "unusual characters"),
            Self::ExcessiveLength => write!(f, "excessive length"),
            Self::RepeatedWords => write!(f, "repeated words"),
        }
    }
}

/// Content heuristics, in evaluation order.
#[derive(Debug, Clone, Copy)]
enum ContentRule {
    RepeatedCharacters,
    SpamKeyword,
    UrlMarker,
    UnusualCharacters,
    ExcessiveLength { max_chars: usize },
    RepeatedWords,
}

impl ContentRule {
    fn signal(&self) -> SpamSignal {
        match self {
            Self::RepeatedCharacters => SpamSignal::RepeatedCharacters,
            Self::SpamKeyword => SpamSignal::SpamKeyword,
            Self::UrlMarker => SpamSignal::UrlMarker,
            Self::UnusualCharacters => SpamSignal::UnusualCharacters,
            Self::ExcessiveLength { .. } => SpamSignal::ExcessiveLength,
            Self::RepeatedWords => SpamSignal::RepeatedWords,
        }
    }

    fn matches(&self, text: &str) -> bool {
        match self {
            Self::RepeatedCharacters => has_repeated_run(text, REPEATED_CHAR_RUN),
            Self::SpamKeyword => SPAM_KEYWORDS.is_match(text),
            Self::UrlMarker => URL_MARKERS.is_match(text),
            Self::UnusualCharacters => UNUSUAL_CHARS.is_match(text),
            Self::ExcessiveLength { max_chars } => text.chars().count() > *max_chars,
            Self::RepeatedWords => has_repeated_words(text),
        }
    }
}

/// Spam detector.
pub struct SpamDetector {
    rules: Vec<ContentRule>,
}

impl SpamDetector {
    /// Create a new detector with the given thresholds.
    pub fn new(config: &SanitizeConfig) -> Self {
        Self {
            rules: vec![
                ContentRule::RepeatedCharacters,
                ContentRule::SpamKeyword,
                ContentRule::UrlMarker,
                ContentRule::UnusualCharacters,
                ContentRule::ExcessiveLength {
                    max_chars: config.max_spam_text_len,
                },
                ContentRule::RepeatedWords,
            ],
        }
    }

    /// Returns `Some` when the honeypot field carries any value.
    pub fn check_honeypot(&self, honeypot: &str) -> Option<SpamSignal> {
        if honeypot.is_empty() {
            None
        } else {
            debug!("Honeypot field filled");
            Some(SpamSignal::Honeypot)
        }
    }

    /// Run the content heuristics over already-normalized text.
    pub fn check_text(&self, text: &str) -> Option<SpamSignal> {
        self.rules
            .iter()
            .find(|rule| rule.matches(text))
            .map(|rule| rule.signal())
    }

    /// Classify a submission, returning the first signal that fired.
    pub fn detect(&self, submission: &SanitizedSubmission) -> Option<SpamSignal> {
        if let Some(signal) = self.check_honeypot(&submission.honeypot) {
            return Some(signal);
        }

        let text = normalized_text(submission);
        let signal = self.check_text(&text);
        if let Some(signal) = signal {
            debug!(%signal, "Content heuristic fired");
        }
        signal
    }
}

/// Lower-cased `subject body fromName`.
pub fn normalized_text(submission: &SanitizedSubmission) -> String {
    format!(
        "{} {} {}",
        submission.subject, submission.body, submission.from_name
    )
    .to_lowercase()
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// True if some character other than a line terminator repeats `run` times in a row.
fn has_repeated_run(text: &str, run: usize) -> bool {
    let mut prev: Option<char> = None;
    let mut len = 0;

    for c in text.chars() {
        if is_line_terminator(c) {
            prev = None;
            len = 0;
            continue;
        }
        if prev == Some(c) {
            len += 1;
        } else {
            prev = Some(c);
            len = 1;
        }
        if len >= run {
            return true;
        }
    }

    false
}

/// True if any word longer than three characters appears more than ten times.
fn has_repeated_words(text: &str) -> bool {
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for word in text.split_whitespace() {
        if word.chars().count() <= MIN_COUNTED_WORD_LEN {
            continue;
        }
        let count = counts.entry(word).or_insert(0);
        *count += 1;
        if *count > MAX_WORD_REPEATS {
            return true;
        }
    }

    false
}
