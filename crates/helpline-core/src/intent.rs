//! Keyword intent classification
//!
//! Maps a free-text support message to a [`Category`]. Matching is a plain
//! case-insensitive substring test against two fixed keyword lists; billing
//! is checked first, so a message that mentions both a charge and a crash is
//! treated as billing.

use tracing::debug;

use crate::types::Category;

/// Keywords that route a message to billing
pub const BILLING_KEYWORDS: &[&str] = &["refund", "charge", "billing", "invoice", "payment"];

/// Keywords that route a message to technical support
pub const TECHNICAL_KEYWORDS: &[&str] = &[
    "error",
    "bug",
    "not working",
    "crash",
    "restart",
    "slow",
    "timeout",
];

/// Classify a message. Total over all strings; unmatched input is `General`.
pub fn classify(message: &str) -> Category {
    let lower = message.to_lowercase();

    let category = if mentions_any(&lower, BILLING_KEYWORDS) {
        Category::Billing
    } else if mentions_any(&lower, TECHNICAL_KEYWORDS) {
        Category::Technical
    } else {
        Category::General
    };

    debug!("Classified message as {}", category);
    category
}

/// Substring test against an already-lowercased message
pub(crate) fn mentions_any(lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| lower.contains(k))
}
