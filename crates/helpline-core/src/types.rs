//! Shared types for helpline-core

use serde::{Deserialize, Serialize};

/// Category of a support request, as decided by the intent classifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Billing,
    Technical,
    General,
}

impl Category {
    /// All categories, in routing-table order
    pub const ALL: [Category; 3] = [Self::Billing, Self::Technical, Self::General];

    /// Parse a category from a string (e.g., from a config file)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "billing" => Some(Self::Billing),
            "technical" => Some(Self::Technical),
            "general" => Some(Self::General),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Billing => "billing",
            Self::Technical => "technical",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-session user state that routing and tool gating are evaluated against.
///
/// `issue_type` is `None` until the first message has been triaged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_premium_user: bool,
    pub issue_type: Option<Category>,
    pub last_ticket_id: Option<String>,
}

impl UserContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the stored email marks this user as premium
    pub fn email_is_premium(&self) -> bool {
        self.email.as_deref().is_some_and(email_is_premium)
    }
}

/// Premium accounts are recognised by a "pro" substring in the email address.
pub fn email_is_premium(email: &str) -> bool {
    email.to_lowercase().contains("pro")
}
