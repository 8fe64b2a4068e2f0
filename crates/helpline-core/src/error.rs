//! Error types for the support desk

use thiserror::Error;

use crate::types::Category;

/// Failure of a single tool invocation.
///
/// These are never fatal: agents turn them into reply text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("tool '{0}' is not available to this agent")]
    ToolNotFound(String),
    #[error("ticket '{0}' not found")]
    TicketNotFound(String),
    #[error("no ticket on record for this session")]
    NoTicket,
    #[error("tool '{0}' is not enabled for the current user")]
    GatingDenied(String),
    #[error("invalid arguments for '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },
}

impl ToolError {
    /// Stable machine-readable reason code
    pub fn reason(&self) -> &'static str {
        match self {
            Self::ToolNotFound(_) => "tool_not_found",
            Self::TicketNotFound(_) | Self::NoTicket => "ticket_not_found",
            Self::GatingDenied(_) => "gating_denied",
            Self::InvalidArguments { .. } => "invalid_arguments",
        }
    }
}

/// Ticket store lookup failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("ticket '{0}' not found")]
    NotFound(String),
}

impl From<StoreError> for ToolError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => Self::TicketNotFound(id),
        }
    }
}

/// Invalid desk wiring. Raised while building the router, before any message
/// is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no agent is routed for category '{0}'")]
    MissingRoute(Category),
    #[error("category '{category}' is routed to unknown agent '{agent}'")]
    UnknownAgent { category: Category, agent: String },
    #[error("agent id '{0}' is defined more than once")]
    DuplicateAgent(String),
    #[error("agent '{agent}' lists unknown tool '{tool}'")]
    UnknownTool { agent: String, tool: String },
    #[error("invalid guardrail: {0}")]
    InvalidGuardrail(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes() {
        assert_eq!(ToolError::ToolNotFound("refund".into()).reason(), "tool_not_found");
        assert_eq!(ToolError::TicketNotFound("x".into()).reason(), "ticket_not_found");
        assert_eq!(ToolError::NoTicket.reason(), "ticket_not_found");
        assert_eq!(ToolError::GatingDenied("refund".into()).reason(), "gating_denied");
        assert_eq!(
            ToolError::InvalidArguments {
                tool: "create_ticket".into(),
                reason: "missing title".into()
            }
            .reason(),
            "invalid_arguments"
        );
    }

    #[test]
    fn test_store_error_converts_to_ticket_not_found() {
        let err: ToolError = StoreError::NotFound("abc".into()).into();
        assert_eq!(err, ToolError::TicketNotFound("abc".into()));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRoute(Category::General);
        assert_eq!(err.to_string(), "no agent is routed for category 'general'");
    }
}
