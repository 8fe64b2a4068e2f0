//! A single user's conversation with the desk
//!
//! A session owns the user context and the ticket store. Messages are handled
//! one at a time, each to completion; nothing here is shared across sessions.

use serde_json::Value;
use tracing::info;

use crate::agents::Router;
use crate::error::StoreError;
use crate::tickets::{InMemoryTicketStore, Ticket, TicketStore};
use crate::tools::{ToolEnv, ToolRegistry, ToolResult};
use crate::types::{Category, UserContext, email_is_premium};

/// What the desk answered, and who answered it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub agent: String,
    pub category: Category,
    pub text: String,
}

pub struct Session<S: TicketStore = InMemoryTicketStore> {
    context: UserContext,
    store: S,
}

impl Session<InMemoryTicketStore> {
    pub fn new() -> Self {
        Self::with_store(InMemoryTicketStore::new())
    }
}

impl Default for Session<InMemoryTicketStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TicketStore> Session<S> {
    pub fn with_store(store: S) -> Self {
        Self {
            context: UserContext::new(),
            store,
        }
    }

    pub fn context(&self) -> &UserContext {
        &self.context
    }

    /// Set the user's identity. A premium email upgrades the account; a
    /// non-premium one never downgrades it.
    pub fn identify(&mut self, name: &str, email: &str) {
        self.context.name = Some(name.to_string());
        self.context.email = Some(email.to_string());
        if email_is_premium(email) {
            self.context.is_premium_user = true;
        }
        info!(
            "Identified {} <{}> | premium: {}",
            name, email, self.context.is_premium_user
        );
    }

    /// Record a name without an email. Premium is left as it is.
    pub fn set_name(&mut self, name: &str) {
        self.context.name = Some(name.to_string());
    }

    /// Triage `message` and let the selected agent answer it
    pub fn ask(&mut self, router: &Router, message: &str) -> Reply {
        let handoff = router.handle(message, &mut self.context);
        info!(
            "Handing off to {} with context: issue_type={:?}, premium={}",
            handoff.agent.name(),
            self.context.issue_type,
            self.context.is_premium_user
        );

        let text = handoff
            .agent
            .respond(message, &mut self.context, &mut self.store);

        Reply {
            agent: handoff.agent.name().to_string(),
            category: handoff.category,
            text,
        }
    }

    /// Invoke a registry tool directly against this session's state
    pub fn run_tool(&mut self, registry: &ToolRegistry, name: &str, args: Value) -> ToolResult {
        let mut env = ToolEnv::new(&mut self.context, &mut self.store);
        registry.invoke(name, args, &mut env)
    }

    pub fn tickets(&self) -> Vec<Ticket> {
        self.store.list_all()
    }

    pub fn ticket(&self, id: &str) -> Result<Ticket, StoreError> {
        self.store.find_by_id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tickets::TicketStatus;
    use crate::tools::{ToolOutput, ToolSettings};
    use serde_json::json;
    use std::sync::Arc;

    fn router() -> Router {
        Router::standard(Arc::new(ToolRegistry::standard(ToolSettings::immediate()))).unwrap()
    }

    #[test]
    fn test_identify_sets_premium_from_email() {
        let mut session = Session::new();
        session.identify("Jane", "jane@pro.com");
        let ctx = session.context();
        assert_eq!(ctx.name.as_deref(), Some("Jane"));
        assert_eq!(ctx.email.as_deref(), Some("jane@pro.com"));
        assert!(ctx.is_premium_user);
    }

    #[test]
    fn test_set_name_keeps_email_and_premium() {
        let mut session = Session::new();
        session.identify("Jane", "jane@pro.com");
        session.set_name("Janet");
        let ctx = session.context();
        assert_eq!(ctx.name.as_deref(), Some("Janet"));
        assert_eq!(ctx.email.as_deref(), Some("jane@pro.com"));
        assert!(ctx.is_premium_user);
    }

    #[test]
    fn test_identify_does_not_downgrade() {
        let mut session = Session::new();
        session.identify("Jane", "jane@pro.com");
        session.identify("Jane", "jane@example.com");
        assert!(session.context().is_premium_user);
    }

    #[test]
    fn test_scenario_refund_denied_for_non_premium() {
        let router = router();
        let mut session = Session::new();

        let reply = session.ask(&router, "I need a refund for a crash");
        assert_eq!(reply.category, Category::Billing);
        assert_eq!(reply.agent, "BillingAgent");
        assert!(reply.text.contains("premium"));
        assert!(reply.text.contains("upgrade"));

        let tickets = session.tickets();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].status, TicketStatus::Open);
    }

    #[test]
    fn test_scenario_premium_refund_succeeds() {
        let router = router();
        let mut session = Session::new();
        session.identify("Jane", "jane@pro.com");

        let reply = session.ask(&router, "refund");
        assert_eq!(reply.agent, "BillingAgent");

        let id = session.context().last_ticket_id.clone().unwrap();
        let ticket = session.ticket(&id).unwrap();
        assert_eq!(ticket.status, TicketStatus::Refunded);
        assert_eq!(ticket.user.email.as_deref(), Some("jane@pro.com"));
        assert_eq!(ticket.category, Category::Billing);
        assert!(reply.text.contains("Refund processed."));
    }

    #[test]
    fn test_scenario_crash_restarts_service() {
        let router = router();
        let mut session = Session::new();

        let reply = session.ask(&router, "the service keeps crashing");
        assert_eq!(reply.category, Category::Technical);
        assert_eq!(session.context().issue_type, Some(Category::Technical));
        assert!(reply.text.contains("restarted successfully"));
        assert!(session.tickets().is_empty());
    }

    #[test]
    fn test_general_message_opens_ticket() {
        let router = router();
        let mut session = Session::new();
        let reply = session.ask(&router, "how do I change my avatar?");
        let tickets = session.tickets();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].category, Category::General);
        assert!(reply.text.contains(&tickets[0].id));
        assert_eq!(session.context().last_ticket_id.as_deref(), Some(tickets[0].id.as_str()));
    }

    #[test]
    fn test_last_ticket_id_follows_newest_ticket() {
        let router = router();
        let mut session = Session::new();
        session.ask(&router, "first question");
        session.ask(&router, "second question");
        let tickets = session.tickets();
        assert_eq!(tickets.len(), 2);
        assert_ne!(tickets[0].id, tickets[1].id);
        assert_eq!(session.context().last_ticket_id.as_deref(), Some(tickets[1].id.as_str()));
    }

    #[test]
    fn test_plain_email_refund_denied() {
        let router = router();
        let mut session = Session::new();
        session.identify("Sam", "sam@example.com");
        assert!(!session.context().is_premium_user);

        let reply = session.ask(&router, "refund my charge");
        assert!(reply.text.contains("only to premium users"));
        let id = session.context().last_ticket_id.clone().unwrap();
        assert_eq!(session.ticket(&id).unwrap().status, TicketStatus::Open);
    }

    #[test]
    fn test_run_tool_check_subscription() {
        let registry = ToolRegistry::standard(ToolSettings::immediate());
        let mut session = Session::new();
        session.identify("Ann", "ann@proton.me");
        let out = session
            .run_tool(&registry, "check_subscription", json!({"email": "ann@proton.me"}))
            .unwrap();
        assert!(matches!(out, ToolOutput::Subscription { is_premium: true, .. }));
    }

    #[test]
    fn test_run_tool_gated() {
        let registry = ToolRegistry::standard(ToolSettings::immediate());
        let mut session = Session::new();
        let err = session
            .run_tool(&registry, "restart_service", Value::Null)
            .unwrap_err();
        assert_eq!(err.reason(), "gating_denied");
    }

    #[test]
    fn test_unknown_ticket_lookup() {
        let session = Session::new();
        assert!(session.ticket("missing").is_err());
    }
}
