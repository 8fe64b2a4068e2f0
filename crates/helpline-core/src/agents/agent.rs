//! Desk agents: decide which tools to call for a message and phrase the reply

use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::profile::{AgentKind, AgentProfile};
use crate::error::{ConfigError, ToolError};
use crate::guardrail::OutputGuardrail;
use crate::intent::mentions_any;
use crate::tickets::TicketStore;
use crate::tools::{ToolEnv, ToolKind, ToolOutput, ToolRegistry, ToolResult};
use crate::types::{Category, UserContext};

const REFUND_TRIGGERS: &[&str] = &["refund", "charge"];
const RESTART_TRIGGERS: &[&str] = &["restart", "error", "not working", "crash"];

/// A wired agent. Immutable once built; all state lives in the context and
/// ticket store handed to [`respond`](Agent::respond).
pub struct Agent {
    id: String,
    name: String,
    kind: AgentKind,
    tools: Vec<ToolKind>,
    registry: Arc<ToolRegistry>,
    guardrail: Option<OutputGuardrail>,
}

impl Agent {
    /// Wire an agent from its profile. Every listed tool must exist in the registry.
    pub fn from_profile(
        profile: &AgentProfile,
        registry: Arc<ToolRegistry>,
        guardrail: Option<OutputGuardrail>,
    ) -> Result<Self, ConfigError> {
        let mut tools = Vec::with_capacity(profile.tools.len());
        for name in &profile.tools {
            let kind = registry
                .get(name)
                .ok_or_else(|| ConfigError::UnknownTool {
                    agent: profile.id.clone(),
                    tool: name.clone(),
                })?;
            if !tools.contains(&kind) {
                tools.push(kind);
            }
        }

        debug!(
            "Wired agent '{}' ({}) with tools {:?}",
            profile.id, profile.kind, profile.tools
        );

        Ok(Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
            kind: profile.kind,
            tools,
            registry,
            guardrail,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn tools(&self) -> &[ToolKind] {
        &self.tools
    }

    fn has_tool(&self, tool_name: &str) -> Option<ToolKind> {
        self.tools.iter().copied().find(|k| k.name() == tool_name)
    }

    /// Whether this agent owns the tool and its gate is open for `ctx`
    pub fn can_use(&self, tool_name: &str, ctx: &UserContext) -> bool {
        self.has_tool(tool_name)
            .is_some_and(|kind| kind.is_enabled(ctx))
    }

    /// Invoke one of this agent's tools
    pub fn call_tool(&self, tool_name: &str, args: Value, env: &mut ToolEnv<'_>) -> ToolResult {
        if self.has_tool(tool_name).is_none() {
            return Err(ToolError::ToolNotFound(tool_name.to_string()));
        }
        self.registry.invoke(tool_name, args, env)
    }

    fn call_tool_streamed(&self, tool_name: &str, args: Value, env: &mut ToolEnv<'_>) -> ToolResult {
        if self.has_tool(tool_name).is_none() {
            return Err(ToolError::ToolNotFound(tool_name.to_string()));
        }
        self.registry.invoke_streamed(tool_name, args, env)
    }

    /// Produce a reply for `message`, running whatever tools the agent decides
    /// on. The guardrail, if any, is applied to every reply.
    pub fn respond(
        &self,
        message: &str,
        ctx: &mut UserContext,
        store: &mut dyn TicketStore,
    ) -> String {
        let reply = match self.kind {
            AgentKind::Billing => self.respond_billing(message, ctx, store),
            AgentKind::Technical => self.respond_technical(message, ctx, store),
            AgentKind::General => self.respond_general(message, ctx, store),
        };

        match &self.guardrail {
            Some(guardrail) => guardrail.enforce(&reply),
            None => reply,
        }
    }

    fn respond_billing(
        &self,
        message: &str,
        ctx: &mut UserContext,
        store: &mut dyn TicketStore,
    ) -> String {
        let lower = message.to_lowercase();
        if !mentions_any(&lower, REFUND_TRIGGERS) {
            return format!("{}: I can help with refunds, charges, and invoices.", self.name);
        }

        // A refund always needs a ticket to act on
        if ctx.last_ticket_id.is_none() {
            let args = json!({"title": "Billing issue", "description": message});
            match self.call_tool("create_ticket", args, &mut ToolEnv::new(ctx, store)) {
                Ok(ToolOutput::TicketCreated { ticket }) => {
                    info!("[{}] created ticket {}", self.name, ticket.id)
                }
                Ok(_) => {}
                Err(e) => warn!("[{}] could not create ticket: {}", self.name, e),
            }
        }

        if !self.can_use("refund", ctx) {
            if self.has_tool("refund").is_none() {
                return format!("{}: refunds are not handled by this desk.", self.name);
            }
            info!("[{}] refund gated off (premium={})", self.name, ctx.is_premium_user);
            return "Refunds are available only to premium users. Please upgrade or contact billing."
                .to_string();
        }

        let args = json!({"ticket_id": ctx.last_ticket_id});
        match self.call_tool("refund", args, &mut ToolEnv::new(ctx, store)) {
            Ok(ToolOutput::Refunded { ticket, message }) => format!(
                "{}: {} Ticket {} is now {}.",
                self.name, message, ticket.id, ticket.status
            ),
            Ok(other) => format!("{}: {}", self.name, other.summary()),
            Err(e) => format!(
                "{}: the refund could not be processed ({}).",
                self.name,
                e.reason()
            ),
        }
    }

    fn respond_technical(
        &self,
        message: &str,
        ctx: &mut UserContext,
        store: &mut dyn TicketStore,
    ) -> String {
        let lower = message.to_lowercase();
        if !mentions_any(&lower, RESTART_TRIGGERS) {
            return format!(
                "{}: I can attempt to restart services or create a ticket for engineering.",
                self.name
            );
        }

        if ctx.issue_type.is_none() {
            ctx.issue_type = Some(Category::Technical);
        }

        if !self.can_use("restart_service", ctx) {
            info!("[{}] restart gated off (issue_type={:?})", self.name, ctx.issue_type);
            return "Restart is not permitted for your issue type or the agent cannot perform it."
                .to_string();
        }

        let service = self.registry.settings().service_name.clone();
        let args = json!({"service_name": service});
        match self.call_tool_streamed("restart_service", args, &mut ToolEnv::new(ctx, store)) {
            Ok(output) => format!("{}: {}", self.name, output.summary()),
            Err(e) => format!("{}: the restart failed ({}).", self.name, e.reason()),
        }
    }

    fn respond_general(
        &self,
        message: &str,
        ctx: &mut UserContext,
        store: &mut dyn TicketStore,
    ) -> String {
        let args = json!({"title": "General inquiry", "description": message});
        match self.call_tool("create_ticket", args, &mut ToolEnv::new(ctx, store)) {
            Ok(ToolOutput::TicketCreated { ticket }) => {
                format!("{}: Created ticket {} for your request.", self.name, ticket.id)
            }
            Ok(_) | Err(_) => format!("{}: Could not create a ticket right now.", self.name),
        }
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("tools", &self.tools)
            .field("guardrail", &self.guardrail.is_some())
            .finish()
    }
}
