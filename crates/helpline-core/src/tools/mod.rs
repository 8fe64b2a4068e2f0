//! Tool registry and gating
//!
//! Tools are a closed set of kinds. Each kind has a fixed enablement
//! predicate over [`UserContext`] which is evaluated on every invocation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::tickets::{Ticket, TicketStore};
use crate::types::{Category, UserContext};

pub mod events;
mod handlers;

pub use events::{ToolEvent, ToolObserver, TracingObserver};

/// The tools a desk can wire into its agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    CreateTicket,
    Refund,
    RestartService,
    CheckSubscription,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        Self::CreateTicket,
        Self::Refund,
        Self::RestartService,
        Self::CheckSubscription,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateTicket => "create_ticket",
            Self::Refund => "refund",
            Self::RestartService => "restart_service",
            Self::CheckSubscription => "check_subscription",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::CreateTicket => {
                "Open a support ticket for the current user and remember it as their latest ticket."
            }
            Self::Refund => "Refund a ticket. Premium users only.",
            Self::RestartService => "Restart a service. Only for technical issues.",
            Self::CheckSubscription => "Report whether an email belongs to a premium subscription.",
        }
    }

    pub fn input_schema(&self) -> Value {
        match self {
            Self::CreateTicket => json_schema(
                serde_json::json!({
                    "title": {"type": "string", "description": "Short ticket title"},
                    "description": {"type": "string", "description": "The user's request"}
                }),
                vec!["title", "description"],
            ),
            Self::Refund => json_schema(
                serde_json::json!({
                    "ticket_id": {"type": "string", "description": "Ticket to refund"}
                }),
                vec!["ticket_id"],
            ),
            Self::RestartService => json_schema(
                serde_json::json!({
                    "service_name": {"type": "string", "description": "Service to restart"}
                }),
                vec![],
            ),
            Self::CheckSubscription => json_schema(
                serde_json::json!({
                    "email": {"type": "string", "description": "Email to check (defaults to the user's)"}
                }),
                vec![],
            ),
        }
    }

    /// Gating predicate. Pure; never cached.
    pub fn is_enabled(&self, ctx: &UserContext) -> bool {
        match self {
            Self::CreateTicket | Self::CheckSubscription => true,
            Self::Refund => ctx.is_premium_user,
            Self::RestartService => ctx.issue_type == Some(Category::Technical),
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Name, description and input schema of a tool, for listings
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl From<ToolKind> for ToolDefinition {
    fn from(kind: ToolKind) -> Self {
        Self {
            name: kind.name().to_string(),
            description: kind.description().to_string(),
            input_schema: kind.input_schema(),
        }
    }
}

/// Timing and defaults for the simulated operations
#[derive(Debug, Clone)]
pub struct ToolSettings {
    pub restart_delay: Duration,
    pub stream_delay: Duration,
    pub service_name: String,
}

impl ToolSettings {
    /// Settings with every simulated delay removed
    pub fn immediate() -> Self {
        Self {
            restart_delay: Duration::ZERO,
            stream_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            restart_delay: Duration::from_millis(200),
            stream_delay: Duration::from_millis(150),
            service_name: "main-service".to_string(),
        }
    }
}

/// Mutable state a tool call may touch
pub struct ToolEnv<'a> {
    pub context: &'a mut UserContext,
    pub store: &'a mut dyn TicketStore,
}

impl<'a> ToolEnv<'a> {
    pub fn new(context: &'a mut UserContext, store: &'a mut dyn TicketStore) -> Self {
        Self { context, store }
    }
}

/// Successful tool result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolOutput {
    TicketCreated { ticket: Ticket },
    Refunded { ticket: Ticket, message: String },
    Restarted { service: String, message: String },
    Subscription { email: Option<String>, is_premium: bool },
}

impl ToolOutput {
    /// One-line description used in progress events
    pub fn summary(&self) -> String {
        match self {
            Self::TicketCreated { ticket } => format!("created ticket {}", ticket.id),
            Self::Refunded { message, .. } | Self::Restarted { message, .. } => message.clone(),
            Self::Subscription { is_premium, .. } => format!("is_premium={}", is_premium),
        }
    }
}

pub type ToolResult = Result<ToolOutput, ToolError>;

/// Registry of available tools, shared by every agent wired from it
pub struct ToolRegistry {
    tools: HashMap<String, ToolKind>,
    settings: ToolSettings,
    observer: Arc<dyn ToolObserver>,
}

impl ToolRegistry {
    /// Create a new empty tool registry
    pub fn new(settings: ToolSettings) -> Self {
        Self {
            tools: HashMap::new(),
            settings,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Registry with every tool kind registered
    pub fn standard(settings: ToolSettings) -> Self {
        let mut registry = Self::new(settings);
        for kind in ToolKind::ALL {
            registry.register(kind);
        }
        registry
    }

    pub fn with_observer(mut self, observer: Arc<dyn ToolObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn register(&mut self, kind: ToolKind) {
        debug!("Registering tool: {}", kind);
        self.tools.insert(kind.name().to_string(), kind);
    }

    pub fn get(&self, name: &str) -> Option<ToolKind> {
        self.tools.get(name).copied()
    }

    pub fn contains(&self, kind: ToolKind) -> bool {
        self.tools.contains_key(kind.name())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Whether the named tool is registered and its predicate holds right now
    pub fn is_enabled(&self, name: &str, ctx: &UserContext) -> bool {
        self.get(name).is_some_and(|kind| kind.is_enabled(ctx))
    }

    /// Definitions of every registered tool, sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> =
            self.tools.values().map(|k| ToolDefinition::from(*k)).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Resolve a tool by name, check its gate, and run it.
    pub fn invoke(&self, name: &str, args: Value, env: &mut ToolEnv<'_>) -> ToolResult {
        let kind = self
            .get(name)
            .ok_or_else(|| ToolError::ToolNotFound(name.to_string()))?;
        self.invoke_kind(kind, args, env)
    }

    /// Like [`invoke`](Self::invoke), with started/finished events around the
    /// call and the stream delay before it.
    pub fn invoke_streamed(&self, name: &str, args: Value, env: &mut ToolEnv<'_>) -> ToolResult {
        self.observer.on_event(&ToolEvent::Started {
            tool: name.to_string(),
        });
        pause(self.settings.stream_delay);

        let result = self.invoke(name, args, env);

        let summary = match &result {
            Ok(output) => output.summary(),
            Err(e) => e.to_string(),
        };
        self.observer.on_event(&ToolEvent::Finished {
            tool: name.to_string(),
            ok: result.is_ok(),
            summary: events::truncate_summary(&summary),
        });
        result
    }

    fn invoke_kind(&self, kind: ToolKind, args: Value, env: &mut ToolEnv<'_>) -> ToolResult {
        debug!("Executing tool: {} with input: {}", kind, args);

        if !kind.is_enabled(env.context) {
            warn!("Tool {} is gated off for the current user", kind);
            return Err(ToolError::GatingDenied(kind.name().to_string()));
        }

        let result = match kind {
            ToolKind::CreateTicket => handlers::create_ticket(args, env),
            ToolKind::Refund => handlers::refund(args, env),
            ToolKind::RestartService => handlers::restart_service(args, &self.settings),
            ToolKind::CheckSubscription => handlers::check_subscription(args, env.context),
        };

        match &result {
            Ok(_) => debug!("Tool {} succeeded", kind),
            Err(e) => warn!("Tool {} failed: {}", kind, e),
        }
        result
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.tools.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        f.debug_struct("ToolRegistry")
            .field("tools", &names)
            .field("settings", &self.settings)
            .finish()
    }
}

pub(crate) fn pause(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}

/// Helper function to create a JSON schema for tool input
pub fn json_schema(properties: Value, required: Vec<&str>) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
