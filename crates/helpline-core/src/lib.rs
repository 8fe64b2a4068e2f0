//! helpline-core - triage, handoff and tool gating for the support desk
//!
//! This crate provides:
//! - Keyword intent classification of support messages
//! - A tool registry whose tools are gated by the user's context
//! - Billing, technical and general agents that decide which tools to run
//! - A router that hands each message to the agent for its category
//! - An output guardrail applied to every agent reply
//! - A ticket store abstraction with an in-memory implementation

pub mod agents;
pub mod error;
pub mod guardrail;
pub mod intent;
pub mod session;
pub mod tickets;
pub mod tools;
pub mod types;

// Re-export main types for convenience
pub use agents::{Agent, AgentKind, AgentProfile, Handoff, Router, RoutingTable};
pub use error::{ConfigError, StoreError, ToolError};
pub use guardrail::{GuardrailConfig, OutputGuardrail};
pub use intent::classify;
pub use session::{Reply, Session};
pub use tickets::{InMemoryTicketStore, Ticket, TicketStatus, TicketStore, UserSnapshot};
pub use tools::{
    ToolDefinition, ToolEnv, ToolEvent, ToolKind, ToolObserver, ToolOutput, ToolRegistry,
    ToolSettings, TracingObserver,
};
pub use types::{Category, UserContext};
