//! Multi-agent desk: agents wired from profiles plus the triage router
//!
//! The router classifies each message and hands it to the agent routed for
//! its category. Each agent owns a subset of the tool registry and an
//! optional output guardrail.

pub mod agent;
pub mod profile;
pub mod router;

pub use agent::Agent;
pub use profile::{AgentKind, AgentProfile};
pub use router::{Handoff, Router, RoutingTable};
