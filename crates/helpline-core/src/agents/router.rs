//! Triage router: classifies a message and hands it off to an agent

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use super::agent::Agent;
use super::profile::AgentProfile;
use crate::error::ConfigError;
use crate::guardrail::OutputGuardrail;
use crate::intent;
use crate::tools::ToolRegistry;
use crate::types::{Category, UserContext};

/// Category → agent id. Every category must be routed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTable {
    #[serde(default)]
    pub billing: Option<String>,
    #[serde(default)]
    pub technical: Option<String>,
    #[serde(default)]
    pub general: Option<String>,
}

impl RoutingTable {
    pub fn agent_for(&self, category: Category) -> Option<&str> {
        match category {
            Category::Billing => self.billing.as_deref(),
            Category::Technical => self.technical.as_deref(),
            Category::General => self.general.as_deref(),
        }
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self {
            billing: Some("billing".to_string()),
            technical: Some("technical".to_string()),
            general: Some("general".to_string()),
        }
    }
}

/// Result of triage: the category written into the context and the agent
/// that should answer.
#[derive(Debug, Clone, Copy)]
pub struct Handoff<'r> {
    pub category: Category,
    pub agent: &'r Agent,
}

/// Routes messages to agents. Construction validates the routing table, so
/// [`handle`](Router::handle) cannot fail.
#[derive(Debug)]
pub struct Router {
    agents: Vec<Agent>,
    /// Index into `agents`, one slot per category
    routes: [usize; 3],
}

fn slot(category: Category) -> usize {
    match category {
        Category::Billing => 0,
        Category::Technical => 1,
        Category::General => 2,
    }
}

impl Router {
    pub fn new(agents: Vec<Agent>, table: &RoutingTable) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for agent in &agents {
            if !seen.insert(agent.id()) {
                return Err(ConfigError::DuplicateAgent(agent.id().to_string()));
            }
        }

        let mut routes = [0usize; 3];
        for category in Category::ALL {
            let agent_id = table
                .agent_for(category)
                .ok_or(ConfigError::MissingRoute(category))?;
            let index = agents
                .iter()
                .position(|a| a.id() == agent_id)
                .ok_or_else(|| ConfigError::UnknownAgent {
                    category,
                    agent: agent_id.to_string(),
                })?;
            routes[slot(category)] = index;
        }

        info!(
            "Router: initialized with {} agents (billing → {}, technical → {}, general → {})",
            agents.len(),
            agents[routes[0]].name(),
            agents[routes[1]].name(),
            agents[routes[2]].name()
        );

        Ok(Self { agents, routes })
    }

    /// Wire agents from profiles against a shared registry and guardrail
    pub fn from_profiles(
        profiles: &[AgentProfile],
        table: &RoutingTable,
        registry: Arc<ToolRegistry>,
        guardrail: Option<OutputGuardrail>,
    ) -> Result<Self, ConfigError> {
        let agents = profiles
            .iter()
            .map(|p| Agent::from_profile(p, registry.clone(), guardrail.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(agents, table)
    }

    /// The billing/technical/general desk with the default guardrail
    pub fn standard(registry: Arc<ToolRegistry>) -> Result<Self, ConfigError> {
        Self::from_profiles(
            &AgentProfile::standard_set(),
            &RoutingTable::default(),
            registry,
            Some(OutputGuardrail::default()),
        )
    }

    /// Triage a message: classify it, record the issue type, upgrade premium
    /// status from the email if warranted, and pick the target agent.
    pub fn handle(&self, message: &str, ctx: &mut UserContext) -> Handoff<'_> {
        let category = intent::classify(message);
        ctx.issue_type = Some(category);

        if !ctx.is_premium_user && ctx.email_is_premium() {
            ctx.is_premium_user = true;
        }

        let agent = self.agent_for(category);
        info!(
            "[Triage] intent detected: {} | is_premium: {} → handing off to {}",
            category,
            ctx.is_premium_user,
            agent.name()
        );

        Handoff { category, agent }
    }

    pub fn agent_for(&self, category: Category) -> &Agent {
        &self.agents[self.routes[slot(category)]]
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }
}
