//! Agent profile: an agent's identity, kind and tool set

use serde::{Deserialize, Serialize};

/// Which responder an agent runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Billing,
    Technical,
    General,
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Billing => write!(f, "billing"),
            Self::Technical => write!(f, "technical"),
            Self::General => write!(f, "general"),
        }
    }
}

/// Declarative description of an agent, as found in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: String,
    pub name: String,
    pub kind: AgentKind,
    #[serde(default)]
    pub tools: Vec<String>,
}

impl AgentProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: AgentKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            tools: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: &[&str]) -> Self {
        self.tools = tools.iter().map(|t| t.to_string()).collect();
        self
    }

    /// The billing, technical and general desk agents
    pub fn standard_set() -> Vec<Self> {
        vec![
            Self::new("billing", "BillingAgent", AgentKind::Billing).with_tools(&[
                "create_ticket",
                "refund",
                "check_subscription",
            ]),
            Self::new("technical", "TechnicalAgent", AgentKind::Technical)
                .with_tools(&["create_ticket", "restart_service"]),
            Self::new("general", "GeneralAgent", AgentKind::General).with_tools(&["create_ticket"]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_profile_new() {
        let profile = AgentProfile::new("vip", "VipAgent", AgentKind::Billing);
        assert_eq!(profile.id, "vip");
        assert_eq!(profile.name, "VipAgent");
        assert!(profile.tools.is_empty());
    }

    #[test]
    fn test_standard_set() {
        let set = AgentProfile::standard_set();
        assert_eq!(set.len(), 3);
        let billing = &set[0];
        assert_eq!(billing.kind, AgentKind::Billing);
        assert!(billing.tools.contains(&"refund".to_string()));
        let general = &set[2];
        assert_eq!(general.tools, vec!["create_ticket".to_string()]);
    }

    #[test]
    fn test_profile_deserialize_defaults_tools() {
        let profile: AgentProfile =
            serde_json::from_str(r#"{"id":"g","name":"G","kind":"general"}"#).unwrap();
        assert_eq!(profile.kind, AgentKind::General);
        assert!(profile.tools.is_empty());
    }
}
