use anyhow::{Context, Result};
use helpline_core::{
    AgentProfile, ConfigError, GuardrailConfig, OutputGuardrail, Router, RoutingTable,
    ToolObserver, ToolRegistry, ToolSettings,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelplineConfig {
    #[serde(default)]
    pub desk: DeskConfig,
    #[serde(default = "AgentProfile::standard_set")]
    pub agents: Vec<AgentProfile>,
    #[serde(default)]
    pub routing: RoutingTable,
    #[serde(default)]
    pub guardrail: GuardrailConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Default for HelplineConfig {
    fn default() -> Self {
        Self {
            desk: DeskConfig::default(),
            agents: AgentProfile::standard_set(),
            routing: RoutingTable::default(),
            guardrail: GuardrailConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

/// Identity the console session starts with
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeskConfig {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

// ── Tools Config ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,
    #[serde(default = "default_stream_delay_ms")]
    pub stream_delay_ms: u64,
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_restart_delay_ms() -> u64 {
    200
}

fn default_stream_delay_ms() -> u64 {
    150
}

fn default_service_name() -> String {
    "main-service".to_string()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            restart_delay_ms: default_restart_delay_ms(),
            stream_delay_ms: default_stream_delay_ms(),
            service_name: default_service_name(),
        }
    }
}

impl ToolsConfig {
    pub fn settings(&self) -> ToolSettings {
        ToolSettings {
            restart_delay: Duration::from_millis(self.restart_delay_ms),
            stream_delay: Duration::from_millis(self.stream_delay_ms),
            service_name: self.service_name.clone(),
        }
    }
}

/// The wired desk: the shared tool registry and the router over its agents
#[derive(Debug)]
pub struct Desk {
    pub registry: Arc<ToolRegistry>,
    pub router: Router,
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".helpline")
}

impl HelplineConfig {
    /// Load the config file. A missing default file means built-in defaults;
    /// a missing file given with `--config` is an error.
    pub fn load(custom_path: &Option<PathBuf>) -> Result<Self> {
        let path = match custom_path {
            Some(path) => path.clone(),
            None => {
                let path = config_dir().join("config.toml");
                if !path.exists() {
                    info!(
                        "No config at {}, using built-in defaults",
                        path.display()
                    );
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "Failed to read config at {}. Run `helpline init` first.",
                path.display()
            )
        })?;

        Self::parse(&content).with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Wire the registry, guardrail, agents and router. Any wiring mistake is
    /// reported here, before the first message.
    pub fn build_desk(&self, observer: Arc<dyn ToolObserver>) -> Result<Desk, ConfigError> {
        let registry =
            Arc::new(ToolRegistry::standard(self.tools.settings()).with_observer(observer));
        let guardrail = OutputGuardrail::from_config(&self.guardrail)?;
        let router =
            Router::from_profiles(&self.agents, &self.routing, registry.clone(), guardrail)?;
        Ok(Desk { registry, router })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpline_core::{AgentKind, Category, TracingObserver};
    use std::io::Write;

    fn observer() -> Arc<dyn ToolObserver> {
        Arc::new(TracingObserver)
    }

    #[test]
    fn test_default_config_builds() {
        let config = HelplineConfig::default();
        let desk = config.build_desk(observer()).unwrap();
        assert_eq!(desk.router.agents().len(), 3);
        assert_eq!(desk.registry.len(), 4);
    }

    #[test]
    fn test_bundled_default_toml_parses() {
        let config = HelplineConfig::parse(include_str!("../../../config/default.toml")).unwrap();
        assert_eq!(config.agents.len(), 3);
        assert_eq!(config.routing, RoutingTable::default());
        assert!(config.guardrail.enabled);
        assert_eq!(config.tools.service_name, "main-service");
        assert!(config.build_desk(observer()).is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = HelplineConfig::parse("").unwrap();
        assert_eq!(config.agents, AgentProfile::standard_set());
        assert_eq!(config.tools.restart_delay_ms, 200);
        assert_eq!(config.tools.stream_delay_ms, 150);
        assert_eq!(config.guardrail.banned_phrases, vec!["sorry", "apologize"]);
    }

    #[test]
    fn test_partial_routing_is_fatal() {
        let config = HelplineConfig::parse(
            r#"
            [routing]
            billing = "billing"
            technical = "technical"
            "#,
        )
        .unwrap();
        let err = config.build_desk(observer()).unwrap_err();
        assert_eq!(err, ConfigError::MissingRoute(Category::General));
    }

    #[test]
    fn test_unknown_tool_is_fatal() {
        let config = HelplineConfig::parse(
            r#"
            [[agents]]
            id = "general"
            name = "GeneralAgent"
            kind = "general"
            tools = ["create_ticket", "format_disk"]

            [routing]
            billing = "general"
            technical = "general"
            general = "general"
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.build_desk(observer()),
            Err(ConfigError::UnknownTool { .. })
        ));
    }

    #[test]
    fn test_custom_agents_and_tools() {
        let config = HelplineConfig::parse(
            r#"
            [desk]
            user_name = "Jane"
            user_email = "jane@pro.com"

            [[agents]]
            id = "front"
            name = "FrontDesk"
            kind = "general"
            tools = ["create_ticket"]

            [routing]
            billing = "front"
            technical = "front"
            general = "front"

            [tools]
            restart_delay_ms = 0
            stream_delay_ms = 0
            service_name = "api"
            "#,
        )
        .unwrap();
        assert_eq!(config.desk.user_name.as_deref(), Some("Jane"));
        assert_eq!(config.agents[0].kind, AgentKind::General);
        let settings = config.tools.settings();
        assert!(settings.restart_delay.is_zero());
        assert_eq!(settings.service_name, "api");

        let desk = config.build_desk(observer()).unwrap();
        assert_eq!(desk.router.agent_for(Category::Billing).name(), "FrontDesk");
    }

    #[test]
    fn test_invalid_guardrail_is_fatal() {
        let config = HelplineConfig::parse(
            r#"
            [guardrail]
            banned_phrases = ["redact"]
            marker = "[redacted]"
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.build_desk(observer()),
            Err(ConfigError::InvalidGuardrail(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[tools]\nservice_name = \"billing-db\"").unwrap();
        let config = HelplineConfig::load(&Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.tools.service_name, "billing-db");
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = HelplineConfig::load(&Some(dir.path().join("nope.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[agents]]\nid = 3").unwrap();
        let result = HelplineConfig::load(&Some(file.path().to_path_buf()));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = HelplineConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = HelplineConfig::parse(&text).unwrap();
        assert_eq!(parsed.agents, config.agents);
        assert_eq!(parsed.routing, config.routing);
    }
}
