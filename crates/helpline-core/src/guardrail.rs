//! Output guardrail: redacts banned phrases from agent replies

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_banned_phrases")]
    pub banned_phrases: Vec<String>,
    #[serde(default = "default_marker")]
    pub marker: String,
}

fn default_true() -> bool {
    true
}

fn default_banned_phrases() -> Vec<String> {
    vec!["sorry".to_string(), "apologize".to_string()]
}

fn default_marker() -> String {
    "[redacted]".to_string()
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            banned_phrases: default_banned_phrases(),
            marker: default_marker(),
        }
    }
}

/// Replaces every case-insensitive occurrence of a banned phrase with a marker.
#[derive(Debug, Clone)]
pub struct OutputGuardrail {
    pattern: Option<Regex>,
    marker: String,
}

impl OutputGuardrail {
    /// Build a guardrail. No banned phrase may share characters with a marker
    /// in the output, and the marker may not be empty, so a second
    /// [`enforce`](Self::enforce) pass finds nothing new.
    pub fn new(phrases: &[String], marker: &str) -> Result<Self, ConfigError> {
        let mut phrases: Vec<&str> = phrases
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect();
        // longest first so overlapping phrases redact the larger span
        phrases.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        phrases.dedup();

        if !phrases.is_empty() && marker.is_empty() {
            return Err(ConfigError::InvalidGuardrail(
                "marker must not be empty".to_string(),
            ));
        }

        let marker_lower = marker.to_lowercase();
        if let Some(p) = phrases
            .iter()
            .find(|p| overlaps_marker(&p.to_lowercase(), &marker_lower))
        {
            return Err(ConfigError::InvalidGuardrail(format!(
                "banned phrase '{}' overlaps marker '{}'",
                p, marker
            )));
        }

        let pattern = if phrases.is_empty() {
            None
        } else {
            let alternation = phrases
                .iter()
                .map(|p| regex::escape(p))
                .collect::<Vec<_>>()
                .join("|");
            let re = RegexBuilder::new(&alternation)
                .case_insensitive(true)
                .build()
                .map_err(|e| ConfigError::InvalidGuardrail(e.to_string()))?;
            Some(re)
        };

        Ok(Self {
            pattern,
            marker: marker.to_string(),
        })
    }

    /// Guardrail from config; `None` when disabled
    pub fn from_config(config: &GuardrailConfig) -> Result<Option<Self>, ConfigError> {
        if !config.enabled {
            return Ok(None);
        }
        Self::new(&config.banned_phrases, &config.marker).map(Some)
    }

    pub fn enforce(&self, text: &str) -> String {
        let Some(re) = &self.pattern else {
            return text.to_string();
        };
        let redacted = re.replace_all(text, regex::NoExpand(&self.marker));
        if redacted != text {
            debug!("Guardrail redacted banned phrases from reply");
        }
        redacted.into_owned()
    }
}

/// Whether a match of `phrase` could share characters with a marker in the
/// output. Both arguments are lowercase.
fn overlaps_marker(phrase: &str, marker: &str) -> bool {
    if marker.contains(phrase) || phrase.contains(marker) {
        return true;
    }
    marker.char_indices().skip(1).any(|(i, _)| {
        phrase.starts_with(&marker[i..]) || phrase.ends_with(&marker[..i])
    })
}

impl Default for OutputGuardrail {
    fn default() -> Self {
        let config = GuardrailConfig::default();
        Self::new(&config.banned_phrases, &config.marker).unwrap_or_else(|_| Self {
            pattern: None,
            marker: config.marker,
        })
    }
}
