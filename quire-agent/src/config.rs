//! Static agent configuration.

use serde::{Deserialize, Serialize};

/// Default bound on engine consultations per run.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Configuration for an [`Agent`](crate::Agent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Model identifier passed to the provider (None = provider default).
    pub model: Option<String>,
    /// Engine consultations allowed per run before the loop gives up.
    pub max_iterations: u32,
    /// Output token cap per consultation.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// Extra instructions appended to the system context.
    pub system_addendum: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_tokens: None,
            temperature: Some(0.0),
            system_addendum: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: AgentConfig = serde_json::from_str(r#"{"model": "gpt-4o"}"#).unwrap();
        assert_eq!(config.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.temperature, Some(0.0));
    }
}
