//! Application configuration models.
//!
//! Every field has a default so a partial `config.toml` is always valid.
//! Durations are stored as plain integers to keep the file hand-editable.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RootConfig {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Timing and retry parameters of the generation pipeline.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Pause between consecutive analysis calls.
    pub inter_step_delay_ms: u64,
    /// Hard bound on one report's generation, retries included.
    pub step_timeout_secs: u64,
    /// Idle time after which an untouched session counts as stuck.
    pub stuck_threshold_secs: u64,
    /// Maximum age of a persisted record that may still be resumed.
    pub staleness_window_secs: u64,
    /// Delay between a forced reset and the new run.
    pub restart_delay_ms: u64,
    /// Delay between the completion message and the results hand-off.
    pub redirect_delay_ms: u64,
    pub retry: RetryConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            inter_step_delay_ms: 3_000,
            step_timeout_secs: 90,
            stuck_threshold_secs: 10,
            staleness_window_secs: 3_600,
            restart_delay_ms: 500,
            redirect_delay_ms: 2_000,
            retry: RetryConfig::default(),
        }
    }
}

impl GenerationConfig {
    pub fn inter_step_delay(&self) -> Duration {
        Duration::from_millis(self.inter_step_delay_ms)
    }

    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }

    pub fn stuck_threshold(&self) -> Duration {
        Duration::from_secs(self.stuck_threshold_secs)
    }

    pub fn staleness_window(&self) -> Duration {
        Duration::from_secs(self.staleness_window_secs)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}

/// Bounded exponential back-off settings.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2_000,
            max_delay_ms: 15_000,
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// Analysis provider settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub model: String,
    pub max_tokens: u32,
    pub endpoint: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 4096,
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
        }
    }
}

/// Contents of `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SecretConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claude: Option<ClaudeSecret>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ClaudeSecret {
    pub api_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RootConfig = toml::from_str(
            r#"
            [generation]
            inter_step_delay_ms = 500

            [generation.retry]
            max_attempts = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.generation.inter_step_delay(), Duration::from_millis(500));
        assert_eq!(config.generation.step_timeout(), Duration::from_secs(90));
        assert_eq!(config.generation.retry.max_attempts, 5);
        assert_eq!(config.generation.retry.max_delay(), Duration::from_secs(15));
        assert_eq!(config.analysis, AnalysisConfig::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: RootConfig = toml::from_str("").unwrap();
        assert_eq!(config, RootConfig::default());
    }
}
