use serde::{Deserialize, Serialize};

/// Which chat-completions provider to call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// api.openai.com
    OpenAi,
    /// openrouter.ai — OpenAI-compatible, requires referer headers.
    OpenRouter,
    /// Groq cloud inference — OpenAI-compatible API.
    Groq,
}

/// Configuration for the generative-model backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider selection.
    pub provider: ModelProvider,
    /// Model identifier, e.g. `gpt-4o-mini`.
    pub model_id: String,
    /// API key for the provider. May be left empty in config files and
    /// supplied through the environment instead.
    #[serde(default)]
    pub api_key: String,
    /// Override for the provider base URL (tests, proxies).
    pub api_base_url: Option<String>,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Completion token cap.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Wall-clock limit for one completion call, in seconds. A call that
    /// exceeds it is a model failure, not something to wait out.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_timeout_secs() -> u64 {
    30
}

impl ModelConfig {
    /// The effective base URL for the configured provider.
    pub fn base_url(&self) -> &str {
        if let Some(url) = &self.api_base_url {
            url
        } else {
            match self.provider {
                ModelProvider::OpenAi => "https://api.openai.com",
                ModelProvider::OpenRouter => "https://openrouter.ai/api",
                ModelProvider::Groq => "https://api.groq.com/openai",
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_serialization() {
        assert_eq!(
            serde_json::to_string(&ModelProvider::OpenAi).unwrap(),
            "\"openai\""
        );
        let p: ModelProvider = serde_json::from_str("\"groq\"").unwrap();
        assert!(matches!(p, ModelProvider::Groq));
    }

    #[test]
    fn test_defaults_applied() {
        let config: ModelConfig = serde_json::from_str(
            r#"{"provider": "openai", "model_id": "gpt-4o-mini", "api_key": "sk-test", "api_base_url": null}"#,
        )
        .unwrap();
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.base_url(), "https://api.openai.com");
    }

    #[test]
    fn test_base_url_override() {
        let config = ModelConfig {
            provider: ModelProvider::OpenAi,
            model_id: "gpt-4o-mini".to_string(),
            api_key: "sk-test".to_string(),
            api_base_url: Some("http://localhost:9999".to_string()),
            temperature: 0.7,
            max_tokens: 512,
            timeout_secs: 5,
        };
        assert_eq!(config.base_url(), "http://localhost:9999");
    }
}
