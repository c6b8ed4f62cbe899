use super::ModelBackend;
use crate::config::{ModelConfig, ModelProvider};
use async_trait::async_trait;
use counselor_core::{CounselorError, CounselorResult, Message, Role};

/// OpenAI-compatible chat-completions backend.
///
/// Works with OpenAI, OpenRouter, Groq, and any other provider implementing
/// the same API surface.
pub struct OpenAiBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl OpenAiBackend {
    /// Build a backend from its config. The HTTP client carries the
    /// configured wall-clock timeout so a hung call surfaces as
    /// `ModelTimeout` instead of blocking the turn.
    pub fn new(config: ModelConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { config, http }
    }

    fn build_messages(&self, system_prompt: &str, messages: &[Message]) -> Vec<serde_json::Value> {
        let mut api_messages = vec![serde_json::json!({
            "role": "system",
            "content": system_prompt,
        })];
        for m in messages {
            let role = match m.role {
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::System => continue,
            };
            api_messages.push(serde_json::json!({
                "role": role,
                "content": m.content,
            }));
        }
        api_messages
    }

    fn add_provider_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json");

        // OpenRouter requires attribution headers
        if matches!(self.config.provider, ModelProvider::OpenRouter) {
            request
                .header("HTTP-Referer", "https://github.com/glhs-tools/counselor")
                .header("X-Title", "Counselor")
        } else {
            request
        }
    }

    fn map_transport_error(e: reqwest::Error) -> CounselorError {
        if e.is_timeout() {
            CounselorError::ModelTimeout(e.to_string())
        } else {
            CounselorError::ModelUnavailable(e.to_string())
        }
    }
}

#[async_trait]
impl ModelBackend for OpenAiBackend {
    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[Message],
    ) -> CounselorResult<String> {
        let url = format!("{}/v1/chat/completions", self.config.base_url());
        let body = serde_json::json!({
            "model": self.config.model_id,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "messages": self.build_messages(system_prompt, messages),
        });

        let request = self.add_provider_headers(self.http.post(&url));
        let resp = request
            .json(&body)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = resp.status();
        let resp_body: serde_json::Value =
            resp.json().await.map_err(Self::map_transport_error)?;

        if !status.is_success() {
            return Err(CounselorError::ModelUnavailable(format!(
                "API error {status}: {resp_body}"
            )));
        }

        parse_completion(&resp_body)
    }
}

/// Extract the answer text from a chat-completions response body.
pub fn parse_completion(body: &serde_json::Value) -> CounselorResult<String> {
    let content = body["choices"][0]["message"]["content"]
        .as_str()
        .map(str::trim)
        .unwrap_or_default();
    if content.is_empty() {
        return Err(CounselorError::ModelUnavailable(
            "Completion response contained no text".to_string(),
        ));
    }
    Ok(content.to_string())
}
