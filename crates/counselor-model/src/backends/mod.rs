/// OpenAI-compatible chat-completions backend.
pub mod openai;

pub use openai::OpenAiBackend;

use async_trait::async_trait;
use counselor_core::{CounselorResult, Message};

/// Trait for generative-model provider backends.
///
/// One call, one opaque text answer. Implementations map their transport
/// failures to `ModelUnavailable` and deadline overruns to `ModelTimeout`.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Produce a completion for the system prompt plus conversation messages.
    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[Message],
    ) -> CounselorResult<String>;
}
