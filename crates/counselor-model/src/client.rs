use crate::backends::{ModelBackend, OpenAiBackend};
use crate::config::ModelConfig;
use counselor_core::{CounselorError, CounselorResult, Message};
use std::time::Duration;

/// Model client that dispatches to the configured provider backend and
/// enforces the per-call deadline.
///
/// All supported providers speak the OpenAI API today; the backend trait is
/// the seam for adding one that does not.
pub struct ModelClient {
    backend: Box<dyn ModelBackend>,
    deadline: Duration,
}

impl ModelClient {
    /// Build a client for the configured provider.
    pub fn new(config: ModelConfig) -> Self {
        let deadline = Duration::from_secs(config.timeout_secs);
        Self {
            backend: Box::new(OpenAiBackend::new(config)),
            deadline,
        }
    }

    /// Create from a pre-built backend (tests, custom providers).
    pub fn from_backend(backend: Box<dyn ModelBackend>, deadline: Duration) -> Self {
        Self { backend, deadline }
    }

    /// One completion call. There is no mid-flight cancellation: the call
    /// either completes or hits the deadline, and a deadline overrun is a
    /// [`CounselorError::ModelTimeout`].
    pub async fn complete(
        &self,
        system_prompt: &str,
        messages: &[Message],
    ) -> CounselorResult<String> {
        match tokio::time::timeout(self.deadline, self.backend.complete(system_prompt, messages))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(CounselorError::ModelTimeout(format!(
                "no completion within {}s",
                self.deadline.as_secs()
            ))),
        }
    }
}
