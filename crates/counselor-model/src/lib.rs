//! Generative-model client.
//!
//! The pipeline treats the model as an opaque text-completion service behind
//! the [`ModelBackend`] trait. The shipped backend speaks the OpenAI
//! chat-completions API, which also covers OpenRouter and Groq. Failures are
//! mapped to [`counselor_core::CounselorError::ModelUnavailable`] and
//! [`counselor_core::CounselorError::ModelTimeout`]; recovery (the fallback
//! answer) is the orchestrator's job.

/// Provider backends.
pub mod backends;
/// The dispatching client with timeout enforcement.
pub mod client;
/// Model configuration.
pub mod config;

pub use backends::{ModelBackend, OpenAiBackend};
pub use client::ModelClient;
pub use config::{ModelConfig, ModelProvider};
