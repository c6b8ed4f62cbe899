//! The retrieval-and-response pipeline.
//!
//! [`Orchestrator`] turns a raw user utterance into a final markdown answer:
//! guardrail classification, best-effort retrieval, bounded prompt assembly,
//! one generative-model call with a static fallback, link-relevance scoring,
//! and session persistence. Collaborators are injected behind traits so the
//! pipeline owns decision logic only.

/// The per-turn orchestrator.
pub mod orchestrator;
/// Prompt assembly.
pub mod prompt;

pub use orchestrator::{Orchestrator, PipelineConfig, TurnReply};
