//! HTTP gateway: the JSON chat API in front of the pipeline.
//!
//! Three routes: `POST /chat` for free-form questions, `POST /quick-action`
//! for the preset question buttons, and `GET /health`. The gateway owns input
//! sanitization; everything else (guardrails, retrieval, generation, session
//! bookkeeping) happens inside the [`counselor_pipeline::Orchestrator`].

/// Preset quick-action questions.
pub mod quick;
/// Router, handlers, and request/response types.
pub mod server;

pub use quick::QuickAction;
pub use server::{AppState, GatewayServer};
