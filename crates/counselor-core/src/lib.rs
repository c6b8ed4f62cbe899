//! Core types and error definitions shared across the Counselor crates.
//!
//! # Main types
//!
//! - [`CounselorError`] — Unified error enum for all subsystems.
//! - [`CounselorResult`] — Convenience alias for `Result<T, CounselorError>`.
//! - [`Role`] / [`Message`] — Conversation exchange representation.
//! - [`Sanitizer`] — Input cleaning for untrusted user text.

/// Conversation message types.
pub mod message;
/// Input sanitization for untrusted user text.
pub mod sanitize;

pub use message::{Message, Role};
pub use sanitize::{RejectReason, SanitizeResult, Sanitizer};

/// Top-level error type for the Counselor assistant.
///
/// Variants mirror the failure taxonomy of the pipeline: model-call failures
/// are recovered with a fallback answer, retrieval failures with empty
/// context, and configuration failures are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum CounselorError {
    /// The generative-model call failed (transport, quota, bad response).
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// The generative-model call exceeded its wall-clock deadline.
    #[error("Model timed out: {0}")]
    ModelTimeout(String),

    /// The knowledge index could not serve a query.
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// An error related to session lookup or mutation.
    #[error("Session error: {0}")]
    Session(String),

    /// An error in configuration parsing or validation. Fatal at startup.
    #[error("Config error: {0}")]
    Config(String),

    /// An error from the HTTP gateway layer.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// An error from an outbound HTTP request.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`CounselorError`].
pub type CounselorResult<T> = Result<T, CounselorError>;
