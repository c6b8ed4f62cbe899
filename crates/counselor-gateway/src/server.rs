use crate::quick::QuickAction;
use counselor_core::Sanitizer;
use counselor_pipeline::Orchestrator;
use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared application state.
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub sanitizer: Sanitizer,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuickActionRequest {
    pub action: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub session_id: String,
    /// Only set on quick-action replies: the question the action expanded to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorReply {
    pub error: String,
    pub session_id: String,
}

/// The main HTTP server.
pub struct GatewayServer;

impl GatewayServer {
    /// Build the router over a shared pipeline.
    pub fn build(orchestrator: Arc<Orchestrator>) -> Router {
        let state = Arc::new(AppState {
            orchestrator,
            sanitizer: Sanitizer::default(),
        });

        Router::new()
            .route("/chat", post(chat_handler))
            .route("/quick-action", post(quick_action_handler))
            .route("/health", get(health_handler))
            .with_state(state)
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok", "service": "counselor"}))
}

async fn chat_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    // Malformed bodies get the same JSON envelope as every other failure.
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected chat request body");
            return bad_request("Invalid request body.", String::new());
        }
    };
    let session_id = req.session_id.unwrap_or_default();

    if req.message.trim().is_empty() {
        return bad_request("No message provided.", session_id);
    }

    let message = match state.sanitizer.sanitize(&req.message).into_text() {
        Ok(clean) => clean,
        Err(reason) => {
            warn!(reason = ?reason, "Rejected chat message");
            return bad_request(reason.chat_message(), session_id);
        }
    };

    run_turn(&state, &session_id, &message, None).await
}

async fn quick_action_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QuickActionRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected quick-action request body");
            return bad_request("Invalid request body.", String::new());
        }
    };
    let session_id = req.session_id.unwrap_or_default();

    let action: QuickAction = match serde_json::from_value(serde_json::Value::String(
        req.action.trim().to_lowercase(),
    )) {
        Ok(action) => action,
        Err(_) => {
            warn!(action = %req.action, "Unknown quick action");
            return bad_request("Invalid action.", session_id);
        }
    };

    let question = action.question();
    info!(action = ?action, "Quick action");
    run_turn(&state, &session_id, question, Some(question.to_string())).await
}

async fn run_turn(
    state: &AppState,
    session_id: &str,
    question: &str,
    echo_question: Option<String>,
) -> Response {
    match state.orchestrator.answer(session_id, question).await {
        Ok(reply) => Json(ChatReply {
            response: reply.answer,
            session_id: reply.session_id,
            question: echo_question,
        })
        .into_response(),
        Err(e) => {
            warn!(error = %e, "Turn failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorReply {
                    error: "An error occurred processing your request.".to_string(),
                    session_id: session_id.to_string(),
                }),
            )
                .into_response()
        }
    }
}

fn bad_request(error: &str, session_id: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorReply {
            error: error.to_string(),
            session_id,
        }),
    )
        .into_response()
}
