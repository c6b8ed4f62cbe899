//! HTTP-level gateway tests against an in-process router.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use counselor_core::{CounselorResult, Message};
use counselor_gateway::GatewayServer;
use counselor_index::{KnowledgeIndex, Passage};
use counselor_model::{ModelBackend, ModelClient};
use counselor_pipeline::{Orchestrator, PipelineConfig};
use counselor_rules::{GuardrailClassifier, GuardrailConfig, LinkRule, LinkScorer};
use counselor_session::MemorySessionStore;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct EmptyIndex;

#[async_trait]
impl KnowledgeIndex for EmptyIndex {
    async fn search(&self, _query: &str, _k: usize) -> CounselorResult<Vec<Passage>> {
        Ok(Vec::new())
    }
}

struct FixedModel(&'static str);

#[async_trait]
impl ModelBackend for FixedModel {
    async fn complete(&self, _system: &str, _messages: &[Message]) -> CounselorResult<String> {
        Ok(self.0.to_string())
    }
}

fn app(answer: &'static str) -> axum::Router {
    let orchestrator = Orchestrator::new(
        Arc::new(EmptyIndex),
        ModelClient::from_backend(Box::new(FixedModel(answer)), Duration::from_secs(5)),
        Arc::new(MemorySessionStore::new()),
        GuardrailClassifier::new(GuardrailConfig::default()).expect("default guardrails compile"),
        LinkScorer::new(LinkRule::default_rules()),
        PipelineConfig::default(),
    );
    GatewayServer::build(Arc::new(orchestrator))
}

async fn post_json(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds");
    let response = app.oneshot(request).await.expect("router responds");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let json = serde_json::from_slice(&bytes).expect("body is json");
    (status, json)
}

#[tokio::test]
async fn health_reports_ok() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("request builds");
    let response = app("x").oneshot(request).await.expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let json: Value = serde_json::from_slice(&bytes).expect("body is json");
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn chat_returns_answer_and_session_id() {
    let (status, json) = post_json(
        app("The deadline is **January 15**."),
        "/chat",
        serde_json::json!({"message": "When is the Wake Tech application deadline?", "session_id": "abc"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["session_id"], "abc");
    assert!(json["response"].as_str().expect("string response").contains("January 15"));
}

#[tokio::test]
async fn chat_without_session_id_generates_one() {
    let (status, json) = post_json(
        app("Answer."),
        "/chat",
        serde_json::json!({"message": "Tell me about graduation credits"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!json["session_id"].as_str().expect("string id").is_empty());
}

#[tokio::test]
async fn empty_chat_message_is_a_400() {
    let (status, json) = post_json(
        app("never"),
        "/chat",
        serde_json::json!({"message": "   ", "session_id": "abc"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["session_id"], "abc");
    assert!(json["error"].as_str().expect("string error").contains("message"));
}

#[tokio::test]
async fn control_character_flood_is_rejected() {
    let (status, json) = post_json(
        app("never"),
        "/chat",
        serde_json::json!({"message": "\u{0000}\u{0001}\u{0002}", "session_id": "abc"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().expect("string error").contains("readable"));
}

#[tokio::test]
async fn malformed_body_gets_the_json_error_envelope() {
    for uri in ["/chat", "/quick-action"] {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .expect("request builds");
        let response = app("never").oneshot(request).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let json: Value = serde_json::from_slice(&bytes).expect("error body is json");
        assert_eq!(json["error"], "Invalid request body.");
        assert_eq!(json["session_id"], "");
    }
}

#[tokio::test]
async fn quick_action_echoes_the_expanded_question() {
    let (status, json) = post_json(
        app("You need **22 credits** to graduate."),
        "/quick-action",
        serde_json::json!({"action": "graduation_requirements", "session_id": "abc"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["question"],
        "What are the graduation requirements at Green Level High School?"
    );
    assert!(json["response"].as_str().expect("string response").contains("22 credits"));
}

#[tokio::test]
async fn unknown_quick_action_is_a_400() {
    let (status, json) = post_json(
        app("never"),
        "/quick-action",
        serde_json::json!({"action": "write_my_essay", "session_id": "abc"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid action.");
}
