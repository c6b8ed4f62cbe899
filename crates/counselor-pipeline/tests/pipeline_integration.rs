//! End-to-end pipeline scenarios with a scripted model and a counting index.

use async_trait::async_trait;
use counselor_core::{CounselorError, CounselorResult, Message};
use counselor_index::{KnowledgeIndex, Passage, SourceTag};
use counselor_model::{ModelBackend, ModelClient};
use counselor_pipeline::{Orchestrator, PipelineConfig};
use counselor_rules::{GuardrailClassifier, GuardrailConfig, LinkRule, LinkScorer};
use counselor_session::{MemorySessionStore, SessionStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Index double that counts searches and serves a fixed corpus.
struct CountingIndex {
    calls: AtomicUsize,
    passages: Vec<Passage>,
}

impl CountingIndex {
    fn new(texts: &[&str]) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            passages: texts
                .iter()
                .enumerate()
                .map(|(i, text)| Passage {
                    id: Uuid::new_v4(),
                    text: (*text).to_string(),
                    source: SourceTag::Fact,
                    score: 10.0 - i as f32,
                })
                .collect(),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KnowledgeIndex for CountingIndex {
    async fn search(&self, _query: &str, k: usize) -> CounselorResult<Vec<Passage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.passages.iter().take(k).cloned().collect())
    }
}

/// Index double that always fails.
struct BrokenIndex;

#[async_trait]
impl KnowledgeIndex for BrokenIndex {
    async fn search(&self, _query: &str, _k: usize) -> CounselorResult<Vec<Passage>> {
        Err(CounselorError::Retrieval("index offline".to_string()))
    }
}

/// Model double returning a fixed answer, or a failure.
struct ScriptedModel {
    answer: Option<String>,
}

impl ScriptedModel {
    fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
        }
    }

    fn failing() -> Self {
        Self { answer: None }
    }
}

#[async_trait]
impl ModelBackend for ScriptedModel {
    async fn complete(&self, _system: &str, _messages: &[Message]) -> CounselorResult<String> {
        match &self.answer {
            Some(answer) => Ok(answer.clone()),
            None => Err(CounselorError::ModelUnavailable("quota exceeded".to_string())),
        }
    }
}

struct Fixture {
    orchestrator: Orchestrator,
    index: Arc<CountingIndex>,
    sessions: Arc<MemorySessionStore>,
}

fn fixture(model: ScriptedModel) -> Fixture {
    let index = Arc::new(CountingIndex::new(&[
        "Club: Robotics Club\nMeeting day: Tuesday",
        "Graduation requirement: English\nCredits required: 4",
    ]));
    let sessions = Arc::new(MemorySessionStore::new());
    let orchestrator = Orchestrator::new(
        index.clone(),
        ModelClient::from_backend(Box::new(model), Duration::from_secs(5)),
        sessions.clone(),
        GuardrailClassifier::new(GuardrailConfig::default()).expect("default guardrails compile"),
        LinkScorer::new(LinkRule::default_rules()),
        PipelineConfig::default(),
    );
    Fixture {
        orchestrator,
        index,
        sessions,
    }
}

#[tokio::test]
async fn club_question_gets_answer_and_directory_link() {
    let f = fixture(ScriptedModel::answering(
        "GLHS offers many clubs, including the **Robotics Club** which meets Tuesdays.",
    ));
    let reply = f
        .orchestrator
        .answer("s1", "What clubs are available at GLHS?")
        .await
        .expect("turn succeeds");

    assert!(reply.answer.contains("Robotics Club"));
    assert!(reply.answer.contains("[GLHS Club Directory]("));
    assert_eq!(f.index.call_count(), 1);
}

#[tokio::test]
async fn generic_wake_tech_question_gets_no_link() {
    let f = fixture(ScriptedModel::answering(
        "Wake Technical Community College is a community college partner.",
    ));
    let reply = f
        .orchestrator
        .answer("s1", "What is Wake Tech?")
        .await
        .expect("turn succeeds");
    assert!(!reply.answer.contains("]("), "unexpected link: {}", reply.answer);
}

#[tokio::test]
async fn eligibility_question_gets_eligibility_link() {
    let f = fixture(ScriptedModel::answering(
        "To participate you need a **2.8** weighted GPA.",
    ));
    let reply = f
        .orchestrator
        .answer("s1", "What are the eligibility requirements for Wake Tech CCP?")
        .await
        .expect("turn succeeds");
    assert!(reply.answer.contains("[Wake Tech CCP Eligibility Requirements]("));
    // Link exclusivity: exactly one markdown link appended.
    assert_eq!(reply.answer.matches("](").count(), 1);
}

#[tokio::test]
async fn weather_question_is_refused_without_retrieval() {
    let f = fixture(ScriptedModel::answering("should never be called"));
    let reply = f
        .orchestrator
        .answer("s1", "What's the weather today?")
        .await
        .expect("turn succeeds");

    assert!(reply.answer.contains("school-related"));
    assert_eq!(f.index.call_count(), 0);
}

#[tokio::test]
async fn safety_language_short_circuits_with_resources() {
    let f = fixture(ScriptedModel::answering("should never be called"));
    let reply = f
        .orchestrator
        .answer("s1", "I can't take school anymore, I want to die")
        .await
        .expect("turn succeeds");

    assert!(reply.answer.contains("988"));
    assert_eq!(f.index.call_count(), 0);
    // The short-circuited turn is still recorded in the session.
    assert_eq!(f.sessions.history("s1", 10).await.len(), 2);
}

#[tokio::test]
async fn greeting_gets_canned_reply_and_no_link() {
    let f = fixture(ScriptedModel::answering("should never be called"));
    let reply = f.orchestrator.answer("s1", "hello").await.expect("turn succeeds");
    assert!(reply.answer.contains("Green Level High School AI counselor"));
    assert!(!reply.answer.contains("]("));
    assert_eq!(f.index.call_count(), 0);
}

#[tokio::test]
async fn session_history_grows_in_order() {
    let f = fixture(ScriptedModel::answering("Sure — here's some guidance."));
    for i in 0..3 {
        f.orchestrator
            .answer("s1", &format!("Question {i} about my course schedule"))
            .await
            .expect("turn succeeds");
    }
    let history = f.sessions.history("s1", 100).await;
    assert_eq!(history.len(), 6);
    assert!(history[0].content.starts_with("Question 0"));
    assert!(history[4].content.starts_with("Question 2"));
}

#[tokio::test]
async fn model_failure_returns_fallback_and_skips_persistence() {
    let f = fixture(ScriptedModel::failing());
    let reply = f
        .orchestrator
        .answer("s1", "What are the graduation requirements?")
        .await
        .expect("turn still succeeds from the caller's view");

    assert!(reply.answer.contains("try"));
    assert_eq!(f.orchestrator.model_failure_count(), 1);
    // The failed turn must not refresh or extend the session.
    assert!(f.sessions.history(&reply.session_id, 10).await.is_empty());
}

#[tokio::test]
async fn retrieval_failure_degrades_to_empty_context() {
    let sessions = Arc::new(MemorySessionStore::new());
    let orchestrator = Orchestrator::new(
        Arc::new(BrokenIndex),
        ModelClient::from_backend(
            Box::new(ScriptedModel::answering("I don't have details on that, sorry.")),
            Duration::from_secs(5),
        ),
        sessions.clone(),
        GuardrailClassifier::new(GuardrailConfig::default()).expect("default guardrails compile"),
        LinkScorer::new(LinkRule::default_rules()),
        PipelineConfig::default(),
    );

    let reply = orchestrator
        .answer("s1", "Which honors courses are offered?")
        .await
        .expect("turn succeeds despite retrieval failure");
    assert!(reply.answer.contains("sorry"));
    assert_eq!(sessions.history("s1", 10).await.len(), 2);
}

#[tokio::test]
async fn blank_session_id_gets_generated_one() {
    let f = fixture(ScriptedModel::answering("Answer."));
    let reply = f
        .orchestrator
        .answer("   ", "Tell me about the course catalog")
        .await
        .expect("turn succeeds");
    assert!(!reply.session_id.trim().is_empty());
    assert_eq!(f.sessions.history(&reply.session_id, 10).await.len(), 2);
}

#[tokio::test]
async fn empty_question_gets_prompt_back() {
    let f = fixture(ScriptedModel::answering("should never be called"));
    let reply = f.orchestrator.answer("s1", "   ").await.expect("turn succeeds");
    assert!(reply.answer.contains("ask me a question"));
    assert_eq!(f.index.call_count(), 0);
}
